mod chat;
mod core;
mod disk;
mod ec2;
mod telegram;

pub use chat::ChatConfig;
pub use core::{Config, ReliabilityConfig, StorageConfig};
pub use disk::DiskConfig;
pub use ec2::{Ec2Config, InstanceEntry};
pub use telegram::TelegramConfig;
