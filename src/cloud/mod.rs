pub mod ec2;
pub mod traits;

pub use ec2::Ec2Client;
pub use traits::CloudControl;
