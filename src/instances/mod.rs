pub mod poller;
pub mod registry;
pub mod toggle;
pub mod types;

pub use poller::{Decision, PollReport, PollSettings, StateNotification, StatePoller, evaluate};
pub use registry::InstanceRegistry;
pub use toggle::{ToggleActuator, ToggleOutcome, ToggleReport};
pub use types::{InstanceRecord, InstanceState};
