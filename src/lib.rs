#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod disk;
pub mod error;
pub mod instances;
pub mod llm;
pub mod schedule;
pub mod storage;
pub mod transport;

pub use app::App;
pub use config::Config;
pub use error::DbotError;
