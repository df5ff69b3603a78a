pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::LocalStorage;
pub use app::Backend;
pub use config::AppConfig;
pub use core::{engine::ImportEngine, notifier::LeaveNotifier, pipeline::ImportPipeline};
pub use utils::error::{Result, TimetableError};
