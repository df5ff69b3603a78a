pub mod delimiter;
pub mod engine;
pub mod header;
pub mod notifier;
pub mod pipeline;
pub mod rows;
pub mod validator;

pub use crate::domain::model::{CanonicalRecord, ImportRecord, ImportReport, RecordType};
pub use crate::domain::ports::{Pipeline, PushGateway, RealtimeDirectory, RecordStore, Storage};
pub use crate::utils::error::Result;
