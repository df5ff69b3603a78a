pub mod auth;
pub mod messaging;
pub mod realtime;

pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use messaging::FcmGateway;
pub use realtime::RealtimeDbDirectory;
