// Domain layer: models and ports. No external systems here, only std/serde/chrono.

pub mod model;
pub mod ports;
