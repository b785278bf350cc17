pub mod config;
pub mod error;
pub mod reconcile;
pub mod scene_index;

pub use config::Config;
pub use error::{Error, Result};
pub use reconcile::{ReconciliationLoop, SCENE_PARAMETER, STREAM_PARAMETER};
