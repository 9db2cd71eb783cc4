pub mod aim;
pub mod config;
pub mod launch;

pub use aim::AimPlugin;
pub use config::{ConfigError, LaunchConfig};
pub use launch::{DragClamp, LaunchResult};
