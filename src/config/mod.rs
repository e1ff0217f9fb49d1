#[allow(clippy::module_inception)]
mod config;
mod profiles;

pub use config::Config;
pub use profiles::{PlatformProfile, ProfileSet, QualityThresholds};
