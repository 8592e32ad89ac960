pub mod config;
pub mod domain;
pub mod error;

pub use config::{Config, SearchCredentialConfig};
pub use domain::*;
pub use error::{DiscoveryError, Result};
