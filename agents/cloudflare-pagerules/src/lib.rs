//! Cloudflare Page Rules Agent Library
//!
//! Lists every zone on a Cloudflare account together with the page rules
//! attached to it.

pub mod audit;
pub mod cloudflare;
pub mod config;
pub mod registry;
pub mod report;

pub use cloudflare::{ApiError, CloudflareClient};
pub use config::{Config, ConfigError};
pub use registry::{Registry, ZoneRecord};
