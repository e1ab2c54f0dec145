pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod feed;
pub mod utils;

pub use adapters::{HttpFetcher, LocalStorage};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::FeedConfig;

pub use crate::core::{engine::FeedEngine, pipeline::ExposurePipeline};
pub use domain::model::RunReport;
pub use utils::error::{FeedError, Result};
