pub mod engine;
pub mod identity;
pub mod parse;
pub mod pipeline;
pub mod scrape;
pub mod state;

pub use crate::domain::model::{Exposure, FeedUpdate};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
