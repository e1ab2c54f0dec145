use crate::domain::model::{Exposure, FeedUpdate};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn csv_pattern(&self) -> &str;
    fn output_path(&self) -> &str;
    fn feed_file(&self) -> &str;
    fn summary_file(&self) -> &str;
    fn state_file(&self) -> &str;
    fn feed_title(&self) -> &str;
    fn summary_title(&self) -> &str;
    fn feed_description(&self) -> &str;
    fn summary_retention(&self) -> usize;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn force(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Exposure>>;
    async fn transform(&self, data: Vec<Exposure>) -> Result<FeedUpdate>;
    async fn load(&self, update: FeedUpdate) -> Result<Vec<String>>;
}
