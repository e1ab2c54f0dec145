use crate::adapters::HttpFetcher;
use crate::core::identity::gen_id;
use crate::core::parse::{normalise, parse_csv};
use crate::core::scrape::find_csv_location;
use crate::core::state::{decode_state, encode_state, ids_changed, seed_from_feed, update_state};
use crate::core::{ConfigProvider, Exposure, FeedUpdate, Pipeline, Storage};
use crate::domain::model::FeedState;
use crate::domain::region::gen_region;
use crate::feed::{gen_feed, record_summary, summarise_feed, ChannelMeta};
use crate::utils::error::{FeedError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Scrape → parse → diff → publish, for the exposure CSV.
pub struct ExposurePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: HttpFetcher,
    csv_pattern: Regex,
    clock: Clock,
}

impl<S: Storage, C: ConfigProvider> ExposurePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = HttpFetcher::new(
            config.request_timeout(),
            config.retry_attempts(),
            config.retry_delay(),
        )?;
        let csv_pattern =
            Regex::new(config.csv_pattern()).map_err(|e| FeedError::InvalidConfigValueError {
                field: "source.csv_pattern".to_string(),
                value: config.csv_pattern().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            storage,
            config,
            fetcher,
            csv_pattern,
            clock: Arc::new(Utc::now),
        })
    }

    /// 測試時固定時間
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    /// state.json first; otherwise seed from a previously published feed.
    async fn load_state(&self) -> Result<FeedState> {
        let state_file = self.config.state_file();
        if self.storage.exists(state_file).await {
            let data = self.storage.read_file(state_file).await?;
            return decode_state(state_file, &data);
        }

        let feed_file = self.config.feed_file();
        if self.storage.exists(feed_file).await {
            tracing::info!("No {} found, seeding from existing {}", state_file, feed_file);
            let data = self.storage.read_file(feed_file).await?;
            return seed_from_feed(&data);
        }

        tracing::info!("No previous state, starting fresh");
        Ok(FeedState::default())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExposurePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Exposure>> {
        let page_url = self.config.source_url();
        let html = self.fetcher.get_text(page_url).await?;

        let csv_location = find_csv_location(&html, &self.csv_pattern).ok_or_else(|| {
            FeedError::CsvLocationNotFound {
                page: page_url.to_string(),
            }
        })?;
        tracing::info!("Found CSV location at: {}", csv_location);

        let csv_data = self.fetcher.get_text(&csv_location).await?;
        tracing::info!("Loaded CSV ({} bytes)", csv_data.len());

        let exposures = parse_csv(&csv_data)?;
        tracing::info!("Found {} locations", exposures.len());
        Ok(exposures)
    }

    async fn transform(&self, mut data: Vec<Exposure>) -> Result<FeedUpdate> {
        normalise(&mut data);
        gen_region(&mut data);
        gen_id(&mut data);

        let now = (self.clock)();
        let mut state = self.load_state().await?;
        let before = state.clone();

        let new_exposures = update_state(&mut state, data, now);
        let changed = ids_changed(&before, &state);
        if let Some(summary) =
            record_summary(&mut state, &new_exposures, now, self.config.summary_retention())
        {
            tracing::info!("{}", summary.title);
        }

        Ok(FeedUpdate {
            state,
            new_exposures,
            changed,
            generated_at: now,
        })
    }

    async fn load(&self, update: FeedUpdate) -> Result<Vec<String>> {
        if !update.changed && !self.config.force() {
            tracing::info!("Contents unchanged, doing nothing");
            return Ok(Vec::new());
        }
        if update.changed {
            tracing::info!("Contents changed, regenerating feed");
        } else {
            tracing::info!("Forced regeneration");
        }

        let link = self.config.source_url();
        let items_xml = gen_feed(
            &update.state,
            ChannelMeta {
                title: self.config.feed_title(),
                link,
                description: self.config.feed_description(),
            },
            update.generated_at,
        )?;
        let summary_xml = summarise_feed(
            &update.state,
            ChannelMeta {
                title: self.config.summary_title(),
                link,
                description: self.config.feed_description(),
            },
            update.generated_at,
        )?;
        let state_json = encode_state(&update.state)?;

        let outputs = [
            (self.config.feed_file(), items_xml.into_bytes()),
            (self.config.summary_file(), summary_xml.into_bytes()),
            // state 最後寫入，前面失敗時下次仍會重新產生
            (self.config.state_file(), state_json),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (name, data) in outputs {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, &data).await?;
            written.push(self.output_file(name));
        }
        Ok(written)
    }
}
