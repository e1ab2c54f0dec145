//! RSS 2.0 output: the per-exposure item feed and the per-run summary feed.

pub mod items;
pub mod summary;

use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use rss::{validation::Validate, ChannelBuilder, Item};

pub const RSS_DOCS: &str = "http://www.rssboard.org/rss-specification";
pub const GENERATOR: &str = "exposure-feed";

pub use items::{gen_desc, gen_feed};
pub use summary::{record_summary, summarise, summarise_feed};

/// Channel level metadata shared by both feeds.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMeta<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: &'a str,
}

/// 建立並驗證 channel，輸出縮排過的 XML
pub(crate) fn render_channel(meta: ChannelMeta<'_>, items: Vec<Item>, now: DateTime<Utc>) -> Result<String> {
    let channel = ChannelBuilder::default()
        .title(meta.title)
        .link(meta.link)
        .description(meta.description)
        .docs(RSS_DOCS.to_string())
        .generator(GENERATOR.to_string())
        .last_build_date(now.to_rfc2822())
        .items(items)
        .build();

    channel.validate()?;

    let buf = channel.pretty_write_to(Vec::new(), b' ', 2)?;
    let mut xml = String::from_utf8_lossy(&buf).into_owned();
    xml.push('\n');
    Ok(xml)
}
