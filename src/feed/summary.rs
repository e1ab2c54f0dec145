use super::{render_channel, ChannelMeta};
use crate::core::identity::digest_id;
use crate::domain::model::{Exposure, FeedState, SummaryEntry};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use rss::{GuidBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;

/// Build the summary item for one run's new exposures, or `None` if there
/// were none.
pub fn summarise(new_exposures: &[Exposure], now: DateTime<Utc>) -> Option<SummaryEntry> {
    if new_exposures.is_empty() {
        return None;
    }

    let mut per_suburb: BTreeMap<&str, usize> = BTreeMap::new();
    for exposure in new_exposures {
        *per_suburb.entry(exposure.suburb()).or_default() += 1;
    }
    let description: String = per_suburb
        .iter()
        .map(|(suburb, count)| format!("<b>{}:</b>{}<br/>", suburb, count))
        .collect();

    let count = new_exposures.len();
    let title = if count == 1 {
        "1 additional exposure site".to_string()
    } else {
        format!("{} additional exposure sites", count)
    };

    let mut ids: Vec<&str> = new_exposures.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();

    Some(SummaryEntry {
        id: digest_id(ids),
        title,
        description,
        published: now,
    })
}

/// 新增 summary 並只保留最近 `retention` 筆
pub fn record_summary(
    state: &mut FeedState,
    new_exposures: &[Exposure],
    now: DateTime<Utc>,
    retention: usize,
) -> Option<SummaryEntry> {
    let entry = summarise(new_exposures, now)?;
    state.summaries.insert(0, entry.clone());
    state.summaries.truncate(retention);
    Some(entry)
}

fn to_item(entry: &SummaryEntry, link: &str) -> Item {
    ItemBuilder::default()
        .title(entry.title.clone())
        .link(link.to_string())
        .description(entry.description.clone())
        .guid(
            GuidBuilder::default()
                .permalink(false)
                .value(entry.id.clone())
                .build(),
        )
        .pub_date(entry.published.to_rfc2822())
        .build()
}

/// Render the summary feed, one item per run that found new exposures.
pub fn summarise_feed(state: &FeedState, meta: ChannelMeta<'_>, now: DateTime<Utc>) -> Result<String> {
    let items = state
        .summaries
        .iter()
        .map(|entry| to_item(entry, meta.link))
        .collect();
    render_channel(meta, items, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const META: ChannelMeta<'static> = ChannelMeta {
        title: "ACT Exposure Summaries",
        link: "https://www.covid19.act.gov.au/act-status-and-response/act-covid-19-exposure-locations",
        description: "Feed scraped from ACT exposure website",
    };

    fn exposure(id: &str, suburb: &str) -> Exposure {
        let mut e = Exposure::from_pairs([("Suburb", suburb), ("Exposure Site", id)]);
        e.id = id.to_string();
        e
    }

    #[test]
    fn test_summarise_counts_per_suburb() {
        let new = vec![
            exposure("a", "Fyshwick"),
            exposure("b", "Nicholls"),
            exposure("c", "Fyshwick"),
        ];
        let entry = summarise(&new, Utc.timestamp_opt(1, 0).unwrap()).unwrap();

        assert_eq!(entry.title, "3 additional exposure sites");
        assert_eq!(entry.description, "<b>Fyshwick:</b>2<br/><b>Nicholls:</b>1<br/>");
        assert_eq!(entry.id, digest_id(["a", "b", "c"]));
    }

    #[test]
    fn test_summary_id_ignores_row_order() {
        let now = Utc.timestamp_opt(1, 0).unwrap();
        let forward = summarise(&[exposure("a", "Reid"), exposure("b", "Reid")], now).unwrap();
        let backward = summarise(&[exposure("b", "Reid"), exposure("a", "Reid")], now).unwrap();
        assert_eq!(forward.id, backward.id);
    }

    #[test]
    fn test_single_site_title_and_empty_run() {
        let now = Utc.timestamp_opt(1, 0).unwrap();
        let entry = summarise(&[exposure("a", "Reid")], now).unwrap();
        assert_eq!(entry.title, "1 additional exposure site");
        assert!(summarise(&[], now).is_none());
    }

    #[test]
    fn test_record_summary_keeps_newest_within_retention() {
        let mut state = FeedState::default();
        for secs in 1..=4 {
            let id = format!("e{}", secs);
            record_summary(
                &mut state,
                &[exposure(&id, "Reid")],
                Utc.timestamp_opt(secs, 0).unwrap(),
                3,
            );
        }

        assert_eq!(state.summaries.len(), 3);
        assert_eq!(state.summaries[0].published, Utc.timestamp_opt(4, 0).unwrap());
        assert_eq!(state.summaries[2].published, Utc.timestamp_opt(2, 0).unwrap());
    }

    #[test]
    fn test_summarise_feed() {
        let mut state = FeedState::default();
        let published = Utc.timestamp_opt(1, 0).unwrap();
        record_summary(
            &mut state,
            &[exposure("a", "Fyshwick"), exposure("b", "Fyshwick"), exposure("c", "Nicholls")],
            published,
            50,
        );

        let xml = summarise_feed(&state, META, Utc::now()).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "ACT Exposure Summaries");
        assert_eq!(channel.items().len(), 1);
        let item = &channel.items()[0];
        assert_eq!(item.title(), Some("3 additional exposure sites"));
        assert_eq!(item.link(), Some(META.link));
        let pub_date = DateTime::parse_from_rfc2822(item.pub_date().unwrap()).unwrap();
        assert_eq!(pub_date, published);
        assert_eq!(
            item.description(),
            Some("<b>Fyshwick:</b>2<br/><b>Nicholls:</b>1<br/>")
        );
    }
}
