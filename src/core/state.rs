use crate::domain::model::{Exposure, FeedState, TrackedExposure};
use crate::utils::error::{FeedError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Merge this run's exposures into `state` and return the ones never seen
/// before.
///
/// Known ids keep their `first_seen` and take the fresh row data; new ids are
/// stamped with `now`; ids that are no longer published are dropped. The
/// returned exposures are ordered newest exposure date first.
pub fn update_state(
    state: &mut FeedState,
    exposures: Vec<Exposure>,
    now: DateTime<Utc>,
) -> Vec<Exposure> {
    let mut previous = std::mem::take(&mut state.exposures);
    let mut next = BTreeMap::new();
    let mut new_exposures = Vec::new();

    for exposure in exposures {
        if next.contains_key(&exposure.id) {
            tracing::debug!("Duplicate exposure row skipped: {}", exposure.title());
            continue;
        }
        let first_seen = match previous.remove(&exposure.id) {
            Some(tracked) => tracked.first_seen,
            None => {
                new_exposures.push(exposure.clone());
                now
            }
        };
        next.insert(
            exposure.id.clone(),
            TrackedExposure {
                exposure,
                first_seen,
            },
        );
    }

    if !previous.is_empty() {
        tracing::info!("{} exposure(s) no longer listed", previous.len());
    }

    state.exposures = next;
    new_exposures.sort_by(by_date_desc);
    new_exposures
}

/// Exposure date descending, then title. ISO dates sort lexically.
pub fn by_date_desc(a: &Exposure, b: &Exposure) -> Ordering {
    b.date().cmp(a.date()).then_with(|| a.title().cmp(&b.title()))
}

/// The published feed changes only when the set of ids changes.
pub fn ids_changed(before: &FeedState, after: &FeedState) -> bool {
    before.ids() != after.ids()
}

pub fn decode_state(path: &str, data: &[u8]) -> Result<FeedState> {
    serde_json::from_slice(data).map_err(|e| FeedError::CorruptState {
        path: path.to_string(),
        message: e.to_string(),
    })
}

pub fn encode_state(state: &FeedState) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(state)?)
}

/// Rebuild a minimal state from a previously published item feed, keeping
/// each guid's pubDate. Used when no state file exists yet.
pub fn seed_from_feed(xml: &[u8]) -> Result<FeedState> {
    let channel = rss::Channel::read_from(xml)?;
    let mut state = FeedState::default();

    for item in channel.items() {
        let Some(guid) = item.guid() else {
            continue;
        };
        let first_seen = item
            .pub_date()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let id = guid.value().to_string();
        state.exposures.insert(
            id.clone(),
            TrackedExposure {
                exposure: Exposure {
                    fields: Vec::new(),
                    id,
                },
                first_seen,
            },
        );
    }

    tracing::info!("Seeded state with {} item(s) from existing feed", state.exposures.len());
    Ok(state)
}
