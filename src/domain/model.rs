use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 來源 CSV 必須完全符合的欄位集合（順序不拘）
pub const FIELDS: [&str; 10] = [
    "Event Id",
    "Status",
    "Exposure Site",
    "Street",
    "Suburb",
    "State",
    "Date",
    "Arrival Time",
    "Departure Time",
    "Contact",
];

pub const EVENT_ID_FIELD: &str = "Event Id";
pub const STATUS_FIELD: &str = "Status";
pub const SITE_FIELD: &str = "Exposure Site";
pub const SUBURB_FIELD: &str = "Suburb";
pub const DATE_FIELD: &str = "Date";
pub const REGION_FIELD: &str = "Region";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// One row of the exposure CSV. Fields keep the column order they were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub fields: Vec<Field>,
    #[serde(default)]
    pub id: String,
}

impl Exposure {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| Field {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
            id: String::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// 已存在的欄位就地替換，否則附加在最後
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn site(&self) -> &str {
        self.get(SITE_FIELD).unwrap_or_default()
    }

    pub fn suburb(&self) -> &str {
        self.get(SUBURB_FIELD).unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.get(DATE_FIELD).unwrap_or_default()
    }

    /// Item title, `Suburb:Exposure Site`.
    pub fn title(&self) -> String {
        format!("{}:{}", self.suburb(), self.site())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedExposure {
    pub exposure: Exposure,
    pub first_seen: DateTime<Utc>,
}

/// One summary feed item, produced by a run that found new exposures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published: DateTime<Utc>,
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    #[serde(default)]
    pub exposures: BTreeMap<String, TrackedExposure>,
    /// newest first
    #[serde(default)]
    pub summaries: Vec<SummaryEntry>,
}

impl FeedState {
    pub fn ids(&self) -> BTreeSet<&str> {
        self.exposures.keys().map(String::as_str).collect()
    }
}

/// transform 階段的結果
#[derive(Debug, Clone)]
pub struct FeedUpdate {
    pub state: FeedState,
    pub new_exposures: Vec<Exposure>,
    pub changed: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub locations: usize,
    pub new_locations: usize,
    pub changed: bool,
    pub written: Vec<String>,
}
