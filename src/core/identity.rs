use crate::core::parse::{is_time_field, title_case};
use crate::domain::model::{Exposure, DATE_FIELD, EVENT_ID_FIELD, FIELDS, SITE_FIELD, STATUS_FIELD};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use md5::{Digest, Md5};

/// base64(MD5(parts joined by `-`))
pub fn digest_id<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = parts.into_iter().collect::<Vec<_>>().join("-");
    STANDARD.encode(Md5::digest(joined.as_bytes()))
}

/// The form a value is hashed in. Dates carry a midnight time and plain text
/// columns are title-cased, which is how feeds published before `state.json`
/// existed wrote their guids.
fn id_value(name: &str, value: &str) -> String {
    if name == DATE_FIELD {
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => date.format("%Y-%m-%dT00:00:00").to_string(),
            Err(_) => value.to_string(),
        }
    } else if name == SITE_FIELD || is_time_field(name) {
        value.to_string()
    } else {
        title_case(value)
    }
}

/// Give every exposure a stable id.
///
/// The source has no usable key, so the id is a digest of every column except
/// `Event Id` and `Status`, taken in canonical column order. A status change
/// keeps the id; a changed time or site produces a new item. Two identical
/// rows (same site, day and times) cannot be told apart and share an id.
pub fn gen_id(exposures: &mut [Exposure]) {
    for exposure in exposures.iter_mut() {
        let values: Vec<String> = FIELDS
            .iter()
            .filter(|name| **name != EVENT_ID_FIELD && **name != STATUS_FIELD)
            .map(|name| id_value(name, exposure.get(name).unwrap_or_default()))
            .collect();
        exposure.id = digest_id(values.iter().map(String::as_str));
    }
}
