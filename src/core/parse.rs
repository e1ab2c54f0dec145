use crate::domain::model::{Exposure, DATE_FIELD, FIELDS};
use crate::utils::error::{FeedError, Result};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeSet;

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%A %d %B %Y",
    "%A, %d %B %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const TIME_FORMATS: &[&str] = &["%I:%M%p", "%I:%M:%S%p", "%H:%M", "%H:%M:%S"];

/// Python 風格的 title case：每段字母的第一個字元大寫，其餘小寫
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Parse the CSV body into exposures.
///
/// The header row must contain exactly [`FIELDS`] (after trimming and title
/// casing, in any order); anything else is reported as a schema change so a
/// format change upstream never turns into a burst of bogus feed items.
pub fn parse_csv(data: &str) -> Result<Vec<Exposure>> {

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(header) => header?,
        None => {
            return Err(FeedError::ProcessingError {
                message: "CSV is empty".to_string(),
            })
        }
    };
    let fields: Vec<String> = header.iter().map(|h| title_case(h.trim())).collect();
    check_fields(&fields)?;

    let mut exposures = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let exposure = Exposure::from_pairs(
            fields
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").trim().to_string())),
        );
        exposures.push(exposure);
    }

    tracing::debug!("Parsed {} CSV rows", exposures.len());
    Ok(exposures)
}

fn check_fields(fields: &[String]) -> Result<()> {
    let found: BTreeSet<&str> = fields.iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = FIELDS.iter().copied().collect();
    if found == expected {
        return Ok(());
    }

    let missing: Vec<&str> = expected.difference(&found).copied().collect();
    let unexpected: Vec<&str> = found.difference(&expected).copied().collect();
    Err(FeedError::SchemaChanged {
        missing: missing.join(", "),
        unexpected: unexpected.join(", "),
    })
}

/// Day-first date parsing. Values like `10/08/2021 - Tuesday` are split on
/// ` - ` and every piece is tried.
pub fn parse_exposure_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    std::iter::once(raw)
        .chain(raw.split(" - ").map(str::trim))
        .filter(|candidate| !candidate.is_empty())
        .find_map(|candidate| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
        })
}

/// Accepts `10:00am`, `10am`, `10.00 am`, `14:00` and `14:00:00`.
pub fn parse_exposure_time(raw: &str) -> Option<NaiveTime> {
    let mut value: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(|c| if c == '.' { ':' } else { c })
        .collect();

    match value.as_str() {
        "" => return None,
        "midday" | "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    // chrono 需要分鐘欄位
    if !value.contains(':') && (value.ends_with("am") || value.ends_with("pm")) {
        let split = value.len() - 2;
        value.insert_str(split, ":00");
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&value, fmt).ok())
}

pub fn is_time_field(name: &str) -> bool {
    name.contains("Time")
}

/// Put dates and times in ISO form so later runs compare equal even if the
/// publisher changes how they are written.
pub fn normalise(exposures: &mut [Exposure]) {
    for exposure in exposures.iter_mut() {
        for field in exposure.fields.iter_mut() {
            let value = field.value.trim();
            field.value = if field.name == DATE_FIELD {
                match parse_exposure_date(value) {
                    Some(date) => date.to_string(),
                    None => title_case(value),
                }
            } else if is_time_field(&field.name) {
                match parse_exposure_time(value) {
                    Some(time) => time.format("%H:%M:%S").to_string(),
                    None => value.to_lowercase(),
                }
            } else {
                // 其他欄位只去除空白，保留 ACT 之類的縮寫
                value.to_string()
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_LINES: &str = "Event Id,Status,Exposure Site,Street,Suburb,State,Date,Arrival Time,Departure Time,Contact
,,Harvey Norman,Barrier Street,Fyshwick,ACT,10/08/2021 - Tuesday,10:00am,11:00am,Close
,,Canberra Outlet Centre,377 Canberra Avenue,Fyshwick,ACT,08/08/2021 - Sunday,2:00pm,3:30pm,Monitor
,,Gold Creek School (including Early Childhood Learning Centre),Kelleway Avenue,Nicholls,ACT,12/08/2021 - Thursday,8:00am,3:10pm,Close
";

    #[test]
    fn test_parse_csv() {
        let exposures = parse_csv(CSV_LINES).unwrap();
        assert_eq!(exposures.len(), 3);
        assert_eq!(exposures[0].site(), "Harvey Norman");
        assert_eq!(exposures[0].get("Street"), Some("Barrier Street"));
        assert_eq!(exposures[0].get("Event Id"), Some(""));
        assert_eq!(exposures[1].get("Arrival Time"), Some("2:00pm"));
        assert_eq!(exposures[2].suburb(), "Nicholls");
        assert_eq!(exposures[2].fields.len(), FIELDS.len());
    }

    #[test]
    fn test_parse_csv_normalises_headers() {
        let data = "event id, STATUS ,Exposure Site,Street,Suburb,State,Date,Arrival Time,Departure Time,Contact\n,,  Spaced Site  ,A St,Kingston,ACT,1/1/2022,1pm,2pm,Casual\n";
        let exposures = parse_csv(data).unwrap();
        assert_eq!(exposures[0].fields[0].name, "Event Id");
        assert_eq!(exposures[0].fields[1].name, "Status");
        assert_eq!(exposures[0].site(), "Spaced Site");
    }

    #[test]
    fn test_parse_csv_accepts_reordered_columns_and_short_rows() {
        let data = "Contact,Event Id,Status,Exposure Site,Street,Suburb,State,Date,Arrival Time,Departure Time\nClose,,,Cafe,B St,Braddon\n\n,,,,,,,,,\n";
        let exposures = parse_csv(data).unwrap();
        assert_eq!(exposures.len(), 1);
        assert_eq!(exposures[0].get("Contact"), Some("Close"));
        assert_eq!(exposures[0].get("Departure Time"), Some(""));
    }

    #[test]
    fn test_parse_csv_rejects_changed_schema() {
        let data = "Event Id,Status,Exposure Site,Street,Suburb,State,Date,Arrival Time,Departure Time,Notes\n";
        match parse_csv(data) {
            Err(FeedError::SchemaChanged { missing, unexpected }) => {
                assert_eq!(missing, "Contact");
                assert_eq!(unexpected, "Notes");
            }
            other => panic!("expected schema change, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_csv_rejects_empty_input() {
        assert!(parse_csv("").is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("event id"), "Event Id");
        assert_eq!(title_case("ARRIVAL TIME"), "Arrival Time");
        assert_eq!(title_case("o'connor"), "O'Connor");
    }

    #[test]
    fn test_parse_exposure_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 8, 10).unwrap();
        assert_eq!(parse_exposure_date("10/08/2021 - Tuesday"), Some(expected));
        assert_eq!(parse_exposure_date("10/08/21"), Some(expected));
        assert_eq!(parse_exposure_date("2021-08-10"), Some(expected));
        assert_eq!(parse_exposure_date("Tuesday 10 August 2021"), Some(expected));
        assert_eq!(parse_exposure_date("10 August 2021"), Some(expected));
        assert_eq!(parse_exposure_date("sometime last week"), None);
    }

    #[test]
    fn test_parse_exposure_time_formats() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(parse_exposure_time("10:00am"), Some(ten));
        assert_eq!(parse_exposure_time("10am"), Some(ten));
        assert_eq!(parse_exposure_time("10.00 AM"), Some(ten));
        assert_eq!(parse_exposure_time("10:00"), Some(ten));
        assert_eq!(
            parse_exposure_time("3:30pm"),
            NaiveTime::from_hms_opt(15, 30, 0)
        );
        assert_eq!(parse_exposure_time("Noon"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_exposure_time("all day"), None);
    }

    #[test]
    fn test_normalise() {
        let mut exposures = parse_csv(CSV_LINES).unwrap();
        exposures.push(Exposure::from_pairs([
            ("Date", " ongoing "),
            ("Arrival Time", " All Day "),
            ("State", " ACT "),
        ]));
        normalise(&mut exposures);

        assert_eq!(exposures[0].date(), "2021-08-10");
        assert_eq!(exposures[0].get("Arrival Time"), Some("10:00:00"));
        assert_eq!(exposures[1].get("Departure Time"), Some("15:30:00"));
        assert_eq!(exposures[0].get("State"), Some("ACT"));

        assert_eq!(exposures[3].date(), "Ongoing");
        assert_eq!(exposures[3].get("Arrival Time"), Some("all day"));
        assert_eq!(exposures[3].get("State"), Some("ACT"));
    }
}
