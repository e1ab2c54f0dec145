use super::{render_channel, ChannelMeta};
use crate::core::parse::{is_time_field, parse_exposure_date, parse_exposure_time};
use crate::core::state::by_date_desc;
use crate::domain::model::{Exposure, FeedState, TrackedExposure, DATE_FIELD};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use rss::{GuidBuilder, Item, ItemBuilder};

/// Item description: every field in name order as `<b>name</b>:value<br/>`.
///
/// Dates and times are stored in ISO form and only prettified here, so a
/// display change never alters an item id.
pub fn gen_desc(exposure: &Exposure) -> String {
    let mut fields: Vec<_> = exposure.fields.iter().collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    let mut desc = String::new();
    for field in fields {
        let value = if field.name == DATE_FIELD {
            parse_exposure_date(&field.value)
                .map(|d| d.format("%A, %d %B %Y").to_string())
                .unwrap_or_else(|| field.value.clone())
        } else if is_time_field(&field.name) {
            parse_exposure_time(&field.value)
                .map(|t| t.format("%H%M").to_string())
                .unwrap_or_else(|| field.value.clone())
        } else {
            field.value.clone()
        };
        desc.push_str(&format!("<b>{}</b>:{}<br/>", field.name, value));
    }
    desc
}

fn to_item(tracked: &TrackedExposure) -> Item {
    let exposure = &tracked.exposure;
    ItemBuilder::default()
        .title(exposure.title())
        .description(gen_desc(exposure))
        .guid(
            GuidBuilder::default()
                .permalink(false)
                .value(exposure.id.clone())
                .build(),
        )
        .pub_date(tracked.first_seen.to_rfc2822())
        .build()
}

/// Newest first, then by exposure date, then by title.
pub fn ordered(state: &FeedState) -> Vec<&TrackedExposure> {
    let mut tracked: Vec<_> = state.exposures.values().collect();
    tracked.sort_by(|a, b| {
        b.first_seen
            .cmp(&a.first_seen)
            .then_with(|| by_date_desc(&a.exposure, &b.exposure))
    });
    tracked
}

/// Render the item feed for every exposure in `state`.
pub fn gen_feed(state: &FeedState, meta: ChannelMeta<'_>, now: DateTime<Utc>) -> Result<String> {
    let items = ordered(state).into_iter().map(to_item).collect();
    render_channel(meta, items, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{identity::gen_id, parse::normalise, parse::parse_csv, state::update_state};
    use crate::domain::region::gen_region;
    use chrono::TimeZone;

    const CSV_LINES: &str = "Event Id,Status,Exposure Site,Street,Suburb,State,Date,Arrival Time,Departure Time,Contact
,,Harvey Norman,Barrier Street,Fyshwick,ACT,10/08/2021 - Tuesday,10:00am,11:00am,Close
,,Canberra Outlet Centre,377 Canberra Avenue,Fyshwick,ACT,08/08/2021 - Sunday,2:00pm,3:30pm,Monitor
,,Gold Creek School (including Early Childhood Learning Centre),Kelleway Avenue,Nicholls,ACT,12/08/2021 - Thursday,8:00am,3:10pm,Close
";

    const META: ChannelMeta<'static> = ChannelMeta {
        title: "ACT Exposure Locations",
        link: "https://www.covid19.act.gov.au/act-status-and-response/act-covid-19-exposure-locations",
        description: "Feed scraped from ACT exposure website",
    };

    fn preprocessed() -> Vec<Exposure> {
        let mut exposures = parse_csv(CSV_LINES).unwrap();
        normalise(&mut exposures);
        gen_region(&mut exposures);
        gen_id(&mut exposures);
        exposures
    }

    #[test]
    fn test_gen_desc() {
        let exposures = preprocessed();
        assert_eq!(
            gen_desc(&exposures[2]),
            "<b>Arrival Time</b>:0800<br/><b>Contact</b>:Close<br/><b>Date</b>:Thursday, 12 August 2021<br/>\
             <b>Departure Time</b>:1510<br/><b>Event Id</b>:<br/>\
             <b>Exposure Site</b>:Gold Creek School (including Early Childhood Learning Centre)<br/>\
             <b>Region</b>:Gungahlin<br/><b>State</b>:ACT<br/><b>Status</b>:<br/>\
             <b>Street</b>:Kelleway Avenue<br/><b>Suburb</b>:Nicholls<br/>"
        );
    }

    #[test]
    fn test_gen_desc_keeps_unparsed_values() {
        let exposure = Exposure::from_pairs([("Date", "Ongoing"), ("Arrival Time", "all day")]);
        assert_eq!(
            gen_desc(&exposure),
            "<b>Arrival Time</b>:all day<br/><b>Date</b>:Ongoing<br/>"
        );
    }

    #[test]
    fn test_rss_full() {
        let now = Utc.with_ymd_and_hms(2021, 8, 20, 14, 53, 44).unwrap();
        let mut state = FeedState::default();
        update_state(&mut state, preprocessed(), now);

        let xml = gen_feed(&state, META, now).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "ACT Exposure Locations");
        assert_eq!(channel.docs(), Some(crate::feed::RSS_DOCS));
        assert_eq!(channel.last_build_date(), Some("Fri, 20 Aug 2021 14:53:44 +0000"));

        let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
        assert_eq!(
            titles,
            vec![
                "Nicholls:Gold Creek School (including Early Childhood Learning Centre)",
                "Fyshwick:Harvey Norman",
                "Fyshwick:Canberra Outlet Centre",
            ]
        );

        let first = &channel.items()[0];
        assert_eq!(first.pub_date(), Some("Fri, 20 Aug 2021 14:53:44 +0000"));
        let guid = first.guid().unwrap();
        assert!(!guid.is_permalink());
        let nicholls = state
            .exposures
            .values()
            .find(|t| t.exposure.suburb() == "Nicholls")
            .unwrap();
        assert_eq!(guid.value(), nicholls.exposure.id);
        assert!(xml.contains("<![CDATA[<b>Arrival Time</b>:0800<br/>"));
    }

    #[test]
    fn test_newer_items_come_first() {
        let t1 = Utc.timestamp_opt(1, 0).unwrap();
        let t2 = Utc.timestamp_opt(2, 0).unwrap();
        let exposures = preprocessed();

        let mut state = FeedState::default();
        update_state(&mut state, vec![exposures[2].clone()], t1);
        update_state(&mut state, exposures, t2);

        let order: Vec<_> = ordered(&state).iter().map(|t| t.exposure.site().to_string()).collect();
        assert_eq!(
            order,
            vec![
                "Harvey Norman",
                "Canberra Outlet Centre",
                "Gold Creek School (including Early Childhood Learning Centre)",
            ]
        );
    }
}
