//! Canberra suburb to district lookup.
//!
//! Suburbs follow the Wikipedia list of Canberra suburbs, plus the town
//! centres and shopping precincts that show up in the exposure data.

use crate::domain::model::{Exposure, REGION_FIELD};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const OTHER_REGION: &str = "Other";

pub const CBR_REGIONS: &[(&str, &[&str])] = &[
    (
        "Belconnen",
        &[
            "Aranda", "Belconnen", "Belconnen Town Centre", "Emu Ridge", "Bruce", "Charnwood", "Cook",
            "Dunlop", "Evatt", "Florey", "Flynn", "Fraser", "Giralang", "Hawker", "Higgins", "Holt",
            "Kippax Centre", "Kaleen", "Latham", "Lawson", "Macgregor", "Macnamara", "Macquarie",
            "Jamison Centre", "Jamison", "McKellar", "Melba", "Page", "Scullin", "Spence", "Strathnairn",
            "Weetangera",
        ],
    ),
    (
        "Inner North",
        &[
            "Acton", "Ainslie", "Braddon", "Campbell", "Duntroon", "City", "Canberra City", "Civic",
            "Dickson", "Dickson Centre", "Downer", "Hackett", "Lyneham", "North Lyneham", "O'Connor",
            "Reid", "Russell", "Turner", "Watson",
        ],
    ),
    (
        "Inner South",
        &[
            "Barton", "Capital Hill", "Deakin", "Forrest", "Fyshwick", "Griffith", "Manuka", "Kingston",
            "The Causeway", "Narrabundah", "Parkes", "Red Hill", "Yarralumla",
        ],
    ),
    (
        "Gungahlin",
        &[
            "Amaroo", "Bonner", "Casey", "Crace", "Forde", "Franklin", "Gungahlin", "Gungahlin Town Centre",
            "Harrison", "Jacka", "Kenny", "Kinlyside", "Mitchell", "Moncrieff", "Ngunnawal", "Nicholls",
            "Palmerston", "Taylor", "Throsby",
        ],
    ),
    (
        "Jerrabomberra",
        &["Beard", "Hume", "Oaks Estate", "Symonston", "Jerrabomberra"],
    ),
    (
        "Majura",
        &["Canberra Airport", "Airport", "Pialligo", "Majura Park", "Majura"],
    ),
    (
        "Molonglo Valley",
        &["Denman Prospect", "Coombs", "Molonglo", "Molonglo Valley", "Sulman", "Whitlam", "Wright"],
    ),
    (
        "Tuggeranong",
        &[
            "Banks", "Bonython", "Calwell", "Chisholm", "Conder", "Fadden", "Gilmore", "Gordon", "Gowrie",
            "Greenway", "Tuggeranong Town Centre", "Isabella Plains", "Kambah", "Kambah Village Centre",
            "Macarthur", "Monash", "Oxley", "Richardson", "Theodore", "Wanniassa", "Erindale Centre",
            "Tuggeranong",
        ],
    ),
    (
        "Weston Creek",
        &[
            "Chapman", "Duffy", "Fisher", "Holder", "Rivett", "Stirling", "Waramanga", "Weston",
            "Weston Creek", "Weston Creek Centre",
        ],
    ),
    (
        "Woden Valley",
        &[
            "Chifley", "Curtin", "Curtin Centre", "Farrer", "Garran", "Hughes", "Isaacs", "Lyons", "Mawson",
            "Southlands Centre", "O'Malley", "Pearce", "Phillip", "Woden", "Woden Town Centre",
            "Swinger Hill", "Torrens",
        ],
    ),
];

static NORMALISED_REGIONS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    CBR_REGIONS
        .iter()
        .flat_map(|(region, suburbs)| suburbs.iter().map(move |s| (normalise_suburb(s), *region)))
        .collect()
});

/// Lowercase and drop everything that is not a word character, so
/// `O'Connor`, `o connor` and `OCONNOR` compare equal.
pub fn normalise_suburb(suburb: &str) -> String {
    suburb
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn suburb_to_region(suburb: &str) -> &'static str {
    NORMALISED_REGIONS
        .get(&normalise_suburb(suburb))
        .copied()
        .unwrap_or(OTHER_REGION)
}

/// 為每筆資料加上 Region 欄位
pub fn gen_region(exposures: &mut [Exposure]) {
    for exposure in exposures.iter_mut() {
        let region = suburb_to_region(exposure.suburb());
        exposure.set(REGION_FIELD, region);
    }
}
