// File: src/services/intent.rs
//
// Keyword-driven intent classification for inbound text, plus the
// numbered-list heuristic applied to model replies.

use once_cell::sync::Lazy;
use regex::Regex;

use super::region::{matching_province, REGION_NAME};

pub const RECOMMEND_PLACES: &str = "แนะนำที่เที่ยว";
pub const PLACE_INFO: &str = "ข้อมูลเกี่ยวกับ";
pub const RECOMMEND_HOTELS: &str = "แนะนำที่พัก";
pub const NEED_LODGING: &str = "ต้องการที่พัก";
pub const WEATHER: &str = "สภาพอากาศ";
pub const MAP: &str = "แผนที่";
pub const CONTACT_AUTHORITIES: &str = "ติดต่อหน่วยงานที่เกี่ยวข้อง";

/// Marker the persona asks the model to emit when an image should be shown.
pub const SHOW_IMAGE_MARKER: &str = "[แสดงรูปภาพ]";

static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    RecommendPlaces { destination: String },
    PlaceInfo { place: String },
    RecommendHotels { destination: String },
    Weather { place: String },
    Map { place: String },
    ContactAuthorities,
    /// Anything else goes to the language model verbatim.
    Chat { text: String },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::RecommendPlaces { .. } => "recommend_places",
            Intent::PlaceInfo { .. } => "place_info",
            Intent::RecommendHotels { .. } => "recommend_hotels",
            Intent::Weather { .. } => "weather",
            Intent::Map { .. } => "map",
            Intent::ContactAuthorities => "contact_authorities",
            Intent::Chat { .. } => "chat",
        }
    }
}

/// First match wins, in the order the arms are written.
pub fn classify(text: &str) -> Intent {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix(RECOMMEND_PLACES) {
        return Intent::RecommendPlaces { destination: destination_or_region(rest) };
    }
    if let Some(rest) = text.strip_prefix(PLACE_INFO) {
        return Intent::PlaceInfo { place: rest.trim().to_string() };
    }
    if let Some(rest) = text.strip_prefix(RECOMMEND_HOTELS) {
        return Intent::RecommendHotels { destination: destination_or_region(rest) };
    }
    if text.contains(NEED_LODGING) {
        let rest = text.replacen(NEED_LODGING, " ", 1);
        return Intent::RecommendHotels { destination: lodging_destination(&rest) };
    }
    if let Some(rest) = text.strip_prefix(WEATHER) {
        return Intent::Weather { place: rest.trim().to_string() };
    }
    if let Some(rest) = text.strip_prefix(MAP) {
        return Intent::Map { place: rest.trim().to_string() };
    }
    if text == CONTACT_AUTHORITIES {
        return Intent::ContactAuthorities;
    }
    Intent::Chat { text: text.to_string() }
}

fn destination_or_region(rest: &str) -> String {
    let rest = rest.trim();
    if rest.is_empty() {
        REGION_NAME.to_string()
    } else {
        rest.to_string()
    }
}

/// The keyword can sit mid-sentence, so the words around it are not a place
/// name. A named province wins; unrecognised leftovers are kept so the region
/// gate can still turn them away.
fn lodging_destination(rest: &str) -> String {
    if let Some(province) = matching_province(rest) {
        return province.to_string();
    }
    if rest.contains(REGION_NAME) {
        return REGION_NAME.to_string();
    }
    destination_or_region(rest)
}

/// Place names from lines shaped like `1. **Name**: description`.
///
/// Lines without a leading number are skipped, never treated as an error.
pub fn extract_numbered_list(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| NUMBERED_LINE.is_match(line))
        .map(|line| {
            let without_number = NUMBERED_LINE.replace(line, "");
            let unbolded = without_number.replace("**", "");
            unbolded
                .split(':')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Whether a model reply should go down the recommendation path.
pub fn looks_like_numbered_list(reply: &str) -> bool {
    !extract_numbered_list(reply).is_empty()
}
