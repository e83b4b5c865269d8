// File: src/services/formatter.rs
//
// Builds reply messages from place and hotel records. Everything here is pure
// except `recommendation_carousel`, which resolves names first.

use std::collections::HashSet;

use tripbot_common::models::{
    base_lang, CardButton, ExtendedPlaceRecord, HotelRecord, ImagemapAction, ImagemapArea, InfoCard,
    PlaceRecord, QuickReply, QuickReplyAction, RatingBlock, ReplyMessage, SearchResult,
    MAX_CAROUSEL_CARDS, MAX_TEXT_LEN,
};
use tripbot_common::traits::Diagnostics;

use crate::config::AppConfig;
use crate::platforms::google::photo_url;
use super::concurrent::join_successes;
use super::intent::{RECOMMEND_HOTELS, RECOMMEND_PLACES};
use super::place_resolver::PlaceResolver;

pub const NO_PLACES_FOUND: &str = "ขออภัย ไม่พบข้อมูลสถานที่ที่แนะนำ ลองระบุชื่อจังหวัดหรือสถานที่อีกครั้งนะคะ";
pub const NO_HOTELS_FOUND: &str = "ขออภัย ไม่พบที่พักในบริเวณนี้";
pub const PLACE_NOT_FOUND: &str = "ขออภัย ไม่พบสถานที่ที่ต้องการ";
pub const FOLLOW_UP: &str = "มีอะไรให้ช่วยเพิ่มเติมไหมคะ เลือกจากเมนูด้านล่างได้เลย";
pub const GREETING: &str = "สวัสดีค่ะ ยินดีต้อนรับสู่ผู้ช่วยเที่ยวภาคเหนือ อยากให้แนะนำที่เที่ยวหรือที่พักที่ไหนบอกได้เลยค่ะ";
pub const GENERIC_ERROR: &str = "ขออภัย ระบบขัดข้องชั่วคราว กรุณาลองใหม่อีกครั้ง";
pub const APOLOGY: &str = "ขออภัย ไม่สามารถดึงข้อมูลได้ในขณะนี้ กรุณาลองใหม่ภายหลัง";
pub const REGION_GUIDANCE: &str = "ขออภัยค่ะ ตอนนี้แนะนำได้เฉพาะภาคเหนือ: เชียงใหม่ เชียงราย ลำปาง ลำพูน แม่ฮ่องสอน น่าน พะเยา แพร่ และอุตรดิตถ์";
pub const SEARCH_LINKS_HEADER: &str = "ลิงก์ข้อมูลเพิ่มเติม";

const HERO_WIDTH: u32 = 800;
const OPEN_MAP_LABEL: &str = "เปิดแผนที่";
const WEBSITE_LABEL: &str = "เว็บไซต์";
const IMAGEMAP_SIZE: u32 = 1040;

#[derive(Debug, Clone)]
pub struct FormatterSettings {
    pub photo_api_key: String,
    pub trip_planner_url: String,
    pub asset_base_url: String,
    pub placeholder_image_url: String,
}

impl From<&AppConfig> for FormatterSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            photo_api_key: config.places_api_key.clone(),
            trip_planner_url: config.trip_planner_url.clone(),
            asset_base_url: config.asset_base_url.clone(),
            placeholder_image_url: config.placeholder_image_url.clone(),
        }
    }
}

/// Quick-reply labels per language: places, hotels, trip planner.
fn menu_labels(lang: &str) -> [&'static str; 3] {
    match base_lang(lang).as_str() {
        "th" => ["แนะนำที่เที่ยว", "แนะนำที่พัก", "วางแผนการเดินทาง"],
        "zh" => ["推荐景点", "推荐住宿", "规划行程"],
        "ja" => ["おすすめ観光地", "おすすめ宿泊", "旅行プラン"],
        "ko" => ["관광지 추천", "숙소 추천", "여행 계획"],
        _ => ["Recommend places", "Recommend hotels", "Plan a trip"],
    }
}

/// Google Maps link centred on the coordinates, pinned to the place id.
pub fn map_link(latitude: f64, longitude: f64, place_id: &str) -> String {
    let mut url = format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        latitude, longitude
    );
    if !place_id.is_empty() {
        url.push_str("&query_place_id=");
        url.push_str(&urlencoding::encode(place_id));
    }
    url
}

/// Drops blanks and repeats, keeping first occurrences in order.
pub fn dedupe_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| PlaceResolver::clean_name(n))
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}

pub struct MessageFormatter {
    settings: FormatterSettings,
}

impl MessageFormatter {
    pub fn new(settings: FormatterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FormatterSettings {
        &self.settings
    }

    fn hero_url(&self, photo_ref: Option<&str>) -> Option<String> {
        photo_ref
            .filter(|r| !r.is_empty())
            .map(|r| photo_url(&self.settings.photo_api_key, r, HERO_WIDTH))
    }

    fn rating_block(rating: f64, count: u32) -> Option<RatingBlock> {
        (rating > 0.0 || count > 0).then_some(RatingBlock { rating, count })
    }

    fn place_card(&self, place: &PlaceRecord, extended: Option<&ExtendedPlaceRecord>) -> InfoCard {
        let hours = extended
            .map(|e| e.opening_hours.clone())
            .or_else(|| place.opening_hours.clone())
            .unwrap_or_default();

        let mut buttons = vec![CardButton {
            label: OPEN_MAP_LABEL.to_string(),
            uri: map_link(place.latitude, place.longitude, &place.place_id),
        }];
        let website = extended
            .and_then(|e| e.website.as_deref())
            .or(place.website.as_deref());
        if let Some(site) = website.filter(|s| s.starts_with("https://")) {
            buttons.push(CardButton { label: WEBSITE_LABEL.to_string(), uri: site.to_string() });
        }

        InfoCard {
            title: place.name.clone(),
            hero_image_url: self.hero_url(place.photo_ref.as_deref()),
            address: Some(place.address.clone()).filter(|a| !a.is_empty()),
            rating: Self::rating_block(place.rating, place.rating_count),
            hours,
            buttons,
        }
    }

    fn hotel_card(&self, hotel: &HotelRecord) -> InfoCard {
        InfoCard {
            title: hotel.name.clone(),
            hero_image_url: self.hero_url(hotel.photo_ref.as_deref()),
            address: Some(hotel.address.clone()).filter(|a| !a.is_empty()),
            rating: Self::rating_block(hotel.rating, hotel.rating_count),
            hours: Vec::new(),
            buttons: vec![CardButton {
                label: OPEN_MAP_LABEL.to_string(),
                uri: map_link(hotel.latitude, hotel.longitude, &hotel.place_id),
            }],
        }
    }

    /// Single card with address, rating, hours and a map button.
    pub fn info_card(&self, place: &PlaceRecord, extended: Option<&ExtendedPlaceRecord>) -> ReplyMessage {
        ReplyMessage::FlexCard {
            alt_text: format!("ข้อมูล {}", place.name),
            card: self.place_card(place, extended),
            quick_reply: None,
        }
    }

    /// The weather intent answers with the location card under a weather title.
    pub fn weather_card(&self, place: &PlaceRecord) -> ReplyMessage {
        let mut card = self.place_card(place, None);
        card.title = format!("สภาพอากาศ {}", place.name);
        ReplyMessage::FlexCard {
            alt_text: format!("สภาพอากาศ {}", place.name),
            card,
            quick_reply: None,
        }
    }

    pub fn location_pin(&self, place: &PlaceRecord) -> ReplyMessage {
        ReplyMessage::Location {
            title: place.name.clone(),
            address: if place.address.is_empty() { place.name.clone() } else { place.address.clone() },
            latitude: place.latitude,
            longitude: place.longitude,
            quick_reply: None,
        }
    }

    /// One card per place, or the not-found sentinel text.
    pub fn place_carousel(&self, places: &[PlaceRecord]) -> ReplyMessage {
        if places.is_empty() {
            return ReplyMessage::text(NO_PLACES_FOUND);
        }
        ReplyMessage::FlexCarousel {
            alt_text: "สถานที่ท่องเที่ยวแนะนำ".to_string(),
            cards: places
                .iter()
                .take(MAX_CAROUSEL_CARDS)
                .map(|p| self.place_card(p, None))
                .collect(),
            quick_reply: None,
        }
    }

    pub fn hotel_carousel(&self, hotels: &[HotelRecord]) -> ReplyMessage {
        if hotels.is_empty() {
            return ReplyMessage::text(NO_HOTELS_FOUND);
        }
        ReplyMessage::FlexCarousel {
            alt_text: "ที่พักแนะนำ".to_string(),
            cards: hotels.iter().take(MAX_CAROUSEL_CARDS).map(|h| self.hotel_card(h)).collect(),
            quick_reply: None,
        }
    }

    /// Dedupes `names`, resolves all of them concurrently and builds the
    /// carousel from whichever resolved. Lookups that fail count as not found.
    pub async fn recommendation_carousel(
        &self,
        resolver: &PlaceResolver,
        names: &[String],
        diagnostics: &dyn Diagnostics,
    ) -> (ReplyMessage, Vec<PlaceRecord>) {
        let names = dedupe_names(names);
        let resolved = join_successes(names.iter().take(MAX_CAROUSEL_CARDS), move |name| async move {
            match resolver.resolve_attraction(name).await {
                Ok(found) => {
                    if found.is_none() {
                        diagnostics.degraded("resolve_place", &format!("'{}' not found", name));
                    }
                    found
                }
                Err(e) => {
                    diagnostics.remote_failure("resolve_place", &e);
                    None
                }
            }
        })
        .await;

        // Two names can resolve to the same place.
        let mut seen = HashSet::new();
        let places: Vec<PlaceRecord> = resolved
            .into_iter()
            .filter(|p| seen.insert(p.place_id.clone()))
            .collect();

        (self.place_carousel(&places), places)
    }

    /// Lists search hits per place. `None` when nothing survived filtering.
    pub fn search_links(&self, groups: &[(String, Vec<SearchResult>)]) -> Option<ReplyMessage> {
        let sections: Vec<String> = groups
            .iter()
            .filter(|(_, results)| !results.is_empty())
            .map(|(name, results)| {
                let lines: Vec<String> = results
                    .iter()
                    .take(3)
                    .map(|r| format!("- {}\n  {}", r.title, r.link))
                    .collect();
                format!("📍 {}\n{}", name, lines.join("\n"))
            })
            .collect();

        if sections.is_empty() {
            return None;
        }

        let mut text = format!("{}\n\n{}", SEARCH_LINKS_HEADER, sections.join("\n\n"));
        if text.chars().count() > MAX_TEXT_LEN {
            text = text.chars().take(MAX_TEXT_LEN - 1).collect::<String>() + "…";
        }
        Some(ReplyMessage::text(text))
    }

    /// Places, hotels, trip planner. Only the labels change with `lang`.
    pub fn quick_reply_menu(&self, lang: &str) -> QuickReply {
        let [places, hotels, plan] = menu_labels(lang);
        QuickReply {
            items: vec![
                QuickReplyAction::Message { label: places.to_string(), text: RECOMMEND_PLACES.to_string() },
                QuickReplyAction::Message { label: hotels.to_string(), text: RECOMMEND_HOTELS.to_string() },
                QuickReplyAction::Uri { label: plan.to_string(), uri: self.settings.trip_planner_url.clone() },
            ],
        }
    }

    /// Attaches the menu to the last message.
    pub fn with_menu(&self, mut messages: Vec<ReplyMessage>, lang: &str) -> Vec<ReplyMessage> {
        if let Some(last) = messages.last_mut() {
            last.set_quick_reply(self.quick_reply_menu(lang));
        }
        messages
    }

    pub fn placeholder_image(&self) -> ReplyMessage {
        ReplyMessage::image(self.settings.placeholder_image_url.clone())
    }

    /// Tourist police / emergency medical, then highway police / disaster line.
    pub fn contact_imagemaps(&self) -> Vec<ReplyMessage> {
        let half = IMAGEMAP_SIZE / 2;
        let left = ImagemapArea { x: 0, y: 0, width: half, height: half };
        let right = ImagemapArea { x: half, y: 0, width: half, height: half };

        let imagemap = |name: &str, alt: &str, numbers: [&str; 2]| ReplyMessage::Imagemap {
            base_url: format!("{}/imagemap/{}", self.settings.asset_base_url, name),
            alt_text: alt.to_string(),
            width: IMAGEMAP_SIZE,
            height: half,
            actions: vec![
                ImagemapAction::Uri { link_uri: format!("tel:{}", numbers[0]), area: left },
                ImagemapAction::Uri { link_uri: format!("tel:{}", numbers[1]), area: right },
            ],
            quick_reply: None,
        };

        vec![
            imagemap("contact-tourist", "ตำรวจท่องเที่ยว 1155 / การแพทย์ฉุกเฉิน 1669", ["1155", "1669"]),
            imagemap("contact-emergency", "ตำรวจ 191 / ตำรวจทางหลวง 1193", ["191", "1193"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new(FormatterSettings {
            photo_api_key: "k".into(),
            trip_planner_url: "https://planner.example/".into(),
            asset_base_url: "https://assets.example".into(),
            placeholder_image_url: "https://assets.example/placeholder.jpg".into(),
        })
    }

    fn place(id: &str) -> PlaceRecord {
        PlaceRecord {
            place_id: id.into(),
            name: format!("place {id}"),
            address: "Chiang Mai".into(),
            latitude: 18.8,
            longitude: 98.9,
            photo_ref: Some("ref".into()),
            rating: 4.6,
            rating_count: 120,
            opening_hours: None,
            website: None,
        }
    }

    #[test]
    fn menu_has_three_actions_and_localized_labels() {
        let f = formatter();
        let th = f.quick_reply_menu("th");
        let en = f.quick_reply_menu("en-US");
        assert_eq!(th.items.len(), 3);
        assert_eq!(th.items[0].label(), "แนะนำที่เที่ยว");
        assert_eq!(en.items[1].label(), "Recommend hotels");
        // payloads do not change with language
        assert_eq!(th.items[0], QuickReplyAction::Message {
            label: "แนะนำที่เที่ยว".into(),
            text: RECOMMEND_PLACES.into(),
        });
        assert!(matches!(&en.items[0], QuickReplyAction::Message { text, .. } if text == RECOMMEND_PLACES));
        assert!(matches!(&en.items[2], QuickReplyAction::Uri { uri, .. } if uri == "https://planner.example/"));
    }

    #[test]
    fn empty_carousels_become_sentinel_text() {
        let f = formatter();
        assert_eq!(f.place_carousel(&[]), ReplyMessage::text(NO_PLACES_FOUND));
        assert_eq!(f.hotel_carousel(&[]), ReplyMessage::text(NO_HOTELS_FOUND));
    }

    #[test]
    fn info_card_has_hero_rating_and_map_button() {
        let f = formatter();
        let ReplyMessage::FlexCard { card, .. } = f.info_card(&place("p1"), None) else {
            panic!("expected a flex card");
        };
        assert!(card.hero_image_url.unwrap().contains("photo_reference=ref"));
        assert_eq!(card.rating, Some(RatingBlock { rating: 4.6, count: 120 }));
        assert!(card.buttons[0].uri.contains("query_place_id=p1"));
        assert!(f.info_card(&place("p1"), None).validate().is_ok());
    }

    #[test]
    fn website_button_needs_https() {
        let f = formatter();
        let details = |site: &str| ExtendedPlaceRecord {
            place: place("p1"),
            opening_hours: vec![],
            website: Some(site.into()),
            canonical_url: None,
            phone: None,
        };

        let plain = f.info_card(&place("p1"), Some(&details("http://plain.example")));
        let ReplyMessage::FlexCard { card, .. } = &plain else {
            panic!("expected a flex card");
        };
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(card.buttons[0].label, OPEN_MAP_LABEL);
        assert!(plain.validate().is_ok());

        let secure = f.info_card(&place("p1"), Some(&details("https://secure.example")));
        let ReplyMessage::FlexCard { card, .. } = &secure else {
            panic!("expected a flex card");
        };
        assert_eq!(card.buttons.len(), 2);
        assert_eq!(card.buttons[1], CardButton {
            label: WEBSITE_LABEL.into(),
            uri: "https://secure.example".into(),
        });
    }

    #[test]
    fn names_are_deduped_in_order() {
        let names: Vec<String> = ["Doi Suthep", "**Doi Suthep**", "", "Night Bazaar: market"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_names(&names), vec!["Doi Suthep", "Night Bazaar"]);
    }

    #[test]
    fn search_links_skip_empty_groups() {
        let f = formatter();
        assert!(f.search_links(&[("a".into(), vec![])]).is_none());
        let msg = f
            .search_links(&[(
                "Doi Suthep".into(),
                vec![SearchResult {
                    title: "Doi Suthep guide".into(),
                    link: "https://x.example".into(),
                    snippet: String::new(),
                }],
            )])
            .unwrap();
        let ReplyMessage::Text { text, .. } = msg else { panic!("expected text") };
        assert!(text.contains("https://x.example"));
    }

    #[test]
    fn contact_imagemaps_dial_numbers() {
        let maps = formatter().contact_imagemaps();
        assert_eq!(maps.len(), 2);
        for m in &maps {
            assert!(m.validate().is_ok());
        }
        let ReplyMessage::Imagemap { actions, .. } = &maps[0] else { panic!("expected imagemap") };
        assert!(matches!(&actions[0], ImagemapAction::Uri { link_uri, .. } if link_uri == "tel:1155"));
    }
}
