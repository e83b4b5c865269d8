// tests/dispatcher_tests.rs

use std::sync::Arc;

use tripbot_common::models::{
    ChatTurn, ImageAnnotation, ImageLabel, InboundPayload, LatLng, Landmark, PlaceCandidate,
    PlaceDetails, ReplyMessage, SearchResult,
};
use tripbot_common::traits::ChatHistoryRepository;
use tripbot_core::services::dispatcher::{Dispatcher, DispatcherSettings};
use tripbot_core::services::formatter::{
    FormatterSettings, APOLOGY, FOLLOW_UP, GREETING, NO_PLACES_FOUND, PLACE_NOT_FOUND,
    REGION_GUIDANCE,
};
use tripbot_core::services::hotel_finder::{HotelFinder, FALLBACK_ANCHOR, LODGING_RADIUS_M};
use tripbot_core::services::place_resolver::PlaceResolver;
use tripbot_core::services::RecordingDiagnostics;
use tripbot_core::test_utils::{
    candidate, FakeCompletion, FakePlaces, FakeSearch, FakeTranslation, FakeVision, FakeWorld,
};

const PLANNER: &str = "https://planner.example/";

fn settings() -> DispatcherSettings {
    DispatcherSettings {
        formatter: FormatterSettings {
            photo_api_key: "places-key".into(),
            trip_planner_url: PLANNER.into(),
            asset_base_url: "https://assets.example".into(),
            placeholder_image_url: "https://assets.example/placeholder.jpg".into(),
        },
        persona: "test persona".into(),
        history_limit: 10,
    }
}

fn dispatcher(world: &FakeWorld) -> Dispatcher {
    Dispatcher::new(settings(), world.collaborators())
}

fn text(t: &str) -> InboundPayload {
    InboundPayload::Text { text: t.to_string() }
}

fn text_of(message: &ReplyMessage) -> &str {
    match message {
        ReplyMessage::Text { text, .. } => text,
        other => panic!("expected text, got {}", other.kind()),
    }
}

fn assert_menu_on_last_only(messages: &[ReplyMessage]) {
    let (last, rest) = messages.split_last().expect("non-empty reply");
    let menu = last.quick_reply().expect("menu on last message");
    assert_eq!(menu.items.len(), 3);
    assert!(rest.iter().all(|m| m.quick_reply().is_none()));
}

fn chiang_mai_places() -> FakePlaces {
    FakePlaces::new()
        .with_search("วัดพระธาตุดอยสุเทพ", vec![candidate("p1", "วัดพระธาตุดอยสุเทพ", 18.80, 98.92, 4.8, 5000)])
        .with_search(
            "ดอยอินทนนท์",
            vec![
                candidate("p2-low", "ดอยอินทนนท์ จุดชมวิว", 18.59, 98.48, 4.1, 50),
                candidate("p2", "ดอยอินทนนท์", 18.58, 98.48, 4.9, 3000),
            ],
        )
        .with_search("เชียงใหม่", vec![candidate("cm", "เชียงใหม่", 18.79, 98.98, 4.5, 100)])
        .with_lodging(vec![
            candidate("h1", "Hotel One", 18.78, 98.99, 4.0, 10),
            candidate("h2", "Hotel Two", 18.78, 98.99, 4.9, 20),
            PlaceCandidate { place_id: "h-nowhere".into(), name: "No Geometry Inn".into(), rating: Some(5.0), ..Default::default() },
            candidate("h3", "Hotel Three", 18.78, 98.99, 4.7, 5),
            candidate("h4", "Hotel Four", 18.78, 98.99, 4.7, 50),
        ])
}

#[tokio::test]
async fn chiang_mai_recommendation_builds_carousels_and_links() {
    let completion = FakeCompletion::replying(
        "1. **วัดพระธาตุดอยสุเทพ**: วัดคู่เมือง\n2. ดอยอินทนนท์: ยอดเขาสูงสุด\nขอให้สนุกกับการเที่ยว",
    );
    let world = FakeWorld {
        search: Arc::new(FakeSearch::returning(vec![SearchResult {
            title: "รีวิว วัดพระธาตุดอยสุเทพ".into(),
            link: "https://blog.example/doi-suthep".into(),
            snippet: "เที่ยวเชียงใหม่".into(),
        }])),
        ..FakeWorld::new(completion, chiang_mai_places())
    };

    let replies = dispatcher(&world).dispatch("U1", &text("แนะนำที่เที่ยว เชียงใหม่")).await;

    // the model was asked once, for five places in the destination
    let prompts = world.completion.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("เชียงใหม่"));
    assert!(prompts[0].contains("5 แห่ง"));

    assert_eq!(replies.len(), 4);
    match &replies[0] {
        ReplyMessage::FlexCarousel { cards, .. } => {
            let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(titles, vec!["วัดพระธาตุดอยสุเทพ", "ดอยอินทนนท์"]);
        }
        other => panic!("expected place carousel, got {}", other.kind()),
    }
    match &replies[1] {
        ReplyMessage::FlexCarousel { cards, .. } => {
            let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(titles, vec!["Hotel Two", "Hotel Four", "Hotel Three"]);
        }
        other => panic!("expected hotel carousel, got {}", other.kind()),
    }
    assert!(text_of(&replies[2]).contains("https://blog.example/doi-suthep"));
    assert_eq!(text_of(&replies[3]), FOLLOW_UP);
    assert_menu_on_last_only(&replies);

    // hotels were searched around the resolved destination
    let nearby = world.places.nearby_calls();
    assert_eq!(nearby.len(), 1);
    assert_eq!((nearby[0].0, nearby[0].1), (18.79, 98.98));
    assert_eq!(nearby[0].2, LODGING_RADIUS_M);
    assert_eq!(nearby[0].3, "lodging");

    for reply in &replies {
        reply.validate().expect("valid message");
    }
}

#[tokio::test]
async fn out_of_region_destination_gets_guidance_and_no_lookups() {
    let world = FakeWorld::new(FakeCompletion::replying("1. วัดพระแก้ว"), chiang_mai_places());
    let d = dispatcher(&world);

    for request in ["แนะนำที่เที่ยว กรุงเทพ", "แนะนำที่พัก ภูเก็ต", "ต้องการที่พักแถวพัทยา"] {
        let replies = d.dispatch("U1", &text(request)).await;
        assert_eq!(replies.len(), 1, "{request}");
        assert_eq!(text_of(&replies[0]), REGION_GUIDANCE);
        assert!(replies[0].quick_reply().is_some());
    }

    assert_eq!(world.completion.calls(), 0);
    assert_eq!(world.places.total_calls(), 0);
    assert!(world.search.queries().is_empty());
}

#[tokio::test]
async fn sticker_gets_one_greeting_regardless_of_history() {
    let world = FakeWorld::new(FakeCompletion::replying("unused"), FakePlaces::new());
    world
        .history
        .append_turns("U1", &[ChatTurn::user("แนะนำที่พัก"), ChatTurn::model("...")])
        .await
        .unwrap();

    let replies = dispatcher(&world)
        .dispatch("U1", &InboundPayload::Sticker { package_id: "446".into(), sticker_id: "1988".into() })
        .await;

    assert_eq!(replies.len(), 1);
    assert_eq!(text_of(&replies[0]), GREETING);
    assert!(replies[0].quick_reply().is_some());
    assert_eq!(world.completion.calls(), 0);
    assert_eq!(world.translator.detect_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hotel_anchor_falls_back_to_fixed_coordinates() {
    let places = FakePlaces::new().with_lodging(vec![candidate("h1", "Riverside", 18.78, 98.99, 4.2, 12)]);
    let world = FakeWorld::new(FakeCompletion::replying("unused"), places);

    let replies = dispatcher(&world).dispatch("U1", &text("แนะนำที่พัก น่าน")).await;

    assert_eq!(world.places.text_queries(), vec!["น่าน", "เชียงใหม่", "เชียงราย"]);
    let nearby = world.places.nearby_calls();
    assert_eq!(nearby.len(), 1);
    assert_eq!((nearby[0].0, nearby[0].1), (FALLBACK_ANCHOR.lat, FALLBACK_ANCHOR.lng));

    assert!(matches!(&replies[0], ReplyMessage::FlexCarousel { cards, .. } if cards.len() == 1));
    assert_eq!(text_of(replies.last().unwrap()), FOLLOW_UP);
}

#[tokio::test]
async fn lodging_request_mid_sentence_searches_the_province() {
    let places = FakePlaces::new()
        .with_search("ลำปาง", vec![candidate("lp", "ลำปาง", 18.29, 99.49, 4.4, 80)])
        .with_lodging(vec![candidate("h1", "Wienglakor", 18.29, 99.50, 4.3, 40)]);
    let world = FakeWorld {
        search: Arc::new(FakeSearch::returning(vec![SearchResult {
            title: "โรงแรมในลำปาง ราคาดี".into(),
            link: "https://hotels.example/lampang".into(),
            snippet: "ที่พักใจกลางเมือง".into(),
        }])),
        ..FakeWorld::new(FakeCompletion::replying("unused"), places)
    };

    let replies = dispatcher(&world).dispatch("U1", &text("ฉันต้องการที่พักที่ลำปาง")).await;

    assert_eq!(world.places.text_queries(), vec!["ลำปาง"]);
    assert_eq!(world.search.queries(), vec!["โรงแรม ที่พัก ใกล้ ลำปาง"]);
    let kinds: Vec<&str> = replies.iter().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec!["flexCarousel", "text", "text"]);
    assert!(text_of(&replies[1]).contains("https://hotels.example/lampang"));
    assert_eq!(text_of(&replies[2]), FOLLOW_UP);
}

#[tokio::test]
async fn hotel_finder_survives_failing_lookups() {
    let places = Arc::new(FakePlaces::failing());
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let resolver = Arc::new(PlaceResolver::new(places.clone()));
    let finder = HotelFinder::new(resolver, places.clone(), diagnostics.clone());

    let hotels = finder.find_hotels("เชียงใหม่").await.unwrap();

    assert!(hotels.is_empty());
    assert_eq!(diagnostics.failures_for("hotel_anchor"), 3);
    assert_eq!(places.nearby_calls().len(), 1);
}

#[tokio::test]
async fn resolver_never_returns_places_without_coordinates() {
    let unlocated = PlaceCandidate {
        place_id: "x".into(),
        name: "ถ้ำลับแล".into(),
        rating: Some(5.0),
        rating_count: Some(999),
        ..Default::default()
    };
    let places = FakePlaces::new().with_search("ถ้ำลับแล", vec![unlocated]);
    let world = FakeWorld::new(FakeCompletion::replying("unused"), places);

    let resolver = PlaceResolver::new(world.places.clone());
    assert!(resolver.resolve_attraction("ถ้ำลับแล").await.unwrap().is_none());

    let replies = dispatcher(&world).dispatch("U1", &text("แผนที่ ถ้ำลับแล")).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(text_of(&replies[0]), PLACE_NOT_FOUND);
}

#[tokio::test]
async fn map_and_weather_use_the_resolved_place() {
    let world = FakeWorld::new(FakeCompletion::replying("unused"), chiang_mai_places());
    let d = dispatcher(&world);

    let map = d.dispatch("U1", &text("แผนที่ ดอยอินทนนท์")).await;
    assert!(matches!(&map[0], ReplyMessage::Location { title, .. } if title == "ดอยอินทนนท์"));
    assert_eq!(map.len(), 2);

    let weather = d.dispatch("U1", &text("สภาพอากาศ ดอยอินทนนท์")).await;
    match &weather[0] {
        ReplyMessage::FlexCard { card, .. } => assert!(card.title.contains("ดอยอินทนนท์")),
        other => panic!("expected card, got {}", other.kind()),
    }
    assert_menu_on_last_only(&weather);
}

#[tokio::test]
async fn place_info_includes_details() {
    let places = chiang_mai_places().with_details(PlaceDetails {
        place_id: "p1".into(),
        name: "วัดพระธาตุดอยสุเทพ".into(),
        address: Some("ถนนศรีวิชัย".into()),
        location: Some(LatLng { lat: 18.80, lng: 98.92 }),
        opening_hours: vec!["จันทร์: 06:00–18:00".into()],
        website: Some("https://doisuthep.example".into()),
        ..Default::default()
    });
    let world = FakeWorld::new(FakeCompletion::replying("unused"), places);

    let replies = dispatcher(&world).dispatch("U1", &text("ข้อมูลเกี่ยวกับ วัดพระธาตุดอยสุเทพ")).await;

    match &replies[0] {
        ReplyMessage::FlexCard { card, .. } => {
            assert_eq!(card.hours, vec!["จันทร์: 06:00–18:00"]);
            assert!(card.buttons.iter().any(|b| b.uri == "https://doisuthep.example"));
        }
        other => panic!("expected card, got {}", other.kind()),
    }
    assert_eq!(text_of(replies.last().unwrap()), FOLLOW_UP);
}

#[tokio::test]
async fn contact_authorities_sends_two_imagemaps() {
    let world = FakeWorld::new(FakeCompletion::replying("unused"), FakePlaces::new());
    let replies = dispatcher(&world).dispatch("U1", &text("ติดต่อหน่วยงานที่เกี่ยวข้อง")).await;

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].kind(), "imagemap");
    assert_eq!(replies[1].kind(), "imagemap");
    assert_menu_on_last_only(&replies);
}

#[tokio::test]
async fn chat_reply_with_numbered_list_takes_the_recommendation_path() {
    let completion = FakeCompletion::replying("ลองไปที่นี่ดูค่ะ\n1. ดอยอินทนนท์: สวย\n2. ที่ไม่มีจริง");
    let world = FakeWorld::new(completion, chiang_mai_places());

    let replies = dispatcher(&world).dispatch("U1", &text("หน้าหนาวไปเที่ยวไหนดี")).await;

    assert!(matches!(&replies[0], ReplyMessage::FlexCarousel { cards, .. } if cards.len() == 1));
    // the raw message went to the model as-is
    assert_eq!(world.completion.prompts(), vec!["หน้าหนาวไปเที่ยวไหนดี"]);
    // the unknown name was reported, not fatal
    assert!(world.diagnostics.records().iter().any(|r| r.operation() == "resolve_place"));
}

#[tokio::test]
async fn numbered_list_with_nothing_resolvable_gives_sentinel_first() {
    let world = FakeWorld::new(FakeCompletion::replying("1. ไม่มีจริง\n2. ก็ไม่มี"), FakePlaces::new());
    let replies = dispatcher(&world).dispatch("U1", &text("แนะนำที่เที่ยว ลำพูน")).await;
    assert_eq!(text_of(&replies[0]), NO_PLACES_FOUND);
    assert!(replies.last().unwrap().quick_reply().is_some());
}

#[tokio::test]
async fn image_marker_returns_placeholder_image() {
    let world = FakeWorld::new(FakeCompletion::replying("นี่คือวัดร่องขุ่นค่ะ [แสดงรูปภาพ]"), FakePlaces::new());
    let replies = dispatcher(&world).dispatch("U1", &text("ขอดูรูปวัดร่องขุ่น")).await;

    assert_eq!(replies.len(), 2);
    assert_eq!(text_of(&replies[0]), "นี่คือวัดร่องขุ่นค่ะ");
    assert!(matches!(&replies[1], ReplyMessage::Image { original_url, .. } if original_url.ends_with("placeholder.jpg")));
    assert!(replies[1].quick_reply().is_some());
}

#[tokio::test]
async fn plain_chat_is_translated_for_foreign_users() {
    let world = FakeWorld {
        translator: Arc::new(FakeTranslation::detecting("en-GB")),
        ..FakeWorld::new(FakeCompletion::replying("ยินดีค่ะ"), FakePlaces::new())
    };
    let replies = dispatcher(&world).dispatch("U1", &text("thank you")).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(text_of(&replies[0]), "[en] ยินดีค่ะ");
    let menu = replies[0].quick_reply().unwrap();
    assert_eq!(menu.items[0].label(), "Recommend places");
}

#[tokio::test]
async fn completion_failure_becomes_apology() {
    let world = FakeWorld::new(FakeCompletion::failing(), FakePlaces::new());
    let replies = dispatcher(&world).dispatch("U1", &text("สวัสดี")).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(text_of(&replies[0]), APOLOGY);
    assert!(replies[0].quick_reply().is_some());
    assert_eq!(world.diagnostics.failures_for("chat"), 1);
}

#[tokio::test]
async fn chat_history_is_threaded_through_completions() {
    let world = FakeWorld::new(FakeCompletion::replying("โอเคค่ะ"), FakePlaces::new());
    let d = dispatcher(&world);

    d.dispatch("U1", &text("สวัสดี")).await;
    d.dispatch("U1", &text("ขอบคุณ")).await;

    assert_eq!(world.completion.prior_counts(), vec![0, 2]);
    let history = world.history.get("U1").await.unwrap().unwrap();
    assert_eq!(history.turns.len(), 4);
}

#[tokio::test]
async fn image_with_known_landmark_gets_info_card() {
    let annotation = ImageAnnotation {
        labels: vec![ImageLabel { description: "Temple".into(), score: 0.9 }],
        landmarks: vec![Landmark {
            description: "วัดพระธาตุดอยสุเทพ".into(),
            score: 0.8,
            location: Some(LatLng { lat: 18.80, lng: 98.92 }),
        }],
    };
    let world = FakeWorld {
        vision: Arc::new(FakeVision::returning(annotation)),
        ..FakeWorld::new(FakeCompletion::replying("unused"), chiang_mai_places())
    };

    let replies = dispatcher(&world)
        .dispatch("U1", &InboundPayload::Image { message_id: "m1".into() })
        .await;

    assert!(matches!(&replies[0], ReplyMessage::FlexCard { card, .. } if card.title == "วัดพระธาตุดอยสุเทพ"));
    assert_menu_on_last_only(&replies);
}

#[tokio::test]
async fn image_without_landmark_lists_labels() {
    let annotation = ImageAnnotation {
        labels: vec![
            ImageLabel { description: "Mountain".into(), score: 0.95 },
            ImageLabel { description: "Cloud".into(), score: 0.9 },
        ],
        landmarks: vec![],
    };
    let world = FakeWorld {
        vision: Arc::new(FakeVision::returning(annotation)),
        ..FakeWorld::new(FakeCompletion::replying("unused"), FakePlaces::new())
    };

    let replies = dispatcher(&world)
        .dispatch("U1", &InboundPayload::Image { message_id: "m1".into() })
        .await;

    assert_eq!(replies.len(), 1);
    assert!(text_of(&replies[0]).contains("Mountain, Cloud"));
}
