// File: tripbot-common/src/models/mod.rs
pub mod chat;
pub mod event;
pub mod lang;
pub mod message;
pub mod place;
pub mod plan;
pub mod vision;

pub use chat::{ChatHistory, ChatRole, ChatTurn, MAX_HISTORY_TURNS};
pub use event::{InboundEvent, InboundPayload};
pub use lang::{base_lang, Localized, DEFAULT_LANG};
pub use message::{
    CardButton, ImagemapAction, ImagemapArea, InfoCard, QuickReply, QuickReplyAction, RatingBlock,
    ReplyMessage, MAX_CAROUSEL_CARDS, MAX_MESSAGES_PER_BATCH, MAX_QUICK_REPLY_LABEL, MAX_TEXT_LEN,
};
pub use place::{
    ExtendedPlaceRecord, HotelRecord, LatLng, PlaceCandidate, PlaceDetails, PlaceRecord,
    SearchContext, SearchResult, rank_candidates,
};
pub use plan::PlanRequest;
pub use vision::{ImageAnnotation, ImageLabel, Landmark};
