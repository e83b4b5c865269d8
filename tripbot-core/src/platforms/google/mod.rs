// File: src/platforms/google/mod.rs

pub mod places;
pub mod search;
pub mod translate;
pub mod vision;

pub use places::{photo_url, GooglePlacesClient};
pub use search::GoogleCustomSearchClient;
pub use translate::GoogleTranslateClient;
pub use vision::GoogleVisionClient;
