// File: tripbot-core/src/test_utils/mod.rs

pub mod fakes;

pub use fakes::{
    candidate, FakeCompletion, FakePlaces, FakeSearch, FakeTranslation, FakeVision, FakeWorld,
    RecordingTransport,
};
