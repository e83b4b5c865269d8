// File: tripbot-core/src/repositories/mod.rs

pub mod postgres;

pub use postgres::PostgresChatHistoryRepository;
pub use tripbot_common::traits::repository_traits::ChatHistoryRepository;
