pub mod chat_history;

pub use chat_history::PostgresChatHistoryRepository;
