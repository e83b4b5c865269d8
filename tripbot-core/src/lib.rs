// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod platforms;
pub mod services;
pub mod test_utils;

pub use config::AppConfig;
pub use db::Database;
pub use tripbot_common::error::Error;
