pub mod db;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use models::{
    Settings, BLOCK_LIST_KEY, DEFAULT_BLOCK_LIST, DEFAULT_WARNING_DELAY_SECS,
    MIN_WARNING_DELAY_SECS, TIMER_STATE_KEY, WARNING_DELAY_KEY,
};
