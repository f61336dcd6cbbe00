pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod favorites;
pub mod gamification;
pub mod imagery;
pub mod models;
pub mod protocol;
pub mod quiz;
pub mod storage;
pub mod store;
pub mod text;

pub use config::VorbaConfig;
pub use error::VorbaError;
pub use favorites::{Favorites, HistoryEntry};
pub use models::{NewProverb, Proverb};
pub use protocol::{ApiResponse, VorbaRequest};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage};
pub use store::{MemoryProverbStore, PgProverbStore, ProverbFilter, ProverbStore, SortOrder};
