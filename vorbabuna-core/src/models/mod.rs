pub mod proverb;
pub mod stats;

pub use proverb::{NewProverb, Proverb};
pub use stats::{CategoryStat, DailyActivity, OverallStats, ProverbStats, RegionStat};
