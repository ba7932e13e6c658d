pub mod calculator;
pub mod store;

pub use calculator::Baseline;
pub use store::{BaselineStore, MemoryTtlCache, TtlCache};
