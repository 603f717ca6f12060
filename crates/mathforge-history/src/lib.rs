mod store;

pub use store::RingHistory;
