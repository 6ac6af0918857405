pub mod executor;
pub mod fixtures;
pub mod store;
pub mod usage;
