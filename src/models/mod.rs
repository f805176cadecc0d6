pub mod actor;
pub mod break_entry;
pub mod correction;
pub mod session;
pub mod summary;
