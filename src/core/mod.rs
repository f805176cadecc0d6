pub mod conflict;
pub mod corrections;
pub mod reports;
pub mod sessions;
