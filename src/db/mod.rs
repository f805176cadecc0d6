pub mod audit;
pub mod breaks;
pub mod corrections;
pub(crate) mod db_utils;
pub mod initialize;
pub mod migrate;
pub mod pool;
pub mod sessions;
