#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Utc};
use stafftime::db::initialize::init_db;
use stafftime::db::pool::DbPool;
use stafftime::models::actor::{Actor, Role};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn stt() -> Command {
    cargo_bin_cmd!("stafftime")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// existing file.
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_stafftime.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// In-memory database with the full schema applied.
pub fn mem_pool() -> DbPool {
    let pool = DbPool::open_in_memory().expect("open in-memory db");
    init_db(&pool.conn).expect("init db");
    pool
}

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 timestamp")
}

pub fn employee(id: &str) -> Actor {
    Actor::new(id, "acme", Role::Employee)
}

pub fn manager(id: &str) -> Actor {
    Actor::new(id, "acme", Role::Manager)
}

pub fn admin(id: &str) -> Actor {
    Actor::new(id, "acme", Role::Admin)
}
