//! SQLite store: shared connection handle and schema bootstrap.
//!
//! Solution documents live in `t_device` with their semi-structured payload
//! in the `details` JSON column; predicate pushdown happens through the
//! JSON1 `json_extract` function, so nothing about the payload shape is
//! declared to the database. All access goes through one mutex-guarded
//! connection, which also serialises concurrent imports against each other.

pub mod prices;
pub mod solutions;

use crate::error::{AppError, AppResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS t_group (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS t_device_type (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    group_id    INTEGER NOT NULL REFERENCES t_group(id),
    icon_path   TEXT,
    UNIQUE(name, group_id)
);
CREATE TABLE IF NOT EXISTS t_device (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    device_type_id  INTEGER NOT NULL,
    details         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_device_type ON t_device(device_type_id);
CREATE TABLE IF NOT EXISTS t_filter_image (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    device_type_id  INTEGER NOT NULL,
    filter_value    TEXT NOT NULL,
    image_url       TEXT NOT NULL,
    UNIQUE(device_type_id, filter_value)
);
CREATE TABLE IF NOT EXISTS t_company (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    price_level TEXT NOT NULL DEFAULT 'price_1'
);
CREATE TABLE IF NOT EXISTS t_user (
    uid         INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    company_id  INTEGER REFERENCES t_company(id)
);
CREATE TABLE IF NOT EXISTS t_price (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_code TEXT NOT NULL UNIQUE,
    unit         TEXT NOT NULL DEFAULT '',
    spec_code    TEXT NOT NULL DEFAULT '',
    price_1      REAL NOT NULL DEFAULT 0,
    price_2      REAL NOT NULL DEFAULT 0,
    price_3      REAL NOT NULL DEFAULT 0,
    price_4      REAL NOT NULL DEFAULT 0
);
";

#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::internal("database handle poisoned"))
    }
}
