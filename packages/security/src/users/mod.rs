// ABOUTME: User management module
// ABOUTME: SQLite-backed storage for user records

pub mod storage;


pub use storage::UserStorage;
