//! # onelight-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `DeviceRegistry` port defined in `onelight-app::ports`
//! - Open the `SQLite` database (WAL, bounded pool) for the registry
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `onelight-app` (for port traits) and `onelight-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod device_registry;
pub mod error;
pub mod store;

pub use device_registry::SqliteDeviceRegistry;
pub use error::StorageError;
pub use store::StoreConfig;
