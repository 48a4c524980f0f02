//! `SQLite` implementation of [`DeviceRegistry`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use onelight_app::ports::DeviceRegistry;
use onelight_domain::device::{Device, NewDevice, PowerStatus};
use onelight_domain::error::OneLightError;
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::time::{self, Timestamp};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: Option<String> = row.try_get("status")?;
        let last_seen: Option<String> = row.try_get("last_seen")?;

        let status = status
            .map(|s| s.parse::<PowerStatus>())
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_seen = last_seen
            .map(|s| time::parse(&s))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Device {
            id: DeviceId::from_raw(row.try_get("id")?),
            name: row.try_get("name")?,
            model: row.try_get("model")?,
            owner_id: OwnerId::from_raw(row.try_get("owner_id")?),
            address: row.try_get("address")?,
            hardware_id: row.try_get("hardware_id")?,
            status,
            last_seen,
            provisioned: row.try_get("provisioned")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO devices (name, model, owner_id, address, hardware_id, provisioned) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_BY_ADDRESS: &str = "SELECT * FROM devices WHERE address = ? ORDER BY id LIMIT 1";
const SELECT_BY_HARDWARE_ID: &str =
    "SELECT * FROM devices WHERE hardware_id = ? COLLATE NOCASE ORDER BY id LIMIT 1";
const SELECT_BY_OWNER: &str = "SELECT * FROM devices WHERE owner_id = ? ORDER BY id";
const UPDATE_STATUS: &str = "UPDATE devices SET status = ?, last_seen = ? WHERE id = ?";

/// `SQLite`-backed device registry.
pub struct SqliteDeviceRegistry {
    pool: SqlitePool,
}

impl SqliteDeviceRegistry {
    /// Create a new registry using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl DeviceRegistry for SqliteDeviceRegistry {
    fn find_by_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        let pool = self.pool.clone();
        let address = address.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ADDRESS)
                .bind(address)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_hardware_id(
        &self,
        hardware_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        let pool = self.pool.clone();
        let hardware_id = hardware_id.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_HARDWARE_ID)
                .bind(hardware_id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_raw())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn insert(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceId, OneLightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&device.name)
                .bind(&device.model)
                .bind(device.owner_id.as_raw())
                .bind(&device.address)
                .bind(&device.hardware_id)
                .bind(device.provisioned)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(DeviceId::from_raw(result.last_insert_rowid()))
        }
    }

    fn update_status(
        &self,
        id: DeviceId,
        status: PowerStatus,
        last_seen: Timestamp,
    ) -> impl Future<Output = Result<bool, OneLightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE_STATUS)
                .bind(status.as_str())
                .bind(last_seen.to_rfc3339())
                .bind(id.as_raw())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }

    fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<Vec<Device>, OneLightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
                .bind(owner_id.as_raw())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
