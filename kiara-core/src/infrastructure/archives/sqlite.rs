// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite archive
//!
//! Durable `DataArchive`/`AliasArchive`/`JobArchive` backend over
//! `sqlx::SqlitePool`. Values, job records and aliases are stored as JSON
//! blobs keyed by their domain id -- this crate already has one
//! canonicalization framework for hashing (`kiara_domain::value_objects::
//! digest`); a second schema for relational columns would just be another
//! place the same invariants could drift out of sync.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use kiara_domain::{
    AliasArchive, DataArchive, Digest, JobArchive, JobId, KiaraError, JobRecord, Value, ValueId,
};

#[derive(Clone)]
pub struct SqliteArchive {
    pool: SqlitePool,
}

impl SqliteArchive {
    pub async fn connect(database_url: &str) -> Result<Self, KiaraError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(sqlx_error)?;
        let archive = Self { pool };
        archive.run_migrations().await?;
        Ok(archive)
    }

    async fn run_migrations(&self) -> Result<(), KiaraError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS values_table (
                value_id TEXT PRIMARY KEY,
                schema_hash TEXT NOT NULL,
                value_hash TEXT,
                data TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(sqlx_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS values_hash_idx ON values_table (schema_hash, value_hash)")
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS archive_metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(sqlx_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS payloads (
                value_hash TEXT PRIMARY KEY,
                bytes BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(sqlx_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS aliases (
                alias TEXT PRIMARY KEY,
                value_id TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(sqlx_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY,
                inputs_hash TEXT NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(sqlx_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS jobs_inputs_hash_idx ON jobs (inputs_hash)")
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl DataArchive for SqliteArchive {
    async fn store_value(&self, value: Value) -> Result<(), KiaraError> {
        let schema_hash = value.schema().schema_hash().to_hex();
        let value_hash = value.value_hash().map(|h| h.to_hex());
        let json = serde_json::to_string(&value)?;
        sqlx::query("INSERT OR REPLACE INTO values_table (value_id, schema_hash, value_hash, data) VALUES (?, ?, ?, ?)")
            .bind(value.value_id().to_string())
            .bind(schema_hash)
            .bind(value_hash)
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(())
    }

    async fn load_value(&self, value_id: ValueId) -> Result<Value, KiaraError> {
        let row = sqlx::query("SELECT data FROM values_table WHERE value_id = ?")
            .bind(value_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?
            .ok_or_else(|| KiaraError::ValueNotFound(value_id.to_string()))?;
        let data: String = row.try_get("data").map_err(sqlx_error)?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn has_value(&self, value_id: ValueId) -> Result<bool, KiaraError> {
        let row = sqlx::query("SELECT 1 FROM values_table WHERE value_id = ?")
            .bind(value_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(row.is_some())
    }

    async fn store_payload(&self, value_hash: Digest, bytes: Vec<u8>) -> Result<(), KiaraError> {
        sqlx::query("INSERT OR REPLACE INTO payloads (value_hash, bytes) VALUES (?, ?)")
            .bind(value_hash.to_hex())
            .bind(bytes)
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(())
    }

    async fn load_payload(&self, value_hash: Digest) -> Result<Vec<u8>, KiaraError> {
        let row = sqlx::query("SELECT bytes FROM payloads WHERE value_hash = ?")
            .bind(value_hash.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?
            .ok_or_else(|| KiaraError::ValueNotFound(format!("payload {value_hash}")))?;
        Ok(row.try_get("bytes").map_err(sqlx_error)?)
    }

    async fn has_payload(&self, value_hash: Digest) -> Result<bool, KiaraError> {
        let row = sqlx::query("SELECT 1 FROM payloads WHERE value_hash = ?")
            .bind(value_hash.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(row.is_some())
    }

    async fn list_value_ids(&self) -> Result<Vec<ValueId>, KiaraError> {
        let rows = sqlx::query("SELECT value_id FROM values_table")
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error)?;
        rows.into_iter()
            .map(|row| {
                let value_id: String = row.try_get("value_id").map_err(sqlx_error)?;
                ValueId::from_string(&value_id)
            })
            .collect()
    }

    async fn find_by_hash(&self, schema_hash: Digest, value_hash: Digest) -> Result<Option<ValueId>, KiaraError> {
        let row = sqlx::query("SELECT value_id FROM values_table WHERE schema_hash = ? AND value_hash = ? LIMIT 1")
            .bind(schema_hash.to_hex())
            .bind(value_hash.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?;
        match row {
            Some(row) => {
                let value_id: String = row.try_get("value_id").map_err(sqlx_error)?;
                Ok(Some(ValueId::from_string(&value_id)?))
            }
            None => Ok(None),
        }
    }

    async fn get_archive_metadata(&self, key: &str) -> Result<Option<String>, KiaraError> {
        let row = sqlx::query("SELECT value FROM archive_metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?;
        match row {
            Some(row) => Ok(Some(row.try_get("value").map_err(sqlx_error)?)),
            None => Ok(None),
        }
    }

    async fn set_archive_metadata(&self, key: &str, value: &str) -> Result<(), KiaraError> {
        sqlx::query("INSERT OR REPLACE INTO archive_metadata (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl AliasArchive for SqliteArchive {
    async fn set_alias(&self, alias: &str, value_id: ValueId, overwrite: bool) -> Result<(), KiaraError> {
        if !overwrite {
            let exists = sqlx::query("SELECT 1 FROM aliases WHERE alias = ?")
                .bind(alias)
                .fetch_optional(&self.pool)
                .await
                .map_err(sqlx_error)?
                .is_some();
            if exists {
                return Err(KiaraError::AliasConflict(alias.to_string()));
            }
        }
        sqlx::query("INSERT OR REPLACE INTO aliases (alias, value_id) VALUES (?, ?)")
            .bind(alias)
            .bind(value_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(())
    }

    async fn resolve_alias(&self, alias: &str) -> Result<ValueId, KiaraError> {
        let row = sqlx::query("SELECT value_id FROM aliases WHERE alias = ?")
            .bind(alias)
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?
            .ok_or_else(|| KiaraError::AliasNotFound(alias.to_string()))?;
        let value_id: String = row.try_get("value_id").map_err(sqlx_error)?;
        ValueId::from_string(&value_id)
    }

    async fn remove_alias(&self, alias: &str) -> Result<(), KiaraError> {
        let result = sqlx::query("DELETE FROM aliases WHERE alias = ?")
            .bind(alias)
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(KiaraError::AliasNotFound(alias.to_string()));
        }
        Ok(())
    }

    async fn list_aliases(&self) -> Result<Vec<String>, KiaraError> {
        let rows = sqlx::query("SELECT alias FROM aliases")
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error)?;
        rows.into_iter().map(|row| row.try_get("alias").map_err(sqlx_error)).collect()
    }

    async fn reverse_lookup(&self, value_id: ValueId) -> Result<Vec<String>, KiaraError> {
        let rows = sqlx::query("SELECT alias FROM aliases WHERE value_id = ?")
            .bind(value_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error)?;
        rows.into_iter().map(|row| row.try_get("alias").map_err(sqlx_error)).collect()
    }
}

#[async_trait]
impl JobArchive for SqliteArchive {
    async fn store_job(&self, record: JobRecord) -> Result<(), KiaraError> {
        let json = serde_json::to_string(&record)?;
        sqlx::query("INSERT OR REPLACE INTO jobs (job_id, inputs_hash, data) VALUES (?, ?, ?)")
            .bind(record.job_id().to_string())
            .bind(record.config().inputs_hash().to_hex())
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(sqlx_error)?;
        Ok(())
    }

    async fn load_job(&self, job_id: JobId) -> Result<JobRecord, KiaraError> {
        let row = sqlx::query("SELECT data FROM jobs WHERE job_id = ?")
            .bind(job_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?
            .ok_or_else(|| KiaraError::internal_error(format!("no such job: {job_id}")))?;
        let data: String = row.try_get("data").map_err(sqlx_error)?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn find_by_inputs_hash(&self, inputs_hash: Digest) -> Result<Option<JobRecord>, KiaraError> {
        let row = sqlx::query("SELECT data FROM jobs WHERE inputs_hash = ? LIMIT 1")
            .bind(inputs_hash.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error)?;
        match row {
            Some(row) => {
                let data: String = row.try_get("data").map_err(sqlx_error)?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }
}

fn sqlx_error(err: sqlx::Error) -> KiaraError {
    KiaraError::archive_error(err.to_string())
}
