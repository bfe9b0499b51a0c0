//! # Settings Repository
//!
//! Key/value configuration. The checkout reads the two charge rates inside
//! its own transaction so a concurrent settings change cannot split one
//! order across two rate versions.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use atlas_core::pricing::Charges;
use atlas_core::validation::validate_setting;
use atlas_core::{Percentage, Setting, SERVICE_CHARGE_SETTING, TAX_SETTING};

use crate::error::{DbError, DbResult};
use crate::repository::product::CatalogError;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// All settings ordered by key.
    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT setting_key, setting_value, description FROM settings ORDER BY setting_key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, key).await
    }

    pub async fn get_in(conn: &mut SqliteConnection, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT setting_value FROM settings WHERE setting_key = ?1")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(value)
    }

    /// Current service charge and tax rates. Missing or unparsable values
    /// count as 0%.
    pub async fn charges_in(conn: &mut SqliteConnection) -> DbResult<Charges> {
        let service = Self::get_in(conn, SERVICE_CHARGE_SETTING).await?;
        let tax = Self::get_in(conn, TAX_SETTING).await?;

        Ok(Charges::new(
            Percentage::parse_setting(service.as_deref()),
            Percentage::parse_setting(tax.as_deref()),
        ))
    }

    /// Validates and upserts several settings atomically.
    ///
    /// Existing descriptions are kept.
    pub async fn upsert_many(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, CatalogError> {
        let validated = entries
            .iter()
            .map(|(key, value)| validate_setting(key, value))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let now = Utc::now();
        for (key, value) in &validated {
            debug!(key = %key, "Upserting setting");
            sqlx::query(
                r#"
                INSERT INTO settings (setting_key, setting_value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(setting_key) DO UPDATE SET
                    setting_value = excluded.setting_value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }
        tx.commit().await.map_err(DbError::from)?;

        Ok(self.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_default_charges_are_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let charges = SettingsRepository::charges_in(&mut conn).await.unwrap();
        assert_eq!(charges, Charges::default());
    }

    #[tokio::test]
    async fn test_upsert_and_read_charges() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db
            .settings()
            .upsert_many(&[
                (SERVICE_CHARGE_SETTING.to_string(), "5".to_string()),
                (TAX_SETTING.to_string(), "10.0".to_string()),
            ])
            .await
            .unwrap();

        let tax = settings.iter().find(|s| s.setting_key == TAX_SETTING).unwrap();
        assert_eq!(tax.setting_value, "10");
        assert!(tax.description.is_some());

        let mut conn = db.pool().acquire().await.unwrap();
        let charges = SettingsRepository::charges_in(&mut conn).await.unwrap();
        assert_eq!(charges.service_charge_rate.bps(), 500);
        assert_eq!(charges.tax_rate.bps(), 1_000);
    }

    #[tokio::test]
    async fn test_invalid_update_changes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .settings()
            .upsert_many(&[
                (SERVICE_CHARGE_SETTING.to_string(), "5".to_string()),
                (TAX_SETTING.to_string(), "ten".to_string()),
            ])
            .await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));

        assert_eq!(db.settings().get(SERVICE_CHARGE_SETTING).await.unwrap().as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_garbage_setting_value_prices_as_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("UPDATE settings SET setting_value = 'n/a' WHERE setting_key = ?1")
            .bind(TAX_SETTING)
            .execute(db.pool())
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let charges = SettingsRepository::charges_in(&mut conn).await.unwrap();
        assert!(charges.tax_rate.is_zero());
    }
}
