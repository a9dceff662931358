use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use sea_orm::{sea_query::OnConflict, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tokio::sync::RwLock;

use models::options;

use crate::errors::ServiceError;

/// Key-value option store over the `options` table with an in-memory
/// value cache.
///
/// Reads go through the cache; `any_key` always hits the database so a
/// caller can detect rows removed behind the cache's back.
#[derive(Clone)]
pub struct OptionStore {
    db: DatabaseConnection,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl OptionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Whether a row exists for `key`. Never consults the cache.
    pub async fn any_key(&self, key: &str) -> Result<bool, ServiceError> {
        let count = options::Entity::find_by_id(key.to_string())
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(count > 0)
    }

    /// Cached value for `key`, loading and caching from the database on miss.
    pub async fn get_by_cache_value(&self, key: &str) -> Result<Option<String>, ServiceError> {
        if let Some(value) = self.cache.read().await.get(key) {
            return Ok(Some(value.clone()));
        }
        let row = options::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        match row {
            Some(model) => {
                self.cache.write().await.insert(key.to_string(), model.value.clone());
                Ok(Some(model.value))
            }
            None => Ok(None),
        }
    }

    /// Upsert `value` under `key` and write through the cache.
    pub async fn set_by_cache_value(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let am = options::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now().into()),
        };
        options::Entity::insert(am)
            .on_conflict(
                OnConflict::column(options::Column::Key)
                    .update_columns([options::Column::Value, options::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        self.cache.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Delete the row and evict the cache entry; returns whether a row existed.
    pub async fn remove(&self, key: &str) -> Result<bool, ServiceError> {
        let res = options::Entity::delete_by_id(key.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        self.cache.write().await.remove(key);
        Ok(res.rows_affected > 0)
    }

    /// Evict the cache entry only; the database row is untouched.
    pub async fn remove_cache_value(&self, key: &str) {
        self.cache.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn option_round_trip_and_removal() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let store = OptionStore::new(db);

        assert!(!store.any_key("site-meta").await?);
        assert_eq!(store.get_by_cache_value("site-meta").await?, None);

        store.set_by_cache_value("site-meta", "{\"v\":1}").await?;
        assert!(store.any_key("site-meta").await?);
        assert_eq!(store.get_by_cache_value("site-meta").await?.as_deref(), Some("{\"v\":1}"));

        // Upsert replaces the existing value.
        store.set_by_cache_value("site-meta", "{\"v\":2}").await?;
        assert_eq!(store.get_by_cache_value("site-meta").await?.as_deref(), Some("{\"v\":2}"));

        let existed = store.remove("site-meta").await?;
        assert!(existed);
        assert!(!store.any_key("site-meta").await?);
        assert_eq!(store.get_by_cache_value("site-meta").await?, None);

        let existed = store.remove("site-meta").await?;
        assert!(!existed);
        Ok(())
    }

    #[tokio::test]
    async fn cache_eviction_reloads_from_database() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let store = OptionStore::new(db.clone());

        store.set_by_cache_value("k", "v1").await?;
        // Change the row behind the cache's back.
        let other = OptionStore::new(db);
        other.set_by_cache_value("k", "v2").await?;

        // Cached copy still serves the old value until evicted.
        assert_eq!(store.get_by_cache_value("k").await?.as_deref(), Some("v1"));
        store.remove_cache_value("k").await;
        assert_eq!(store.get_by_cache_value("k").await?.as_deref(), Some("v2"));
        Ok(())
    }
}
