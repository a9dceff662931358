use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use common::pagination::Pagination;
use models::{category, post, post_category};

use crate::errors::ServiceError;
use crate::options::OptionStore;

/// Blog-wide settings blob stored under [`BlogData::CACHE_KEY`] in the
/// option store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlogData {
    pub title: String,
    pub description: String,
    pub theme: String,
    pub items_per_page: u32,
}

impl BlogData {
    pub const CACHE_KEY: &'static str = "blog-data";
}

/// Per-category post count, shaped by the aggregation query.
#[derive(Clone, Debug, PartialEq, Serialize, FromQueryResult)]
pub struct CategoryItem {
    pub id: Uuid,
    pub category: String,
    pub description: Option<String>,
    pub post_count: i64,
}

/// One day of the trailing-week summary. `time` is the calendar-day
/// label, e.g. "2024-3-5".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlogSumInfo {
    pub time: String,
    pub posts: i64,
    pub pages: i64,
    pub views: i64,
}

/// Configuration and read-query facade for the blog.
///
/// The deserialized configuration is cached behind an explicit lock and
/// loaded on first read.
#[derive(Clone)]
pub struct BlogManager {
    db: DatabaseConnection,
    options: OptionStore,
    blog_data: Arc<RwLock<Option<BlogData>>>,
}

impl BlogManager {
    pub fn new(db: DatabaseConnection, options: OptionStore) -> Self {
        Self { db, options, blog_data: Arc::new(RwLock::new(None)) }
    }

    /// Whether the blog has been initialized. A missing key also evicts
    /// any stale cached value, so a wiped database heals the cache.
    pub async fn any_blog_data(&self) -> Result<bool, ServiceError> {
        if self.options.any_key(BlogData::CACHE_KEY).await? {
            return Ok(true);
        }
        self.options.remove_cache_value(BlogData::CACHE_KEY).await;
        *self.blog_data.write().await = None;
        Ok(false)
    }

    pub async fn set_blog_data(&self, data: &BlogData) -> Result<(), ServiceError> {
        let value = serde_json::to_string(data)?;
        info!(%value, "blog initialize");
        self.options.set_by_cache_value(BlogData::CACHE_KEY, &value).await?;
        *self.blog_data.write().await = Some(data.clone());
        Ok(())
    }

    /// Cached configuration, loaded from the option store on first read.
    /// Fails with [`ServiceError::NotInitialized`] when nothing is stored.
    pub async fn get_blog_data(&self) -> Result<BlogData, ServiceError> {
        if let Some(data) = self.blog_data.read().await.as_ref() {
            return Ok(data.clone());
        }
        let value = self
            .options
            .get_by_cache_value(BlogData::CACHE_KEY)
            .await?
            .ok_or(ServiceError::NotInitialized)?;
        let data: BlogData = serde_json::from_str(&value)?;
        *self.blog_data.write().await = Some(data.clone());
        Ok(data)
    }

    /// Posts ordered by descending creation time. Page numbers below 1
    /// are clamped to the first page.
    pub async fn get_posts(&self, opts: Pagination) -> Result<Vec<post::Model>, ServiceError> {
        let (page_idx, per_page) = opts.normalize();
        let rows = post::Entity::find()
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows)
    }

    /// Per-category post counts over the post-category associations.
    pub async fn category_items(&self) -> Result<Vec<CategoryItem>, ServiceError> {
        let rows = post_category::Entity::find()
            .join(JoinType::InnerJoin, post_category::Relation::Category.def())
            .select_only()
            .column_as(category::Column::Id, "id")
            .column_as(category::Column::Content, "category")
            .column_as(category::Column::Description, "description")
            .column_as(post_category::Column::PostId.count(), "post_count")
            .group_by(category::Column::Id)
            .group_by(category::Column::Content)
            .group_by(category::Column::Description)
            .into_model::<CategoryItem>()
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows)
    }

    /// Day-bucketed counts and view sums for publicly visible posts
    /// published in the trailing 7 days, ascending by day.
    pub async fn blog_sum_info(&self) -> Result<Vec<BlogSumInfo>, ServiceError> {
        let cutoff: sea_orm::prelude::DateTimeWithTimeZone = (Utc::now() - Duration::days(7)).into();
        let rows = post::Entity::find()
            .filter(post::Column::State.gte(post::PostState::Release))
            .filter(post::Column::PublishedAt.gte(cutoff))
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;

        let mut buckets: BTreeMap<(i32, u32, u32), BlogSumInfo> = BTreeMap::new();
        for p in rows {
            let day = p.published_at.with_timezone(&Utc);
            let key = (day.year(), day.month(), day.day());
            let entry = buckets.entry(key).or_insert_with(|| BlogSumInfo {
                // Not zero-padded: existing consumers key on "2024-3-5".
                time: format!("{}-{}-{}", key.0, key.1, key.2),
                posts: 0,
                pages: 0,
                views: 0,
            });
            match p.post_type {
                post::PostType::Post => entry.posts += 1,
                post::PostType::Page => entry.pages += 1,
            }
            entry.views += p.views as i64;
        }
        Ok(buckets.into_values().collect())
    }
}
