//! `ContentStorage` implementation over PostgreSQL.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_core::row::Row;
use sqlx_postgres::{PgPool, PgRow};
use tracing::instrument;

use bodybalance_core::{Account, Category, Feedback, Video};
use bodybalance_storage::{ContentStorage, Dimension, StorageError};

use crate::config::PostgresConfig;
use crate::error::storage_error;
use crate::pool;

/// PostgreSQL-backed primary store for content entities.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    media_base_url: String,
}

impl PostgresStorage {
    /// Creates a new `PostgresStorage`, establishing the connection pool.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the pool cannot be created.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;
        Ok(Self {
            pool,
            media_base_url: config.media_base_url,
        })
    }

    async fn check_content_type(&self, type_id: i64) -> Result<(), StorageError> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM content_types WHERE id = $1 AND deleted IS NOT TRUE)",
        )
        .bind(type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        if exists {
            Ok(())
        } else {
            Err(StorageError::not_found(
                Dimension::ContentType,
                format!("content type '{type_id}' not found"),
            ))
        }
    }

    async fn check_category(&self, category_id: i64) -> Result<(), StorageError> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND deleted IS NOT TRUE)",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        if exists {
            Ok(())
        } else {
            Err(StorageError::not_found(
                Dimension::Category,
                format!("category '{category_id}' not found"),
            ))
        }
    }

    fn video_from_row(&self, row: &PgRow) -> Result<Video, StorageError> {
        Ok(Video {
            id: row.try_get("id").map_err(storage_error)?,
            url: self.full_media_url(row.try_get("url").map_err(storage_error)?),
            name: row.try_get("name").map_err(storage_error)?,
            description: row.try_get("description").map_err(storage_error)?,
            category: row.try_get("category").map_err(storage_error)?,
            img_url: self.full_img_url(row.try_get("img_url").map_err(storage_error)?),
        })
    }

    fn full_media_url(&self, relative: String) -> String {
        join_media_url(&self.media_base_url, "video", &relative)
    }

    fn full_img_url(&self, relative: String) -> String {
        join_media_url(&self.media_base_url, "img", &relative)
    }
}

fn join_media_url(base: &str, segment: &str, relative: &str) -> String {
    if relative.is_empty() || base.is_empty() {
        return relative.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = relative.trim_start_matches('/');
    format!("{base}/{segment}/{path}")
}

#[async_trait]
impl ContentStorage for PostgresStorage {
    #[instrument(skip(self))]
    async fn get_account(&self, username: &str) -> Result<Account, StorageError> {
        let row = query(
            r"
            SELECT a.content_type_id, ct.name
            FROM accounts a
            JOIN content_types ct ON a.content_type_id = ct.id
            WHERE a.username = $1 AND a.deleted IS NOT TRUE
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let row = row.ok_or_else(|| {
            StorageError::not_found(
                Dimension::Account,
                format!("account '{username}' not found"),
            )
        })?;

        Ok(Account {
            username: username.to_string(),
            type_id: row.try_get("content_type_id").map_err(storage_error)?,
            type_name: row.try_get("name").map_err(storage_error)?,
        })
    }

    #[instrument(skip(self))]
    async fn get_categories(&self, type_id: i64) -> Result<Vec<Category>, StorageError> {
        self.check_content_type(type_id).await?;

        let rows = query(
            r"
            SELECT c.id, c.name, c.img_url
            FROM categories c
            JOIN category_content_types cct ON c.id = cct.category_id
            JOIN content_types ct ON cct.content_type_id = ct.id
            WHERE ct.id = $1 AND c.deleted IS NOT TRUE
            ORDER BY c.created_at DESC
            ",
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in &rows {
            categories.push(Category {
                id: row.try_get("id").map_err(storage_error)?,
                name: row.try_get("name").map_err(storage_error)?,
                img_url: self.full_img_url(row.try_get("img_url").map_err(storage_error)?),
            });
        }

        if categories.is_empty() {
            return Err(StorageError::not_found(
                Dimension::Category,
                format!("no categories found for content type '{type_id}'"),
            ));
        }

        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn get_video(&self, video_id: i64) -> Result<Video, StorageError> {
        let row = query(
            r"
            SELECT v.id, v.url, v.name, v.description, c.name AS category, v.img_url
            FROM videos v
            JOIN video_categories vc ON v.id = vc.video_id
            JOIN categories c ON vc.category_id = c.id
            WHERE v.id = $1 AND v.deleted IS NOT TRUE
            ",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let row = row.ok_or_else(|| {
            StorageError::not_found(
                Dimension::Video,
                format!("video with id '{video_id}' not found"),
            )
        })?;

        self.video_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn get_videos_by_category_and_type(
        &self,
        type_id: i64,
        category_id: i64,
    ) -> Result<Vec<Video>, StorageError> {
        self.check_content_type(type_id).await?;
        self.check_category(category_id).await?;

        let rows = query(
            r"
            SELECT v.id, v.url, v.name, v.description, c.name AS category, v.img_url
            FROM videos v
            JOIN video_categories vc ON v.id = vc.video_id
            JOIN categories c ON vc.category_id = c.id
            JOIN category_content_types cct ON c.id = cct.category_id
            JOIN content_types ct ON cct.content_type_id = ct.id
            WHERE ct.id = $1 AND c.id = $2 AND v.deleted IS NOT TRUE
            ORDER BY v.created_at DESC
            ",
        )
        .bind(type_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut videos = Vec::with_capacity(rows.len());
        for row in &rows {
            videos.push(self.video_from_row(row)?);
        }

        if videos.is_empty() {
            return Err(StorageError::not_found(
                Dimension::Video,
                format!("no videos found for content type '{type_id}' and category '{category_id}'"),
            ));
        }

        Ok(videos)
    }

    #[instrument(skip(self, feedback))]
    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), StorageError> {
        query(
            r"
            INSERT INTO feedback (username, email, telegram, message)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(&feedback.telegram)
        .bind(&feedback.message)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
