use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::media_item;
use crate::error::AppError;
use crate::models::MediaRecord;

/// Outcome of the conditional preview write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewUpdate {
    /// Precondition held, preview key recorded.
    Applied,
    /// The record already carries a preview key; a concurrent or earlier run
    /// got there first.
    AlreadySet,
    /// The record was deleted before the update landed.
    RecordMissing,
}

/// One page of a full-store scan.
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub records: Vec<MediaRecord>,
    pub next_page: Option<u64>,
}

/// One page of an owner's media, newest first.
#[derive(Debug, Clone)]
pub struct OwnedPage {
    pub records: Vec<MediaRecord>,
    pub total_items: u64,
}

/// Key-value record store collaborator: one record per uploaded file, keyed
/// by file key. Production runs on sea-orm/Postgres; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Inserts a fresh record. Fails if the key is already registered.
    async fn put(&self, record: &MediaRecord) -> Result<(), AppError>;

    async fn get(&self, file_key: &str) -> Result<Option<MediaRecord>, AppError>;

    async fn list_by_owner(
        &self,
        owner: &str,
        pinned: Option<bool>,
        page: u64,
        limit: u64,
    ) -> Result<OwnedPage, AppError>;

    /// Returns false when no record with that key exists.
    async fn set_pinned(&self, file_key: &str, pinned: bool) -> Result<bool, AppError>;

    /// Conditional write: applies only while the record exists AND its
    /// preview key is still unset. Never creates a record and never
    /// overwrites an existing preview key.
    async fn set_preview_key(
        &self,
        file_key: &str,
        preview_key: &str,
    ) -> Result<PreviewUpdate, AppError>;

    async fn delete(&self, file_key: &str) -> Result<(), AppError>;

    /// Paginated scan over every record, stable key order. `page` starts at
    /// zero; `next_page` is `None` on the last page.
    async fn scan_page(&self, page: u64, page_size: u64) -> Result<ScanPage, AppError>;
}

#[derive(Clone)]
pub struct SeaOrmMetadataStore {
    db: DatabaseConnection,
}

impl SeaOrmMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SeaOrmMetadataStore {
    async fn put(&self, record: &MediaRecord) -> Result<(), AppError> {
        let item = media_item::ActiveModel {
            file_key: Set(record.file_key.clone()),
            file_type: Set(record.file_type.as_str().to_string()),
            upload_date: Set(record.upload_date),
            uploaded_by: Set(record.uploaded_by.clone()),
            preview_key: Set(record.preview.preview_key().map(str::to_string)),
            pinned: Set(record.pinned),
        };

        item.insert(&self.db).await?;
        Ok(())
    }

    async fn get(&self, file_key: &str) -> Result<Option<MediaRecord>, AppError> {
        let model = media_item::Entity::find_by_id(file_key).one(&self.db).await?;
        model.map(MediaRecord::try_from).transpose()
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        pinned: Option<bool>,
        page: u64,
        limit: u64,
    ) -> Result<OwnedPage, AppError> {
        let mut query =
            media_item::Entity::find().filter(media_item::Column::UploadedBy.eq(owner));

        if let Some(pinned) = pinned {
            query = query.filter(media_item::Column::Pinned.eq(pinned));
        }

        let paginator = query
            .order_by_desc(media_item::Column::UploadDate)
            .paginate(&self.db, limit.max(1));

        let total_items = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let records = models
            .into_iter()
            .map(MediaRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OwnedPage {
            records,
            total_items,
        })
    }

    async fn set_pinned(&self, file_key: &str, pinned: bool) -> Result<bool, AppError> {
        let result = media_item::Entity::update_many()
            .col_expr(media_item::Column::Pinned, Expr::value(pinned))
            .filter(media_item::Column::FileKey.eq(file_key))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn set_preview_key(
        &self,
        file_key: &str,
        preview_key: &str,
    ) -> Result<PreviewUpdate, AppError> {
        let result = media_item::Entity::update_many()
            .col_expr(
                media_item::Column::PreviewKey,
                Expr::value(preview_key.to_string()),
            )
            .filter(media_item::Column::FileKey.eq(file_key))
            .filter(media_item::Column::PreviewKey.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            return Ok(PreviewUpdate::Applied);
        }

        // Precondition failed: either the record vanished or someone else
        // finished the preview first.
        match self.get(file_key).await? {
            None => Ok(PreviewUpdate::RecordMissing),
            Some(_) => Ok(PreviewUpdate::AlreadySet),
        }
    }

    async fn delete(&self, file_key: &str) -> Result<(), AppError> {
        media_item::Entity::delete_by_id(file_key).exec(&self.db).await?;
        Ok(())
    }

    async fn scan_page(&self, page: u64, page_size: u64) -> Result<ScanPage, AppError> {
        let page_size = page_size.max(1);
        let paginator = media_item::Entity::find()
            .order_by_asc(media_item::Column::FileKey)
            .paginate(&self.db, page_size);

        let models = paginator.fetch_page(page).await?;
        let full_page = models.len() as u64 == page_size;

        let records = models
            .into_iter()
            .map(MediaRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScanPage {
            records,
            next_page: full_page.then(|| page + 1),
        })
    }
}
