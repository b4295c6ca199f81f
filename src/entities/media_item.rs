use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{MediaRecord, MediaType, PreviewState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "media_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_key: String,
    pub file_type: String, // image, video
    pub upload_date: DateTime,
    pub uploaded_by: String,
    pub preview_key: Option<String>,
    pub pinned: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MediaRecord {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let file_type = MediaType::parse(&model.file_type).ok_or_else(|| {
            AppError::Dependency(format!(
                "record {} has unknown file_type {:?}",
                model.file_key, model.file_type
            ))
        })?;

        Ok(MediaRecord {
            file_key: model.file_key,
            file_type,
            upload_date: model.upload_date,
            uploaded_by: model.uploaded_by,
            preview: PreviewState::from_key(model.preview_key),
            pinned: model.pinned,
        })
    }
}
