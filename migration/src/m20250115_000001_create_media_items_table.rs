use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaItems::FileKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaItems::FileType).string().not_null())
                    .col(ColumnDef::new(MediaItems::UploadDate).timestamp().not_null())
                    .col(ColumnDef::new(MediaItems::UploadedBy).string().not_null())
                    .col(ColumnDef::new(MediaItems::PreviewKey).string().null())
                    .col(
                        ColumnDef::new(MediaItems::Pinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_items_uploaded_by")
                    .table(MediaItems::Table)
                    .col(MediaItems::UploadedBy)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MediaItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MediaItems {
    Table,
    FileKey,
    FileType,
    UploadDate,
    UploadedBy,
    PreviewKey,
    Pinned,
}
