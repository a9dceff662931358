use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Options::Table)
                    .if_not_exists()
                    .col(string_len(Options::Key, 128).primary_key())
                    .col(text(Options::Value).not_null())
                    .col(timestamp_with_time_zone(Options::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Options::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Options {
    Table,
    Key,
    Value,
    UpdatedAt,
}
