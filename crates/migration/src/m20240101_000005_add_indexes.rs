use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Post: listing is ordered by created_at descending
        manager
            .create_index(
                Index::create()
                    .name("idx_post_created_at")
                    .table(Post::Table)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Post: weekly summary filters on state + published_at
        manager
            .create_index(
                Index::create()
                    .name("idx_post_state_published")
                    .table(Post::Table)
                    .col(Post::State)
                    .col(Post::PublishedAt)
                    .to_owned(),
            )
            .await?;

        // Post: slugs are unique
        manager
            .create_index(
                Index::create()
                    .name("uniq_post_slug")
                    .table(Post::Table)
                    .col(Post::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // PostCategory: category aggregation groups on category_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_category_category")
                    .table(PostCategory::Table)
                    .col(PostCategory::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_post_created_at").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_state_published").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_post_slug").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_category_category").table(PostCategory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Post { Table, CreatedAt, State, PublishedAt, Slug }

#[derive(DeriveIden)]
enum PostCategory { Table, CategoryId }
