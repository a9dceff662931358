pub mod errors;
pub mod db;
pub mod options;
pub mod category;
pub mod post;
pub mod post_category;

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{DatabaseConnection, EntityTrait};
    use uuid::Uuid;

    use crate::{category, post, post_category};

    async fn setup_test_db() -> Result<DatabaseConnection, anyhow::Error> {
        let path = std::env::temp_dir().join(format!("models_test_{}.db", Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let db = sea_orm::Database::connect(url).await?;
        migration::Migrator::up(&db, None).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn post_create_and_find() -> Result<(), anyhow::Error> {
        let db = setup_test_db().await?;

        let created = post::create(&db, "Hello", "hello", post::PostState::Release, post::PostType::Post).await?;
        assert_eq!(created.views, 0);

        let found = post::Entity::find_by_id(created.id).one(&db).await?;
        let found = found.expect("post should exist");
        assert_eq!(found.slug, "hello");
        assert_eq!(found.state, post::PostState::Release);
        assert_eq!(found.post_type, post::PostType::Post);
        Ok(())
    }

    #[tokio::test]
    async fn post_create_rejects_blank_title() -> Result<(), anyhow::Error> {
        let db = setup_test_db().await?;
        let err = post::create(&db, "  ", "blank", post::PostState::Draft, post::PostType::Post).await;
        assert!(err.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn category_link_cascades_on_post_delete() -> Result<(), anyhow::Error> {
        let db = setup_test_db().await?;

        let p = post::create(&db, "Tagged", "tagged", post::PostState::Release, post::PostType::Post).await?;
        let c = category::create(&db, "rust", None).await?;
        post_category::link(&db, p.id, c.id).await?;

        post::Entity::delete_by_id(p.id).exec(&db).await?;
        let remaining = post_category::Entity::find().all(&db).await?;
        assert!(remaining.is_empty());
        Ok(())
    }

    #[test]
    fn post_state_orders_by_visibility() {
        assert!(post::PostState::Draft < post::PostState::Release);
        assert!(post::PostState::Release < post::PostState::Featured);
    }
}
