use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO categories (name)
                VALUES ('Electrónica'), ('Hogar'), ('Alimentos')
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DELETE FROM categories WHERE name IN ('Electrónica', 'Hogar', 'Alimentos')",
            )
            .await?;

        Ok(())
    }
}
