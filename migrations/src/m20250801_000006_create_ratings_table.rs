use sea_orm_migration::prelude::*;

use super::m20250801_000001_create_users_table::Users;
use super::m20250801_000002_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250801_000006_create_ratings_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Ratings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::Value).integer().not_null())
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ratings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_user_id")
                            .from(Ratings::Table, Ratings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_product_id")
                            .from(Ratings::Table, Ratings::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per user per product; rate() upserts against this.
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_product")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Aggregate recomputation scans by product.
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_product_id")
                    .table(Ratings::Table)
                    .col(Ratings::ProductId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ratings {
    Table,
    Id,
    UserId,
    ProductId,
    Value,
    CreatedAt,
    UpdatedAt,
}
