use sea_orm_migration::prelude::*;

use super::m20250801_000001_create_users_table::Users;
use super::m20250801_000002_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250801_000007_create_recently_viewed_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecentlyViewed::Table)
                    .if_not_exists()
                    .col(
                        // Auto-increment key doubles as the eviction
                        // tie-break when two rows share a viewed_at.
                        ColumnDef::new(RecentlyViewed::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecentlyViewed::UserId).uuid().not_null())
                    .col(ColumnDef::new(RecentlyViewed::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(RecentlyViewed::ViewedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recently_viewed_user_id")
                            .from(RecentlyViewed::Table, RecentlyViewed::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recently_viewed_product_id")
                            .from(RecentlyViewed::Table, RecentlyViewed::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recently_viewed_user_product")
                    .table(RecentlyViewed::Table)
                    .col(RecentlyViewed::UserId)
                    .col(RecentlyViewed::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recently_viewed_user_viewed_at")
                    .table(RecentlyViewed::Table)
                    .col(RecentlyViewed::UserId)
                    .col(RecentlyViewed::ViewedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecentlyViewed::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RecentlyViewed {
    Table,
    Id,
    UserId,
    ProductId,
    ViewedAt,
}
