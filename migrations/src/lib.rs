pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_users_table;
mod m20250801_000002_create_products_table;
mod m20250801_000003_create_carts_table;
mod m20250801_000004_create_cart_items_table;
mod m20250801_000005_create_wishlist_items_table;
mod m20250801_000006_create_ratings_table;
mod m20250801_000007_create_recently_viewed_table;
mod m20250801_000008_create_orders_table;
mod m20250801_000009_create_order_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users_table::Migration),
            Box::new(m20250801_000002_create_products_table::Migration),
            Box::new(m20250801_000003_create_carts_table::Migration),
            Box::new(m20250801_000004_create_cart_items_table::Migration),
            Box::new(m20250801_000005_create_wishlist_items_table::Migration),
            Box::new(m20250801_000006_create_ratings_table::Migration),
            Box::new(m20250801_000007_create_recently_viewed_table::Migration),
            Box::new(m20250801_000008_create_orders_table::Migration),
            Box::new(m20250801_000009_create_order_items_table::Migration),
        ]
    }
}
