use crate::{
    entities::{wishlist_item, Product, ProductModel, WishlistItem},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Per-user saved-product set.
///
/// At most one entry per (user, product) pair: `add` is idempotent and
/// `toggle` flips membership atomically from the caller's perspective.
#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// All wishlist entries for the user, joined to products, newest first.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid) -> Result<Vec<WishlistItemWithProduct>, ServiceError> {
        let rows = WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .find_also_related(Product)
            .order_by_desc(wishlist_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(item, product)| {
                let product = product.ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Wishlist item {} references missing product",
                        item.id
                    ))
                })?;
                Ok(WishlistItemWithProduct { item, product })
            })
            .collect()
    }

    /// Adds a product to the wishlist; returns the existing entry when
    /// the product is already saved.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<WishlistItemWithProduct, ServiceError> {
        let txn = self.db.begin().await?;

        let product = Product::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let item = match find_entry(&txn, user_id, product_id).await? {
            Some(existing) => existing,
            None => {
                let item = insert_entry(&txn, user_id, product_id).await?;
                self.event_sender
                    .send_or_log(Event::WishlistItemAdded {
                        user_id,
                        product_id,
                    })
                    .await;
                item
            }
        };

        txn.commit().await?;

        Ok(WishlistItemWithProduct { item, product })
    }

    /// Removes the (user, product) entry; NotFound when it is absent.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        let result = WishlistItem::delete_many()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {} is not in the wishlist",
                product_id
            )));
        }

        self.event_sender
            .send_or_log(Event::WishlistItemRemoved {
                user_id,
                product_id,
            })
            .await;

        Ok(())
    }

    /// Flips wishlist membership and reports the resulting state.
    ///
    /// This is the primitive the heart-icon control uses: two consecutive
    /// calls always return `added=true` then `added=false`.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<WishlistToggle, ServiceError> {
        let txn = self.db.begin().await?;

        Product::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let added = match find_entry(&txn, user_id, product_id).await? {
            Some(existing) => {
                WishlistItem::delete_by_id(existing.id).exec(&txn).await?;
                false
            }
            None => {
                insert_entry(&txn, user_id, product_id).await?;
                true
            }
        };

        txn.commit().await?;

        let event = if added {
            Event::WishlistItemAdded {
                user_id,
                product_id,
            }
        } else {
            Event::WishlistItemRemoved {
                user_id,
                product_id,
            }
        };
        self.event_sender.send_or_log(event).await;

        info!(
            "Toggled wishlist product {} for user {}: added={}",
            product_id, user_id, added
        );

        Ok(WishlistToggle { added })
    }

    /// Whether the product is currently saved by the user.
    pub async fn contains(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ServiceError> {
        Ok(find_entry(&*self.db, user_id, product_id).await?.is_some())
    }

    /// Number of saved products for the user.
    pub async fn count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .count(&*self.db)
            .await?)
    }
}

async fn find_entry(
    conn: &impl ConnectionTrait,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<Option<wishlist_item::Model>, ServiceError> {
    Ok(WishlistItem::find()
        .filter(wishlist_item::Column::UserId.eq(user_id))
        .filter(wishlist_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await?)
}

async fn insert_entry(
    conn: &impl ConnectionTrait,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<wishlist_item::Model, ServiceError> {
    let item = wishlist_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(product_id),
        created_at: Set(Utc::now()),
    };
    Ok(item.insert(conn).await?)
}

/// A wishlist entry joined with its product
#[derive(Debug, Serialize)]
pub struct WishlistItemWithProduct {
    pub item: wishlist_item::Model,
    pub product: ProductModel,
}

/// Result of a wishlist toggle
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WishlistToggle {
    pub added: bool,
}
