use crate::{
    entities::{recently_viewed, Product, ProductModel, RecentlyViewed},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Rows kept per user after each track call.
const MAX_RECENT: u64 = 10;

/// Bounded per-user recency log of viewed products.
///
/// `track` upserts the view timestamp and evicts everything beyond the
/// 10 most recent rows in the same transaction. Eviction orders by
/// `viewed_at` descending and breaks timestamp ties on the
/// auto-increment id descending, so the later insertion always survives.
#[derive(Clone)]
pub struct RecentlyViewedService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl RecentlyViewedService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Records that the user viewed a product.
    #[instrument(skip(self))]
    pub async fn track(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        Product::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let existing = RecentlyViewed::find()
            .filter(recently_viewed::Column::UserId.eq(user_id))
            .filter(recently_viewed::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        match existing {
            Some(row) => {
                let mut row: recently_viewed::ActiveModel = row.into();
                row.viewed_at = Set(Utc::now());
                row.update(&txn).await?;
            }
            None => {
                let row = recently_viewed::ActiveModel {
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    viewed_at: Set(Utc::now()),
                    ..Default::default()
                };
                row.insert(&txn).await?;
            }
        }

        // Trim everything past the 10 most recent rows for this user.
        let survivors: Vec<i64> = RecentlyViewed::find()
            .filter(recently_viewed::Column::UserId.eq(user_id))
            .select_only()
            .column(recently_viewed::Column::Id)
            .order_by(recently_viewed::Column::ViewedAt, Order::Desc)
            .order_by(recently_viewed::Column::Id, Order::Desc)
            .limit(MAX_RECENT)
            .into_tuple::<i64>()
            .all(&txn)
            .await?;

        let evicted = RecentlyViewed::delete_many()
            .filter(recently_viewed::Column::UserId.eq(user_id))
            .filter(recently_viewed::Column::Id.is_not_in(survivors))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if evicted.rows_affected > 0 {
            debug!(
                "Evicted {} recently-viewed rows for user {}",
                evicted.rows_affected, user_id
            );
        }

        self.event_sender
            .send_or_log(Event::ProductViewed {
                user_id,
                product_id,
            })
            .await;

        Ok(())
    }

    /// Most-recently-viewed products, optionally excluding one product
    /// (typically the page being rendered).
    #[instrument(skip(self))]
    pub async fn get_recent(
        &self,
        user_id: Uuid,
        limit: u64,
        exclude_product_id: Option<Uuid>,
    ) -> Result<Vec<RecentlyViewedWithProduct>, ServiceError> {
        let mut query = RecentlyViewed::find()
            .filter(recently_viewed::Column::UserId.eq(user_id));

        if let Some(exclude) = exclude_product_id {
            query = query.filter(recently_viewed::Column::ProductId.ne(exclude));
        }

        let rows = query
            .find_also_related(Product)
            .order_by(recently_viewed::Column::ViewedAt, Order::Desc)
            .order_by(recently_viewed::Column::Id, Order::Desc)
            .limit(limit)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(entry, product)| {
                let product = product.ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Recently-viewed row {} references missing product",
                        entry.id
                    ))
                })?;
                Ok(RecentlyViewedWithProduct { entry, product })
            })
            .collect()
    }
}

/// A recency-log row joined with its product
#[derive(Debug, Serialize)]
pub struct RecentlyViewedWithProduct {
    pub entry: recently_viewed::Model,
    pub product: ProductModel,
}
