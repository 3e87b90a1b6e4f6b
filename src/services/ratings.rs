use crate::{
    entities::{product, rating, Product, Rating, RatingModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Rating aggregation service.
///
/// The ratings table is the source of truth; `products.rating` and
/// `products.review_count` are a cache recomputed synchronously inside
/// the same transaction as every rating upsert, so a product read always
/// reflects the last successful `rate` call.
#[derive(Clone)]
pub struct RatingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl RatingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Upserts the caller's rating and recomputes the product aggregate.
    ///
    /// The value must be an integer in [1,5]; invalid input is rejected
    /// before any store mutation. Re-rating updates the existing row, so
    /// the review count stays one per user.
    #[instrument(skip(self))]
    pub async fn rate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        value: i32,
    ) -> Result<RateResult, ServiceError> {
        if !(1..=5).contains(&value) {
            return Err(ServiceError::ValidationError(
                "Rating value must be between 1 and 5".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = Product::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let existing = Rating::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        let rating = match existing {
            Some(row) => {
                let mut row: rating::ActiveModel = row.into();
                row.value = Set(value);
                row.updated_at = Set(Utc::now());
                row.update(&txn).await?
            }
            None => {
                let row = rating::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    value: Set(value),
                    created_at: Set(Utc::now()),
                    updated_at: Set(Utc::now()),
                };
                row.insert(&txn).await?
            }
        };

        let values = load_values(&txn, product_id).await?;
        let (average_rating, review_count) = aggregate(&values).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "No rating rows found for product {} after upsert",
                product_id
            ))
        })?;

        let mut product: product::ActiveModel = product.into();
        product.rating = Set(average_rating);
        product.review_count = Set(review_count as i32);
        product.updated_at = Set(Utc::now());
        product.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductRated {
                user_id,
                product_id,
            })
            .await;

        info!(
            "User {} rated product {} -> {} (avg {}, {} reviews)",
            user_id, product_id, value, average_rating, review_count
        );

        Ok(RateResult {
            rating,
            average_rating,
            review_count,
        })
    }

    /// The caller's stored rating value, if any.
    pub async fn get_user_rating(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<i32>, ServiceError> {
        let rating = Rating::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        Ok(rating.map(|r| r.value))
    }

    /// The product aggregate recomputed from the ratings table,
    /// independent of the cached product columns. Used by display
    /// cross-checks; no identity required.
    pub async fn get_product_rating(
        &self,
        product_id: Uuid,
    ) -> Result<ProductRatingSummary, ServiceError> {
        let values = load_values(&*self.db, product_id).await?;

        match aggregate(&values) {
            Some((average_rating, review_count)) => Ok(ProductRatingSummary {
                average_rating: Some(average_rating),
                review_count,
            }),
            None => Ok(ProductRatingSummary {
                average_rating: None,
                review_count: 0,
            }),
        }
    }
}

async fn load_values(
    conn: &impl ConnectionTrait,
    product_id: Uuid,
) -> Result<Vec<i32>, ServiceError> {
    Ok(Rating::find()
        .filter(rating::Column::ProductId.eq(product_id))
        .select_only()
        .column(rating::Column::Value)
        .into_tuple::<i32>()
        .all(conn)
        .await?)
}

/// Mean (rounded to one decimal place) and count over rating values.
/// Returns None for an empty slice.
pub fn aggregate(values: &[i32]) -> Option<(Decimal, i64)> {
    if values.is_empty() {
        return None;
    }

    let count = values.len() as i64;
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    let mean = Decimal::from(sum) / Decimal::from(count);

    Some((round_mean(mean), count))
}

/// Rounds a mean rating to one decimal place, half away from zero.
fn round_mean(mean: Decimal) -> Decimal {
    mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Result of a rate call: the individual rating plus the fresh aggregate
#[derive(Debug, Serialize)]
pub struct RateResult {
    pub rating: RatingModel,
    pub average_rating: Decimal,
    pub review_count: i64,
}

/// Product-level aggregate recomputed on demand
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProductRatingSummary {
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
}
