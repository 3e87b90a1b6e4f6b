use crate::{
    entities::{product, Product, ProductModel},
    errors::ServiceError,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read-only product catalog queries: listing, filtering, keyword search,
/// and the category/price-range facets the browse UI needs.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists products with optional category/price filters and sort.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<ProductModel>, ServiceError> {
        let mut query = Product::find();

        if let Some(category) = &filter.category {
            query = query.filter(product::Column::Category.eq(category.clone()));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }

        query = match filter.sort_by.unwrap_or_default() {
            ProductSort::PriceAsc => query.order_by_asc(product::Column::Price),
            ProductSort::PriceDesc => query.order_by_desc(product::Column::Price),
            ProductSort::RatingDesc => query.order_by_desc(product::Column::Rating),
            ProductSort::Reviews => query.order_by_desc(product::Column::ReviewCount),
            ProductSort::Newest => query.order_by_desc(product::Column::CreatedAt),
        };

        Ok(query.all(&*self.db).await?)
    }

    /// Fetches a single product by id.
    pub async fn get(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Keyword search: case-insensitive substring match over title,
    /// description, and category, combined with the list filters.
    ///
    /// The catalog is demo-sized, so matching happens in memory rather
    /// than through dialect-specific full-text machinery.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        filter: ProductFilter,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        let all_products = Product::find().all(&*self.db).await?;

        let term = query.trim().to_lowercase();
        let mut matched: Vec<ProductModel> = all_products
            .into_iter()
            .filter(|p| {
                term.is_empty()
                    || p.title.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
                    || p.category.to_lowercase().contains(&term)
            })
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |category| &p.category == category)
            })
            .filter(|p| filter.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| filter.max_price.map_or(true, |max| p.price <= max))
            .collect();

        sort_products(&mut matched, filter.sort_by.unwrap_or_default());

        Ok(matched)
    }

    /// Distinct category labels across the catalog.
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(Product::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .order_by_asc(product::Column::Category)
            .into_tuple::<String>()
            .all(&*self.db)
            .await?)
    }

    /// (floor(min), ceil(max)) over catalog prices; (0, 1000) for an
    /// empty catalog so the browse UI always has a usable slider range.
    pub async fn price_range(&self) -> Result<PriceRange, ServiceError> {
        let prices: Vec<Decimal> = Product::find()
            .select_only()
            .column(product::Column::Price)
            .order_by_asc(product::Column::Price)
            .into_tuple::<Decimal>()
            .all(&*self.db)
            .await?;

        let (Some(min), Some(max)) = (prices.first(), prices.last()) else {
            return Ok(PriceRange { min: 0, max: 1000 });
        };

        Ok(PriceRange {
            min: min.floor().to_i64().unwrap_or(0),
            max: max.ceil().to_i64().unwrap_or(0),
        })
    }
}

fn sort_products(products: &mut [ProductModel], sort: ProductSort) {
    match sort {
        ProductSort::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSort::RatingDesc => products.sort_by(|a, b| b.rating.cmp(&a.rating)),
        ProductSort::Reviews => products.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
        ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Catalog list/search filter parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ProductSort>,
}

/// Sort order for catalog listings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    RatingDesc,
    Reviews,
    #[default]
    Newest,
}

/// Catalog price bounds for the browse UI
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}
