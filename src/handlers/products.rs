use crate::handlers::common::{map_service_error, success_response};
use crate::{
    errors::ApiError,
    services::{ProductFilter, ProductSort},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Creates the router for catalog endpoints (all public)
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/categories", get(list_categories))
        .route("/price-range", get(price_range))
        .route("/{id}", get(get_product))
}

/// List products with optional filters and sort
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list(params.into_filter())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Fetch one product by id
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Keyword search across title, description, and category
async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .search(&params.query, params.filter())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Distinct category labels
async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .categories()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Catalog price bounds
async fn price_range(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let range = state
        .services
        .catalog
        .price_range()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(range))
}

// Query DTOs

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ProductSort>,
}

impl ListProductsQuery {
    fn into_filter(self) -> ProductFilter {
        ProductFilter {
            category: self.category,
            min_price: self.min_price,
            max_price: self.max_price,
            sort_by: self.sort_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchProductsQuery {
    #[serde(rename = "q")]
    pub query: String,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ProductSort>,
}

impl SearchProductsQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            sort_by: self.sort_by,
        }
    }
}
