mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use storefront_api::{
    entities::Product,
    errors::ServiceError,
    services::ProductRatingSummary,
};
use uuid::Uuid;

#[tokio::test]
async fn rating_updates_product_aggregate_synchronously() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let alice = app.seed_user("rate-alice@example.com").await;
    let bob = app.seed_user("rate-bob@example.com").await;
    let carol = app.seed_user("rate-carol@example.com").await;

    app.state
        .services
        .ratings
        .rate(alice, product_id, 4)
        .await
        .unwrap();
    app.state
        .services
        .ratings
        .rate(bob, product_id, 4)
        .await
        .unwrap();
    let result = app
        .state
        .services
        .ratings
        .rate(carol, product_id, 5)
        .await
        .unwrap();

    // 13 / 3 = 4.333... -> 4.3
    assert_eq!(result.average_rating, dec!(4.3));
    assert_eq!(result.review_count, 3);

    // The cached product columns reflect the last rate call immediately.
    let product = Product::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.rating, dec!(4.3));
    assert_eq!(product.review_count, 3);
}

#[tokio::test]
async fn rerating_updates_instead_of_duplicating() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;
    let user_id = app.seed_user("rate-again@example.com").await;

    app.state
        .services
        .ratings
        .rate(user_id, product_id, 2)
        .await
        .unwrap();
    let result = app
        .state
        .services
        .ratings
        .rate(user_id, product_id, 5)
        .await
        .unwrap();

    assert_eq!(result.review_count, 1);
    assert_eq!(result.average_rating, dec!(5.0));
    assert_eq!(
        app.state
            .services
            .ratings
            .get_user_rating(user_id, product_id)
            .await
            .unwrap(),
        Some(5)
    );
}

#[tokio::test]
async fn midpoint_mean_rounds_half_away_from_zero() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    // Mean 4.25 must surface as 4.3, not 4.2.
    for (i, value) in [4, 5, 4, 4].into_iter().enumerate() {
        let user_id = app
            .seed_user(&format!("rate-midpoint-{}@example.com", i))
            .await;
        app.state
            .services
            .ratings
            .rate(user_id, product_id, value)
            .await
            .unwrap();
    }

    let product = Product::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.rating, dec!(4.3));
    assert_eq!(product.review_count, 4);
}

#[tokio::test]
async fn out_of_range_value_is_rejected_before_mutation() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;
    let user_id = app.seed_user("rate-invalid@example.com").await;

    for value in [0, 6, -1] {
        let result = app
            .state
            .services
            .ratings
            .rate(user_id, product_id, value)
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    // No rating row was written.
    assert_eq!(
        app.state
            .services
            .ratings
            .get_user_rating(user_id, product_id)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn rating_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("rate-missing@example.com").await;

    let result = app
        .state
        .services
        .ratings
        .rate(user_id, Uuid::new_v4(), 3)
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn unrated_product_has_empty_aggregate() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let summary = app
        .state
        .services
        .ratings
        .get_product_rating(product_id)
        .await
        .unwrap();

    assert_eq!(
        summary,
        ProductRatingSummary {
            average_rating: None,
            review_count: 0,
        }
    );
}

#[tokio::test]
async fn on_demand_aggregate_matches_cached_columns() {
    let app = TestApp::new().await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    for (i, value) in [5, 3, 4, 4, 2].into_iter().enumerate() {
        let user_id = app
            .seed_user(&format!("rate-crosscheck-{}@example.com", i))
            .await;
        app.state
            .services
            .ratings
            .rate(user_id, product_id, value)
            .await
            .unwrap();
    }

    let summary = app
        .state
        .services
        .ratings
        .get_product_rating(product_id)
        .await
        .unwrap();
    let product = Product::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.average_rating, Some(product.rating));
    assert_eq!(summary.review_count, i64::from(product.review_count));
}
