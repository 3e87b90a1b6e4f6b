mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::time::Duration;
use storefront_api::{
    entities::{recently_viewed, RecentlyViewed},
    errors::ServiceError,
};
use uuid::Uuid;

async fn rows_for(app: &TestApp, user_id: Uuid) -> u64 {
    RecentlyViewed::find()
        .filter(recently_viewed::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn eleventh_view_evicts_the_oldest() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("rv-evict@example.com").await;

    let mut products = Vec::new();
    for i in 0..11 {
        let product_id = app
            .seed_product(&format!("Product {}", i), dec!(10.00), "Gadgets")
            .await;
        products.push(product_id);
    }

    for product_id in &products {
        app.state
            .services
            .recently_viewed
            .track(user_id, *product_id)
            .await
            .unwrap();
        // Distinct view timestamps.
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    assert_eq!(rows_for(&app, user_id).await, 10);

    let recent = app
        .state
        .services
        .recently_viewed
        .get_recent(user_id, 20, None)
        .await
        .unwrap();

    // The first-viewed product is gone; the rest survive, newest first.
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].product.id, products[10]);
    assert_eq!(recent[9].product.id, products[1]);
    assert!(!recent.iter().any(|r| r.product.id == products[0]));
}

#[tokio::test]
async fn tracking_the_same_product_upserts() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("rv-upsert@example.com").await;
    let first = app.seed_product("First", dec!(10.00), "Gadgets").await;
    let second = app.seed_product("Second", dec!(20.00), "Gadgets").await;

    app.state
        .services
        .recently_viewed
        .track(user_id, first)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(3)).await;
    app.state
        .services
        .recently_viewed
        .track(user_id, second)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(3)).await;

    // Viewing the first product again bumps it to the front without
    // creating a second row.
    app.state
        .services
        .recently_viewed
        .track(user_id, first)
        .await
        .unwrap();

    assert_eq!(rows_for(&app, user_id).await, 2);

    let recent = app
        .state
        .services
        .recently_viewed
        .get_recent(user_id, 5, None)
        .await
        .unwrap();
    assert_eq!(recent[0].product.id, first);
    assert_eq!(recent[1].product.id, second);
}

#[tokio::test]
async fn get_recent_respects_limit_and_exclusion() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("rv-limit@example.com").await;

    let mut products = Vec::new();
    for i in 0..4 {
        let product_id = app
            .seed_product(&format!("Product {}", i), dec!(10.00), "Gadgets")
            .await;
        app.state
            .services
            .recently_viewed
            .track(user_id, product_id)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(3)).await;
        products.push(product_id);
    }

    let limited = app
        .state
        .services
        .recently_viewed
        .get_recent(user_id, 2, None)
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].product.id, products[3]);

    // Excluding the most recent product surfaces the next one instead.
    let excluded = app
        .state
        .services
        .recently_viewed
        .get_recent(user_id, 2, Some(products[3]))
        .await
        .unwrap();
    assert_eq!(excluded[0].product.id, products[2]);
    assert!(!excluded.iter().any(|r| r.product.id == products[3]));
}

#[tokio::test]
async fn tracking_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("rv-missing@example.com").await;

    let result = app
        .state
        .services
        .recently_viewed
        .track(user_id, Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert_eq!(rows_for(&app, user_id).await, 0);
}

#[tokio::test]
async fn trim_is_scoped_per_user() {
    let app = TestApp::new().await;
    let heavy = app.seed_user("rv-heavy@example.com").await;
    let light = app.seed_user("rv-light@example.com").await;

    let shared = app.seed_product("Shared", dec!(10.00), "Gadgets").await;
    app.state
        .services
        .recently_viewed
        .track(light, shared)
        .await
        .unwrap();

    for i in 0..12 {
        let product_id = app
            .seed_product(&format!("Heavy {}", i), dec!(10.00), "Gadgets")
            .await;
        app.state
            .services
            .recently_viewed
            .track(heavy, product_id)
            .await
            .unwrap();
    }

    assert_eq!(rows_for(&app, heavy).await, 10);
    // The other user's log is untouched by the heavy user's trims.
    assert_eq!(rows_for(&app, light).await, 1);
}
