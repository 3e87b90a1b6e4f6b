mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use std::time::Duration;
use storefront_api::errors::ServiceError;
use uuid::Uuid;

#[tokio::test]
async fn add_is_idempotent() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-add@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let first = app
        .state
        .services
        .wishlist
        .add(user_id, product_id)
        .await
        .expect("first add");
    let second = app
        .state
        .services
        .wishlist
        .add(user_id, product_id)
        .await
        .expect("second add returns the existing row");

    assert_eq!(first.item.id, second.item.id);
    assert_eq!(app.state.services.wishlist.count(user_id).await.unwrap(), 1);
}

#[tokio::test]
async fn add_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-missing@example.com").await;

    let result = app
        .state
        .services
        .wishlist
        .add(user_id, Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn get_returns_newest_first() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-order@example.com").await;
    let older = app.seed_product("Older", dec!(10.00), "Gadgets").await;
    let newer = app.seed_product("Newer", dec!(20.00), "Gadgets").await;

    app.state
        .services
        .wishlist
        .add(user_id, older)
        .await
        .unwrap();
    // Ensure distinct created_at values.
    tokio::time::sleep(Duration::from_millis(5)).await;
    app.state
        .services
        .wishlist
        .add(user_id, newer)
        .await
        .unwrap();

    let items = app.state.services.wishlist.get(user_id).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product.id, newer);
    assert_eq!(items[1].product.id, older);
}

#[tokio::test]
async fn remove_missing_entry_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-remove@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let result = app
        .state
        .services
        .wishlist
        .remove(user_id, product_id)
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));

    // After adding, removal succeeds exactly once.
    app.state
        .services
        .wishlist
        .add(user_id, product_id)
        .await
        .unwrap();
    app.state
        .services
        .wishlist
        .remove(user_id, product_id)
        .await
        .expect("remove existing entry");

    let again = app
        .state
        .services
        .wishlist
        .remove(user_id, product_id)
        .await;
    assert_matches!(again, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn toggle_is_an_involution() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-toggle@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    assert!(!app
        .state
        .services
        .wishlist
        .contains(user_id, product_id)
        .await
        .unwrap());

    let on = app
        .state
        .services
        .wishlist
        .toggle(user_id, product_id)
        .await
        .unwrap();
    assert!(on.added);
    assert!(app
        .state
        .services
        .wishlist
        .contains(user_id, product_id)
        .await
        .unwrap());

    let off = app
        .state
        .services
        .wishlist
        .toggle(user_id, product_id)
        .await
        .unwrap();
    assert!(!off.added);
    assert!(!app
        .state
        .services
        .wishlist
        .contains(user_id, product_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn count_tracks_membership_per_user() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("wish-count@example.com").await;
    let other = app.seed_user("wish-count-other@example.com").await;
    let first = app.seed_product("First", dec!(10.00), "Gadgets").await;
    let second = app.seed_product("Second", dec!(20.00), "Gadgets").await;

    app.state
        .services
        .wishlist
        .add(user_id, first)
        .await
        .unwrap();
    app.state
        .services
        .wishlist
        .add(user_id, second)
        .await
        .unwrap();
    app.state.services.wishlist.add(other, first).await.unwrap();

    assert_eq!(app.state.services.wishlist.count(user_id).await.unwrap(), 2);
    assert_eq!(app.state.services.wishlist.count(other).await.unwrap(), 1);
}
