mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use storefront_api::{
    entities::{product, OrderStatus, Product},
    errors::ServiceError,
    services::AddToCartInput,
};
use uuid::Uuid;

/// The end-to-end storefront scenario: fill a cart, check out, verify the
/// captured order, and confirm the cart is empty afterwards.
#[tokio::test]
async fn checkout_captures_cart_and_clears_it() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("checkout@example.com").await;

    let product_a = app.seed_product("Product A", dec!(10.00), "Gadgets").await;
    let product_b = app.seed_product("Product B", dec!(5.00), "Gadgets").await;

    app.state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id: product_a,
                quantity: 2,
            },
        )
        .await
        .unwrap();
    app.state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id: product_b,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert_eq!(cart.subtotal, dec!(25.00));
    assert_eq!(cart.total_items, 3);

    let order = app
        .state
        .services
        .orders
        .checkout(user_id)
        .await
        .expect("checkout");

    // 25.00 subtotal + 8% tax = 27.00, computed server-side.
    assert_eq!(order.order.total, dec!(27.00));
    assert_eq!(order.order.status, OrderStatus::Completed);
    assert_eq!(order.items.len(), 2);

    // The cart was cleared in the same transaction.
    assert_eq!(app.state.services.cart.count(user_id).await.unwrap(), 0);

    // Order history holds exactly the captured order.
    let orders = app.state.services.orders.get_all(user_id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.id, order.order.id);
    assert_eq!(app.state.services.orders.count(user_id).await.unwrap(), 1);
}

#[tokio::test]
async fn captured_prices_survive_later_product_changes() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("checkout-freeze@example.com").await;
    let product_id = app.seed_product("Volatile", dec!(10.00), "Gadgets").await;

    app.state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    let order = app.state.services.orders.checkout(user_id).await.unwrap();

    // Raise the catalog price after capture.
    let current = Product::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut current: product::ActiveModel = current.into();
    current.price = Set(dec!(99.99));
    current.update(&*app.state.db).await.unwrap();

    let reloaded = app
        .state
        .services
        .orders
        .get_by_id(user_id, order.order.id)
        .await
        .unwrap();

    assert_eq!(reloaded.items[0].item.unit_price, dec!(10.00));
    assert_eq!(reloaded.order.total, dec!(21.60)); // 20.00 + 1.60 tax
    // The joined product shows the new price; the frozen line does not.
    assert_eq!(reloaded.items[0].product.price, dec!(99.99));
}

#[tokio::test]
async fn empty_cart_cannot_be_checked_out() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("checkout-empty@example.com").await;

    // No cart row at all.
    let no_cart = app.state.services.orders.checkout(user_id).await;
    assert_matches!(no_cart, Err(ServiceError::ValidationError(_)));

    // A cart row with no lines behaves the same.
    app.state.services.cart.get_cart(user_id).await.unwrap();
    let empty_cart = app.state.services.orders.checkout(user_id).await;
    assert_matches!(empty_cart, Err(ServiceError::ValidationError(_)));

    // No order row was left behind.
    assert_eq!(app.state.services.orders.count(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn orders_are_scoped_to_their_owner() {
    let app = TestApp::new().await;
    let owner = app.seed_user("order-owner@example.com").await;
    let stranger = app.seed_user("order-stranger@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    app.state
        .services
        .cart
        .add_item(
            owner,
            AddToCartInput {
                product_id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let order = app.state.services.orders.checkout(owner).await.unwrap();

    let as_stranger = app
        .state
        .services
        .orders
        .get_by_id(stranger, order.order.id)
        .await;
    assert_matches!(as_stranger, Err(ServiceError::NotFound(_)));

    assert!(app
        .state
        .services
        .orders
        .get_all(stranger)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(app.state.services.orders.count(stranger).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_order_id_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("order-404@example.com").await;

    let result = app
        .state
        .services
        .orders
        .get_by_id(user_id, Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}
