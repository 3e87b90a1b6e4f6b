mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use storefront_api::{errors::ServiceError, services::AddToCartInput};
use uuid::Uuid;

#[tokio::test]
async fn get_cart_lazily_creates_an_empty_cart() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-lazy@example.com").await;

    let cart = app
        .state
        .services
        .cart
        .get_cart(user_id)
        .await
        .expect("get_cart should never fail with no cart");

    assert_eq!(cart.cart.user_id, user_id);
    assert!(cart.items.is_empty());
    assert_eq!(cart.subtotal, Decimal::ZERO);
    assert_eq!(cart.total_items, 0);

    // A second call reuses the same cart row.
    let again = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert_eq!(again.cart.id, cart.cart.id);
}

#[tokio::test]
async fn add_merges_into_existing_line() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-merge@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

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
        .expect("first add");

    let merged = app
        .state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id,
                quantity: 3,
            },
        )
        .await
        .expect("second add");

    assert_eq!(merged.item.quantity, 5);

    // Exactly one line exists for the (cart, product) pair.
    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].item.quantity, 5);
    assert_eq!(cart.subtotal, dec!(50.00));
    assert_eq!(cart.total_items, 5);
}

#[tokio::test]
async fn subtotal_sums_over_all_lines() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-subtotal@example.com").await;
    let first = app.seed_product("First", dec!(10.50), "Gadgets").await;
    let second = app.seed_product("Second", dec!(25.75), "Gadgets").await;

    app.state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id: first,
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
                product_id: second,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();

    // (10.50 * 2) + 25.75
    assert_eq!(cart.subtotal, dec!(46.75));
    assert_eq!(cart.total_items, 3);
    // Items come back in add order.
    assert_eq!(cart.items[0].product.id, first);
    assert_eq!(cart.items[1].product.id, second);
}

#[tokio::test]
async fn add_rejects_non_positive_quantity() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-addzero@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let result = app
        .state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id,
                quantity: 0,
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    // Rejected before any store mutation: still no cart row.
    let count = app.state.services.cart.count(user_id).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn add_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-missing@example.com").await;

    let result = app
        .state
        .services
        .cart
        .add_item(
            user_id,
            AddToCartInput {
                product_id: Uuid::new_v4(),
                quantity: 1,
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn update_quantity_overwrites_the_line() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-update@example.com").await;
    let product_id = app.seed_product("Widget", dec!(25.00), "Gadgets").await;

    let line = app
        .state
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

    let updated = app
        .state
        .services
        .cart
        .update_item_quantity(user_id, line.item.id, 5)
        .await
        .expect("update quantity");

    assert_eq!(updated.item.quantity, 5);

    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert_eq!(cart.subtotal, dec!(125.00));
}

#[tokio::test]
async fn update_quantity_rejects_below_one() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-updatezero@example.com").await;
    let product_id = app.seed_product("Widget", dec!(25.00), "Gadgets").await;

    let line = app
        .state
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

    let result = app
        .state
        .services
        .cart
        .update_item_quantity(user_id, line.item.id, 0)
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    // The line is unchanged.
    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert_eq!(cart.items[0].item.quantity, 2);
}

#[tokio::test]
async fn update_quantity_unknown_line_is_not_found() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-update404@example.com").await;

    let result = app
        .state
        .services
        .cart
        .update_item_quantity(user_id, Uuid::new_v4(), 3)
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn foreign_cart_line_is_forbidden() {
    let app = TestApp::new().await;
    let owner = app.seed_user("cart-owner@example.com").await;
    let intruder = app.seed_user("cart-intruder@example.com").await;
    let product_id = app.seed_product("Widget", dec!(10.00), "Gadgets").await;

    let line = app
        .state
        .services
        .cart
        .add_item(
            owner,
            AddToCartInput {
                product_id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    let update = app
        .state
        .services
        .cart
        .update_item_quantity(intruder, line.item.id, 9)
        .await;
    assert_matches!(update, Err(ServiceError::Forbidden(_)));

    let remove = app
        .state
        .services
        .cart
        .remove_item(intruder, line.item.id)
        .await;
    assert_matches!(remove, Err(ServiceError::Forbidden(_)));

    // The owner's cart is untouched.
    let cart = app.state.services.cart.get_cart(owner).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].item.quantity, 2);
}

#[tokio::test]
async fn remove_deletes_the_line() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-remove@example.com").await;
    let product_id = app.seed_product("Widget", dec!(15.00), "Gadgets").await;

    let line = app
        .state
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

    app.state
        .services
        .cart
        .remove_item(user_id, line.item.id)
        .await
        .expect("remove");

    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.subtotal, Decimal::ZERO);

    // Removing again is NotFound.
    let again = app
        .state
        .services
        .cart
        .remove_item(user_id, line.item.id)
        .await;
    assert_matches!(again, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn clear_is_a_noop_without_a_cart() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-clear-noop@example.com").await;

    app.state
        .services
        .cart
        .clear_cart(user_id)
        .await
        .expect("clear without a cart row succeeds");

    assert_eq!(app.state.services.cart.count(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn clear_deletes_all_lines() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-clear@example.com").await;
    let first = app.seed_product("First", dec!(10.00), "Gadgets").await;
    let second = app.seed_product("Second", dec!(20.00), "Gadgets").await;

    for (product_id, quantity) in [(first, 2), (second, 1)] {
        app.state
            .services
            .cart
            .add_item(
                user_id,
                AddToCartInput {
                    product_id,
                    quantity,
                },
            )
            .await
            .unwrap();
    }

    app.state.services.cart.clear_cart(user_id).await.unwrap();

    let cart = app.state.services.cart.get_cart(user_id).await.unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(app.state.services.cart.count(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn count_does_not_create_a_cart() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("cart-count@example.com").await;

    assert_eq!(app.state.services.cart.count(user_id).await.unwrap(), 0);

    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    use storefront_api::entities::{cart, Cart};

    let carts = Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert!(carts.is_empty(), "count must not create a cart row");
}
