use crate::{
    entities::{cart, cart_item, Cart, CartItem, CartModel, Product, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Shopping cart service.
///
/// Owns the per-user cart and its line items: lazy cart creation,
/// merge-on-add, quantity updates, removal, clearing, and the derived
/// subtotal/count values. Every mutation runs in a single transaction and
/// id-addressed operations verify that the line belongs to the caller.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Returns the user's cart with items joined to their products,
    /// ordered by add-time, plus the derived subtotal and item count.
    ///
    /// Creates an empty cart row if the user has none yet, so this call
    /// never fails with "no cart".
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = self.find_or_create_cart(&txn, user_id).await?;
        let items = load_items(&txn, cart.id).await?;

        txn.commit().await?;

        Ok(CartWithItems::assemble(cart, items))
    }

    /// Adds a product to the user's cart, merging into an existing line.
    ///
    /// If a line for that product already exists its quantity is
    /// incremented by the requested amount; a duplicate row is never
    /// created. Returns the resulting line joined with its product.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<CartItemWithProduct, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = Product::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let cart = self.find_or_create_cart(&txn, user_id).await?;

        let existing_item = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .one(&txn)
            .await?;

        let item = if let Some(item) = existing_item {
            // Merge into the existing line.
            let current_quantity = item.quantity;
            let mut item: cart_item::ActiveModel = item.into();
            item.quantity = Set(current_quantity + input.quantity);
            item.updated_at = Set(Utc::now());
            item.update(&txn).await?
        } else {
            let item = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(input.product_id),
                quantity: Set(input.quantity),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            item.insert(&txn).await?
        };

        touch_cart(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id: item.cart_id,
                product_id: input.product_id,
            })
            .await;

        info!(
            "Added product {} x{} to cart of user {}",
            input.product_id, input.quantity, user_id
        );

        Ok(CartItemWithProduct { item, product })
    }

    /// Overwrites a line's quantity.
    ///
    /// Quantities below 1 are rejected; callers route a "would drop below
    /// 1" case to [`CartService::remove_item`] instead. Last write wins
    /// when two updates race on the same line.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemWithProduct, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let item = self.owned_item(&txn, user_id, item_id).await?;
        let cart_id = item.cart_id;

        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity);
        item.updated_at = Set(Utc::now());
        let item = item.update(&txn).await?;

        let product = Product::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Cart item {} references missing product",
                    item.id
                ))
            })?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated { cart_id, item_id })
            .await;

        Ok(CartItemWithProduct { item, product })
    }

    /// Deletes a line item from the caller's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let item = self.owned_item(&txn, user_id, item_id).await?;
        let cart_id = item.cart_id;

        CartItem::delete_by_id(item_id).exec(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved { cart_id, item_id })
            .await;

        info!("Removed cart item {} for user {}", item_id, user_id);
        Ok(())
    }

    /// Deletes all line items under the user's cart.
    ///
    /// Succeeds as a no-op when the user has no cart row yet.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let Some(cart) = cart else {
            return Ok(());
        };

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;

        let cart_id = cart.id;
        touch_cart(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::CartCleared(cart_id)).await;

        info!("Cleared cart for user {}", user_id);
        Ok(())
    }

    /// Sum of quantities across the user's cart, 0 when no cart exists.
    ///
    /// A read-only shortcut: unlike [`CartService::get_cart`] this never
    /// creates the cart row.
    pub async fn count(&self, user_id: Uuid) -> Result<i64, ServiceError> {
        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?;

        let Some(cart) = cart else {
            return Ok(0);
        };

        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(&*self.db)
            .await?;

        Ok(items.iter().map(|item| i64::from(item.quantity)).sum())
    }

    /// Finds the user's cart, creating an empty one when missing.
    async fn find_or_create_cart(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> Result<CartModel, ServiceError> {
        let existing = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(conn)
            .await?;

        if let Some(cart) = existing {
            return Ok(cart);
        }

        let cart_id = Uuid::new_v4();
        let cart = cart::ActiveModel {
            id: Set(cart_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let cart = cart.insert(conn).await?;

        self.event_sender.send_or_log(Event::CartCreated(cart_id)).await;

        info!("Created cart {} for user {}", cart_id, user_id);
        Ok(cart)
    }

    /// Loads a line item and verifies it belongs to the caller's cart.
    async fn owned_item(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<cart_item::Model, ServiceError> {
        let item = CartItem::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;

        let cart = Cart::find_by_id(item.cart_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("Cart item {} references missing cart", item_id))
            })?;

        if cart.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "Cart item does not belong to the current user".to_string(),
            ));
        }

        Ok(item)
    }
}

async fn load_items(
    conn: &impl ConnectionTrait,
    cart_id: Uuid,
) -> Result<Vec<CartItemWithProduct>, ServiceError> {
    let rows = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(Product)
        .order_by_asc(cart_item::Column::CreatedAt)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(item, product)| {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Cart item {} references missing product",
                    item.id
                ))
            })?;
            Ok(CartItemWithProduct { item, product })
        })
        .collect()
}

async fn touch_cart(conn: &impl ConnectionTrait, cart: CartModel) -> Result<(), ServiceError> {
    let mut cart: cart::ActiveModel = cart.into();
    cart.updated_at = Set(Utc::now());
    cart.update(conn).await?;
    Ok(())
}

/// Input for adding a product to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart line joined with its product
#[derive(Debug, Serialize)]
pub struct CartItemWithProduct {
    pub item: cart_item::Model,
    pub product: ProductModel,
}

/// Cart with items and derived totals
#[derive(Debug, Serialize)]
pub struct CartWithItems {
    pub cart: CartModel,
    pub items: Vec<CartItemWithProduct>,
    pub subtotal: Decimal,
    pub total_items: i64,
}

impl CartWithItems {
    fn assemble(cart: CartModel, items: Vec<CartItemWithProduct>) -> Self {
        let subtotal = items
            .iter()
            .map(|line| line.product.price * Decimal::from(line.item.quantity))
            .sum();
        let total_items = items
            .iter()
            .map(|line| i64::from(line.item.quantity))
            .sum();

        Self {
            cart,
            items,
            subtotal,
            total_items,
        }
    }
}
