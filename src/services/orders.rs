use crate::{
    config::AppConfig,
    entities::{
        cart, cart_item, order, order_item, Cart, CartItem, Order, OrderItem, OrderModel,
        OrderStatus, Product, ProductModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Order capture service.
///
/// Checkout snapshots the caller's live cart into an immutable order:
/// subtotal, tax, and total are recomputed server-side from the persisted
/// cart and product rows, unit prices are frozen into the order items,
/// and the cart is cleared — all inside one transaction, so an order
/// without a cleared cart (or vice versa) is never observable.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
        }
    }

    /// Captures the user's cart into a completed order and clears the cart.
    ///
    /// Payment is simulated locally; the order is created in its single
    /// terminal status. An empty or missing cart is a validation failure
    /// and leaves no order row behind.
    #[instrument(skip(self))]
    pub async fn checkout(&self, user_id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::ValidationError("Cart is empty".to_string()))?;

        let lines = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .find_also_related(Product)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&txn)
            .await?;

        if lines.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let mut subtotal = Decimal::ZERO;
        let mut captured: Vec<(i32, ProductModel)> = Vec::with_capacity(lines.len());
        for (item, product) in lines {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Cart item {} references missing product",
                    item.id
                ))
            })?;
            subtotal += product.price * Decimal::from(item.quantity);
            captured.push((item.quantity, product));
        }

        let tax_rate =
            Decimal::from_f64_retain(self.config.default_tax_rate).unwrap_or(Decimal::ZERO);
        let tax = (subtotal * tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let total = subtotal + tax;

        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user_id),
            total: Set(total),
            status: Set(OrderStatus::Completed),
            created_at: Set(Utc::now()),
        };
        let order = order.insert(&txn).await?;

        let mut items = Vec::with_capacity(captured.len());
        for (quantity, product) in captured {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                quantity: Set(quantity),
                // Freeze the current unit price into the snapshot.
                unit_price: Set(product.price),
                created_at: Set(Utc::now()),
            };
            let item = item.insert(&txn).await?;
            items.push(OrderItemWithProduct { item, product });
        }

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender.send_or_log(Event::OrderCreated(order_id)).await;

        info!(
            "Captured order {} for user {}: subtotal={}, tax={}, total={}",
            order_id, user_id, subtotal, tax, total
        );

        Ok(OrderWithItems { order, items })
    }

    /// All orders for the user, newest first, items and products joined.
    #[instrument(skip(self))]
    pub async fn get_all(&self, user_id: Uuid) -> Result<Vec<OrderWithItems>, ServiceError> {
        let orders = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = load_items(&*self.db, order.id).await?;
            result.push(OrderWithItems { order, items });
        }

        Ok(result)
    }

    /// One order scoped to the user; NotFound when absent or owned by
    /// someone else.
    #[instrument(skip(self))]
    pub async fn get_by_id(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = load_items(&*self.db, order.id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// Number of orders for the user.
    pub async fn count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .count(&*self.db)
            .await?)
    }
}

async fn load_items(
    conn: &impl ConnectionTrait,
    order_id: Uuid,
) -> Result<Vec<OrderItemWithProduct>, ServiceError> {
    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .find_also_related(Product)
        .order_by_asc(order_item::Column::CreatedAt)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(item, product)| {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Order item {} references missing product",
                    item.id
                ))
            })?;
            Ok(OrderItemWithProduct { item, product })
        })
        .collect()
}

/// An order line joined with its product
#[derive(Debug, Serialize)]
pub struct OrderItemWithProduct {
    pub item: order_item::Model,
    pub product: ProductModel,
}

/// An order with its line items
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    pub order: OrderModel,
    pub items: Vec<OrderItemWithProduct>,
}
