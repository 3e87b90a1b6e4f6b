pub mod auth;
pub mod carts;
pub mod common;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod recently_viewed;
pub mod wishlist;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<crate::auth::AuthService>,
    pub catalog: Arc<crate::services::CatalogService>,
    pub cart: Arc<crate::services::CartService>,
    pub wishlist: Arc<crate::services::WishlistService>,
    pub ratings: Arc<crate::services::RatingService>,
    pub recently_viewed: Arc<crate::services::RecentlyViewedService>,
    pub orders: Arc<crate::services::OrderService>,
}

impl AppServices {
    /// Build the service container shared by all HTTP handlers.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<crate::auth::AuthService>,
        config: Arc<AppConfig>,
    ) -> Self {
        let catalog = Arc::new(crate::services::CatalogService::new(db_pool.clone()));
        let cart = Arc::new(crate::services::CartService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let wishlist = Arc::new(crate::services::WishlistService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let ratings = Arc::new(crate::services::RatingService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let recently_viewed = Arc::new(crate::services::RecentlyViewedService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let orders = Arc::new(crate::services::OrderService::new(
            db_pool,
            event_sender,
            config,
        ));

        Self {
            auth: auth_service,
            catalog,
            cart,
            wishlist,
            ratings,
            recently_viewed,
            orders,
        }
    }
}
