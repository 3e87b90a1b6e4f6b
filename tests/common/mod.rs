use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    auth::{hash_password, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{product, user},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Helper harness spinning up application state backed by an in-memory
/// SQLite database. Each TestApp owns its own database.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_0123456789_0123456789_abcd".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg), db_arc.clone()));
        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            auth_service,
            Arc::new(cfg.clone()),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            state,
            _event_task: event_task,
        }
    }

    /// Insert a user row directly, bypassing signup.
    #[allow(dead_code)]
    pub async fn seed_user(&self, email: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let row = user::ActiveModel {
            id: Set(user_id),
            name: Set("Test User".to_string()),
            email: Set(email.to_string()),
            password_hash: Set(hash_password("password123").expect("hashing failed")),
            created_at: Set(Utc::now()),
        };
        row.insert(&*self.state.db)
            .await
            .expect("failed to seed user");
        user_id
    }

    /// Insert a catalog product with the given title, price, and category.
    #[allow(dead_code)]
    pub async fn seed_product(&self, title: &str, price: Decimal, category: &str) -> Uuid {
        let product_id = Uuid::new_v4();
        let now = Utc::now();
        let row = product::ActiveModel {
            id: Set(product_id),
            title: Set(title.to_string()),
            description: Set(format!("{} - seeded for tests", title)),
            price: Set(price),
            image_url: Set(format!("https://picsum.photos/seed/{}/400/400", product_id)),
            category: Set(category.to_string()),
            rating: Set(Decimal::ZERO),
            review_count: Set(0),
            in_stock: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(&*self.state.db)
            .await
            .expect("failed to seed product");
        product_id
    }
}
