//! Seed data script - populates the database with a demo catalog
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - A demo product catalog across several categories
//! - One demo account (demo@example.com / password123)

use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set,
};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use storefront_api::auth::hash_password;
use storefront_api::entities::{product, user, Product, User};

#[derive(Parser, Debug)]
#[command(name = "seed-data", about = "Populate the storefront demo catalog")]
struct Args {
    /// Delete existing products and users before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://storefront.db?mode=rwc".to_string());

    let mut options = ConnectOptions::new(database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10));

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(options).await?;

    storefront_api::db::run_migrations(&db).await?;

    if args.reset {
        info!("Resetting catalog and demo accounts...");
        Product::delete_many().exec(&db).await?;
        User::delete_many().exec(&db).await?;
    }

    info!("Creating products...");
    let count = create_products(&db).await?;
    info!("  Created {} products", count);

    info!("Creating demo account...");
    create_demo_user(&db).await?;
    info!("  demo@example.com / password123");

    info!("Seed complete");
    Ok(())
}

struct SeedProduct {
    title: &'static str,
    description: &'static str,
    price: Decimal,
    image_seed: &'static str,
    category: &'static str,
    rating: Decimal,
    review_count: i32,
}

async fn create_products(db: &DatabaseConnection) -> anyhow::Result<usize> {
    let seeds = [
        SeedProduct {
            title: "Wireless Bluetooth Headphones",
            description: "Premium noise-cancelling wireless headphones with 30-hour battery life. Features deep bass, comfortable over-ear design, and built-in microphone for hands-free calls.",
            price: dec!(79.99),
            image_seed: "headphones",
            category: "Electronics",
            rating: dec!(4.5),
            review_count: 2847,
        },
        SeedProduct {
            title: "Slim Laptop Stand - Adjustable Height",
            description: "Ergonomic aluminum laptop stand with adjustable height and angle. Compatible with all laptops 10-17 inches. Improves posture and airflow for cooler performance.",
            price: dec!(34.99),
            image_seed: "laptopstand",
            category: "Electronics",
            rating: dec!(4.3),
            review_count: 1523,
        },
        SeedProduct {
            title: "Organic Green Tea - 100 Bags",
            description: "Premium organic green tea sourced from Japanese highlands. Rich in antioxidants with a smooth, refreshing taste. Individually wrapped for freshness.",
            price: dec!(12.49),
            image_seed: "greentea",
            category: "Grocery",
            rating: dec!(4.7),
            review_count: 5621,
        },
        SeedProduct {
            title: "Men's Classic Fit Cotton T-Shirt",
            description: "Ultra-soft 100% ring-spun cotton t-shirt. Pre-shrunk fabric with reinforced collar. Available in multiple colors. Perfect for everyday wear.",
            price: dec!(18.99),
            image_seed: "tshirt",
            category: "Clothing",
            rating: dec!(4.2),
            review_count: 8934,
        },
        SeedProduct {
            title: "Stainless Steel Water Bottle - 32oz",
            description: "Double-wall vacuum insulated water bottle keeps drinks cold for 24 hours or hot for 12 hours. BPA-free, leak-proof lid, and sweat-proof exterior.",
            price: dec!(24.95),
            image_seed: "waterbottle",
            category: "Sports",
            rating: dec!(4.6),
            review_count: 3412,
        },
        SeedProduct {
            title: "Portable Bluetooth Speaker",
            description: "Compact waterproof Bluetooth speaker with 360-degree sound. 12-hour playtime, built-in mic, and USB-C charging. Perfect for outdoor adventures.",
            price: dec!(49.99),
            image_seed: "speaker",
            category: "Electronics",
            rating: dec!(4.4),
            review_count: 6723,
        },
        SeedProduct {
            title: "Non-Stick Cookware Set - 10 Piece",
            description: "Professional-grade non-stick cookware set including frying pans, saucepans, and stockpot. Dishwasher safe with heat-resistant handles.",
            price: dec!(89.99),
            image_seed: "cookware",
            category: "Home & Kitchen",
            rating: dec!(4.1),
            review_count: 2156,
        },
        SeedProduct {
            title: "Yoga Mat with Carrying Strap",
            description: "Extra-thick 6mm non-slip yoga mat with alignment lines. Made from eco-friendly TPE material. Includes carrying strap for easy transport.",
            price: dec!(29.99),
            image_seed: "yogamat",
            category: "Sports",
            rating: dec!(4.5),
            review_count: 4287,
        },
        SeedProduct {
            title: "LED Desk Lamp with USB Charging Port",
            description: "Dimmable LED desk lamp with five color temperatures and built-in USB charging port. Touch controls and memory function.",
            price: dec!(39.99),
            image_seed: "desklamp",
            category: "Home & Kitchen",
            rating: dec!(4.3),
            review_count: 1876,
        },
        SeedProduct {
            title: "Ceramic Pour-Over Coffee Dripper",
            description: "Classic ceramic pour-over dripper for a clean, flavorful cup. Fits most mugs and carafes. Dishwasher safe.",
            price: dec!(21.50),
            image_seed: "coffeedripper",
            category: "Home & Kitchen",
            rating: dec!(4.8),
            review_count: 967,
        },
    ];

    let now = chrono::Utc::now();
    let count = seeds.len();

    for seed in seeds {
        let row = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(seed.title.to_string()),
            description: Set(seed.description.to_string()),
            price: Set(seed.price),
            image_url: Set(format!(
                "https://picsum.photos/seed/{}/400/400",
                seed.image_seed
            )),
            category: Set(seed.category.to_string()),
            rating: Set(seed.rating),
            review_count: Set(seed.review_count),
            in_stock: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(db).await?;
    }

    Ok(count)
}

async fn create_demo_user(db: &DatabaseConnection) -> anyhow::Result<()> {
    let password_hash =
        hash_password("password123").map_err(|e| anyhow::anyhow!("hashing failed: {}", e))?;

    let row = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Demo User".to_string()),
        email: Set("demo@example.com".to_string()),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
    };
    row.insert(db).await?;

    Ok(())
}
