//! # Catalog Seeder
//!
//! Populates an empty catalog with the storefront's default categories and
//! products.
//!
//! ## Usage
//! ```bash
//! # Seed the default storage location
//! cargo run -p haven-store --bin seed
//!
//! # Specify a storage directory
//! cargo run -p haven-store --bin seed -- --dir ./data/storage
//! ```
//!
//! Remote settings are honored: with `HAVEN_DATABASE_URL` set (or a config
//! file carrying a `[remote]` section) the seeded catalog is written to the
//! remote store too, so every connected client starts from the same data.
//!
//! ## Seeded Catalog
//! The four launch categories with one product each:
//! - Posters (Vintage Poster Collection, ₹2499)
//! - Customized Designs (Custom Portrait Design, ₹4199)
//! - Wall Art (Modern Abstract Art, ₹3399)
//! - Digital Prints (Nature Photography Print, ₹2099)

use std::env;
use std::path::PathBuf;

use haven_store::{Store, StoreConfig};
use tracing_subscriber::EnvFilter;

/// The launch catalog: (category name, category image) with the products
/// filed under it as (name, price, image, description).
#[allow(clippy::type_complexity)]
const CATALOG: &[(&str, &str, &[(&str, f64, &str, &str)])] = &[
    (
        "Posters",
        "https://images.unsplash.com/photo-1584824486509-112e4181ff6b?w=400",
        &[(
            "Vintage Poster Collection",
            2499.0,
            "https://images.unsplash.com/photo-1584824486509-112e4181ff6b?w=400",
            "Beautiful vintage-inspired poster collection perfect for any room.",
        )],
    ),
    (
        "Customized Designs",
        "https://images.unsplash.com/photo-1561070791-2526d30994b5?w=400",
        &[(
            "Custom Portrait Design",
            4199.0,
            "https://images.unsplash.com/photo-1561070791-2526d30994b5?w=400",
            "Personalized portrait design created just for you.",
        )],
    ),
    (
        "Wall Art",
        "https://images.unsplash.com/photo-1578301978018-3005759f48f7?w=400",
        &[(
            "Modern Abstract Art",
            3399.0,
            "https://images.unsplash.com/photo-1578301978018-3005759f48f7?w=400",
            "Contemporary abstract art piece to enhance your space.",
        )],
    ),
    (
        "Digital Prints",
        "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400",
        &[(
            "Nature Photography Print",
            2099.0,
            "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400",
            "High-quality nature photography print in stunning detail.",
        )],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut storage_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    storage_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("DesignHaven Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --dir <PATH>   Storage directory (default: platform data dir)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 DesignHaven Catalog Seeder");
    println!("=============================");

    let mut config = StoreConfig::load()?;
    if let Some(dir) = storage_dir {
        config.storage.dir = Some(dir);
    }
    println!("Storage: {}", config.storage.resolve_dir()?.display());
    println!();

    let store = Store::open(config).await?;
    println!("✓ Store opened");
    if store.is_remote() {
        println!("✓ Remote store connected; seeding will sync to it");
    }

    // Check existing catalog
    let (category_count, product_count) =
        store.with_data(|d| (d.categories.len(), d.products.len()));
    if category_count > 0 || product_count > 0 {
        println!(
            "⚠ Catalog already has {} categories and {} products",
            category_count, product_count
        );
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    // Seed categories and their products
    println!();
    println!("Seeding catalog...");

    let mut products_seeded = 0;
    for (name, image, products) in CATALOG {
        let category = store.save_category(None, name, image).await?;
        println!("  + {} (id {})", category.name, category.id);

        for (product_name, price, product_image, description) in *products {
            store
                .save_product(
                    None,
                    product_name,
                    *price,
                    name,
                    product_image,
                    Some(description.to_string()),
                )
                .await?;
            products_seeded += 1;
        }
    }

    println!();
    println!(
        "✓ Seeded {} categories, {} products",
        CATALOG.len(),
        products_seeded
    );
    store.shutdown();
    Ok(())
}
