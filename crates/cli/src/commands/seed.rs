//! Seed the catalog with categories and products.
//!
//! The catalog is YAML: a list of categories, each with its products.
//!
//! ```yaml
//! - name: Books
//!   products:
//!     - name: The Rust Programming Language
//!       description: The book.
//!       price: "39.95"
//! ```
//!
//! Without `--file` the bundled `seed/catalog.yaml` is loaded. Seeding is not
//! idempotent; running it twice creates a second copy of every entry.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use store_api::db::postgres::PgStore;
use store_api::dto::{CategoryRequest, ProductRequest};
use store_api::services::{CategoryService, ProductService};

const BUNDLED_CATALOG: &str = include_str!("../../seed/catalog.yaml");

#[derive(Debug, Deserialize)]
struct SeedCategory {
    name: String,
    #[serde(default)]
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    description: Option<String>,
    price: Decimal,
}

fn parse_catalog(content: &str) -> Result<Vec<SeedCategory>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Load a catalog file (or the bundled sample) into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database is
/// unreachable, or an entry fails validation.
pub async fn catalog(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => BUNDLED_CATALOG.to_owned(),
    };
    let catalog = parse_catalog(&content)?;
    info!(categories = catalog.len(), "Parsed catalog");

    let pool = super::connect().await?;
    let store = PgStore::new(pool);
    let categories = CategoryService::new(&store);
    let products = ProductService::new(&store);

    let mut inserted = 0_usize;
    for entry in catalog {
        let category = categories
            .create(&CategoryRequest { name: entry.name })
            .await?;
        for product in entry.products {
            products
                .create(&ProductRequest {
                    name: product.name,
                    description: product.description,
                    price: product.price,
                    category_id: i64::from(category.id.as_u8()),
                })
                .await?;
            inserted += 1;
        }
        info!(category_id = %category.id, name = %category.name, "Seeded category");
    }

    info!("Seeding complete! Products inserted: {inserted}");
    Ok(())
}
