//! Products and their update rules.

use crate::entities::Category;
use crate::types::{CategoryId, Price, ProductId};

/// A product offered by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// Category this product belongs to. Always resolved before a write.
    pub category_id: CategoryId,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub category_id: CategoryId,
}

/// The fields an update may replace.
///
/// Deliberately excludes `id` and `category_id`: the category is re-attached
/// by the caller after it has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
}

/// A product together with the category it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductWithCategory {
    pub product: Product,
    pub category: Category,
}

/// Copy the mutable fields of `changes` onto `product`.
pub fn apply_product_update(product: &mut Product, changes: ProductChanges) {
    product.name = changes.name;
    product.description = changes.description;
    product.price = changes.price;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_update_leaves_id_and_category_alone() {
        let mut product = Product {
            id: ProductId::new(1),
            name: "Notebook".to_owned(),
            description: Some("Notebook gamer".to_owned()),
            price: Price::new(Decimal::new(250_000, 2)).unwrap(),
            category_id: CategoryId::new(1),
        };

        apply_product_update(
            &mut product,
            ProductChanges {
                name: "Notebook Dell XPS".to_owned(),
                description: None,
                price: Price::new(Decimal::new(300_000, 2)).unwrap(),
            },
        );

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.category_id, CategoryId::new(1));
        assert_eq!(product.name, "Notebook Dell XPS");
        assert_eq!(product.description, None);
        assert_eq!(product.price.amount(), Decimal::new(300_000, 2));
    }
}
