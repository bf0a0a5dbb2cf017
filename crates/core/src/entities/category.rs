//! Product categories.

use crate::types::{CategoryId, ProductId};

/// A named group of products.
///
/// The category does not own its products; `products` only records which
/// ones are grouped under it and is maintained through
/// [`crate::relationships::assign_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub products: Vec<ProductId>,
}

impl Category {
    /// Create a category with no products.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            products: Vec::new(),
        }
    }

    /// Whether the product is grouped under this category.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.products.contains(&product_id)
    }
}
