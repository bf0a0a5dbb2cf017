use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use store_core::{CategoryId, Price, ProductChanges, ProductId, ProductWithCategory};

use super::CategoryDto;
use crate::services::validation::{ValidationErrors, optional_text, price, required_text};

/// Product as returned to clients.
///
/// `categoryId` duplicates `category.id` so clients can round-trip the value
/// into a [`ProductRequest`] without digging into the nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub category_id: CategoryId,
    pub category: CategoryDto,
}

impl From<&ProductWithCategory> for ProductDto {
    fn from(joined: &ProductWithCategory) -> Self {
        let product = &joined.product;
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category_id: product.category_id,
            category: CategoryDto::from(&joined.category),
        }
    }
}

/// Body of `POST /products` and `PUT /products/{id}`.
///
/// `categoryId` is kept wide so an out-of-range id is reported as an unknown
/// category rather than a malformed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i64,
}

impl ProductRequest {
    /// Validate the product's own fields. The category reference is checked
    /// separately against the store.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<ProductChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", "Name", &self.name);
        let description = optional_text(
            &mut errors,
            "description",
            "Description",
            self.description.as_deref(),
        );
        let price = price(&mut errors, "price", self.price);
        errors.finish()?;
        let price =
            price.ok_or_else(|| ValidationErrors::single("price", "Price must be valid."))?;

        Ok(ProductChanges {
            name,
            description,
            price,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use store_core::{Category, Product};

    use super::*;

    fn request(json: &str) -> ProductRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_product_dto_flattens_category() {
        let joined = ProductWithCategory {
            product: Product {
                id: ProductId::new(3),
                name: "Mouse Logitech".to_owned(),
                description: Some("Mouse sem fio".to_owned()),
                price: Price::new(Decimal::new(15_000, 2)).unwrap(),
                category_id: CategoryId::new(1),
            },
            category: Category::new(CategoryId::new(1), "Eletrônicos"),
        };

        let json = serde_json::to_value(ProductDto::from(&joined)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "name": "Mouse Logitech",
                "description": "Mouse sem fio",
                "price": "150.00",
                "categoryId": 1,
                "category": {"id": 1, "name": "Eletrônicos"}
            })
        );
    }

    #[test]
    fn test_request_accepts_numeric_and_string_prices() {
        let numeric = request(r#"{"name":"Mouse","price":150.00,"categoryId":1}"#);
        let text = request(r#"{"name":"Mouse","price":"150.00","categoryId":1}"#);
        assert_eq!(numeric.price, text.price);
        assert_eq!(numeric.description, None);
    }

    #[test]
    fn test_validate_reports_each_field() {
        let errors = request(r#"{"name":" ","price":-1,"categoryId":1}"#)
            .validate()
            .unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("price").is_some());
    }

    #[test]
    fn test_validate_trims_and_keeps_exact_price() {
        let changes = request(r#"{"name":" Notebook Dell ","price":"2500.00","categoryId":1}"#)
            .validate()
            .unwrap();
        assert_eq!(changes.name, "Notebook Dell");
        assert_eq!(changes.price.to_string(), "2500.00");
    }
}
