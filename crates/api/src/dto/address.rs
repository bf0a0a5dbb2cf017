use serde::{Deserialize, Serialize};

use store_core::{Address, AddressId, NewAddress};

use crate::services::validation::{ValidationErrors, required_text};

/// Address as returned to clients. The owner is implied by the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl From<&Address> for AddressDto {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
        }
    }
}

/// Body of `POST /users/{id}/addresses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressRequest {
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<NewAddress, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let address = NewAddress {
            street: required_text(&mut errors, "street", "Street", &self.street),
            city: required_text(&mut errors, "city", "City", &self.city),
            state: required_text(&mut errors, "state", "State", &self.state),
            zip: required_text(&mut errors, "zip", "Zip", &self.zip),
        };
        errors.finish().map(|()| address)
    }
}
