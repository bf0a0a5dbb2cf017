//! External representations of the store's entities.
//!
//! Responses never carry a password. Products flatten their category to
//! `{id, name}`. Request bodies hold raw client input; their `validate`
//! methods turn it into domain values or a field-message map.
//!
//! All JSON field names are camelCase.

mod address;
mod category;
mod product;
mod user;

pub use address::{AddressDto, AddressRequest};
pub use category::{CategoryDto, CategoryRequest};
pub use product::{ProductDto, ProductRequest};
pub use user::{ChangePasswordRequest, RegisterUserRequest, UpdateUserRequest, UserDto};
