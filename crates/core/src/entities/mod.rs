//! In-memory domain entities.
//!
//! Entities carry their associations as plain data: owned values for
//! addresses, id collections for non-owning links. The only code that keeps
//! both sides of an association in step lives in [`crate::relationships`].

pub mod address;
pub mod category;
pub mod product;
pub mod user;

pub use address::{Address, NewAddress};
pub use category::Category;
pub use product::{NewProduct, Product, ProductChanges, ProductWithCategory, apply_product_update};
pub use user::{NewUser, User, UserChanges, apply_user_update};
