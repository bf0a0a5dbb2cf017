//! Association bookkeeping between entities.
//!
//! Every function here touches exactly the two objects it is given and
//! nothing else. Callers must not assign `Address::user_id`,
//! `Product::category_id` or the collections directly; doing so lets the two
//! sides drift apart.
//!
//! | Association | Owning side | Back-reference |
//! |---|---|---|
//! | User → Address | `User::addresses` (owned) | `Address::user_id` |
//! | User → Product (favourites) | `User::favorite_products` | none |
//! | Category → Product | `Category::products` (non-owning) | `Product::category_id` |

use crate::entities::{Address, Category, Product, User};
use crate::types::ProductId;

/// Attach `address` to `user`.
///
/// Sets the address's owner and appends it to the user's collection. There is
/// no uniqueness check: attaching the same address twice yields two entries.
pub fn add_address(user: &mut User, address: &mut Address) {
    address.user_id = Some(user.id);
    user.addresses.push(address.clone());
}

/// Detach `address` from `user`.
///
/// Removes the first matching entry and clears the address's owner. If the
/// address is not in the collection nothing changes, including its owner.
/// Returns whether an entry was removed.
pub fn remove_address(user: &mut User, address: &mut Address) -> bool {
    let Some(position) = user
        .addresses
        .iter()
        .position(|candidate| candidate.same_entity(address))
    else {
        return false;
    };

    user.addresses.remove(position);
    address.user_id = None;
    true
}

/// Mark `product` as one of the user's favourites.
///
/// One-directional: the product is not modified. Returns `false` if it was
/// already a favourite.
pub fn add_favorite_product(user: &mut User, product: &Product) -> bool {
    user.favorite_products.insert(product.id)
}

/// Remove a product from the user's favourites. Returns whether it was there.
pub fn remove_favorite_product(user: &mut User, product_id: ProductId) -> bool {
    user.favorite_products.remove(&product_id)
}

/// Put `product` in `category`.
///
/// Points the product at the category and records it in the category's
/// collection once.
pub fn assign_category(category: &mut Category, product: &mut Product) {
    product.category_id = category.id;
    if !category.contains(product.id) {
        category.products.push(product.id);
    }
}

/// Drop a product from a category's collection.
///
/// The product keeps its `category_id`: a product always references exactly
/// one category, so the caller is expected to [`assign_category`] it elsewhere.
pub fn detach_product(category: &mut Category, product_id: ProductId) -> bool {
    let before = category.products.len();
    category.products.retain(|id| *id != product_id);
    category.products.len() != before
}
