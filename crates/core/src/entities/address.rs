//! Postal addresses owned by a user.

use crate::types::{AddressId, UserId};

/// A user's postal address.
///
/// `user_id` is a back-reference used for lookup only. It is set and cleared
/// by [`crate::relationships::add_address`] and
/// [`crate::relationships::remove_address`]; nothing else should touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Unique address ID, `None` until persisted.
    pub id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Owning user, if attached.
    pub user_id: Option<UserId>,
}

/// Fields supplied when creating an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Build a detached, unsaved address.
    #[must_use]
    pub fn detached(input: NewAddress) -> Self {
        Self {
            id: None,
            street: input.street,
            city: input.city,
            state: input.state,
            zip: input.zip,
            user_id: None,
        }
    }

    /// Whether `other` denotes the same address.
    ///
    /// Persisted addresses compare by id. Unsaved ones compare by their
    /// postal fields, ignoring the owner so that an entry still matches after
    /// its back-reference changed.
    #[must_use]
    pub fn same_entity(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.street == other.street
                    && self.city == other.city
                    && self.state == other.state
                    && self.zip == other.zip
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rua_a() -> Address {
        Address::detached(NewAddress {
            street: "Rua A".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            zip: "01234-567".to_owned(),
        })
    }

    #[test]
    fn test_detached_has_no_owner() {
        let address = rua_a();
        assert_eq!(address.id, None);
        assert_eq!(address.user_id, None);
    }

    #[test]
    fn test_same_entity_ignores_owner_for_unsaved() {
        let a = rua_a();
        let mut b = rua_a();
        b.user_id = Some(UserId::new(1));
        assert!(a.same_entity(&b));
    }

    #[test]
    fn test_same_entity_uses_id_once_persisted() {
        let mut a = rua_a();
        let mut b = rua_a();
        a.id = Some(AddressId::new(1));
        b.id = Some(AddressId::new(2));
        assert!(!a.same_entity(&b));

        b.id = Some(AddressId::new(1));
        b.street = "Rua B".to_owned();
        assert!(a.same_entity(&b));
    }

    #[test]
    fn test_saved_and_unsaved_never_match() {
        let mut a = rua_a();
        a.id = Some(AddressId::new(1));
        assert!(!a.same_entity(&rua_a()));
    }
}
