//! Publisher/observer contract between the basket and its plugins.
//!
//! Observers register for a fixed set of [`Action`]s and are notified
//! synchronously, in registration order. The first observer error stops
//! the notification and is returned to the caller of the publisher method.

use crate::order::{OrderBaseItem, OrderProductItem};
use crate::StoreResult;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// ACTIONS
// ============================================================================

/// Basket lifecycle events observers can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    AddProductBefore,
    AddProductAfter,
    DeleteProductBefore,
    DeleteProductAfter,
    SetCustomerIdAfter,
    CheckBefore,
    CheckAfter,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddProductBefore => "addProduct.before",
            Action::AddProductAfter => "addProduct.after",
            Action::DeleteProductBefore => "deleteProduct.before",
            Action::DeleteProductAfter => "deleteProduct.after",
            Action::SetCustomerIdAfter => "setCustomerId.after",
            Action::CheckBefore => "check.before",
            Action::CheckAfter => "check.after",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addProduct.before" => Ok(Action::AddProductBefore),
            "addProduct.after" => Ok(Action::AddProductAfter),
            "deleteProduct.before" => Ok(Action::DeleteProductBefore),
            "deleteProduct.after" => Ok(Action::DeleteProductAfter),
            "setCustomerId.after" => Ok(Action::SetCustomerIdAfter),
            "check.before" => Ok(Action::CheckBefore),
            "check.after" => Ok(Action::CheckAfter),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

/// Error when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParseError(pub String);

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid action: {}", self.0)
    }
}

impl std::error::Error for ActionParseError {}

// ============================================================================
// BASKET PARTS
// ============================================================================

bitflags! {
    /// Basket parts a check covers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Parts: u8 {
        const ADDRESS = 0b0000_0001;
        const COUPON = 0b0000_0010;
        const PRODUCT = 0b0000_0100;
        const SERVICE = 0b0000_1000;
        const ALL = Self::ADDRESS.bits()
            | Self::COUPON.bits()
            | Self::PRODUCT.bits()
            | Self::SERVICE.bits();
    }
}

impl Default for Parts {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// EVENT PAYLOAD
// ============================================================================

/// Value handed to observers along with the action.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    None,
    Parts(Parts),
    Product(Box<OrderProductItem>),
    Position(usize),
    CustomerId(Option<String>),
}

impl EventValue {
    /// Parts of a check event, empty for every other payload.
    pub fn parts(&self) -> Parts {
        match self {
            EventValue::Parts(parts) => *parts,
            _ => Parts::empty(),
        }
    }
}

// ============================================================================
// CONTRACT
// ============================================================================

/// Listener notified by a [`Publisher`].
pub trait Observer: fmt::Debug + Send + Sync {
    fn update(&self, publisher: &dyn Publisher, action: Action, value: &EventValue) -> StoreResult<()>;
}

/// Object emitting lifecycle events to registered observers.
pub trait Publisher {
    fn add_listener(&mut self, observer: Arc<dyn Observer>, action: Action);

    fn remove_listeners(&mut self);

    fn notify(&self, action: Action, value: &EventValue) -> StoreResult<()>;

    /// The publisher as a basket, if it is one.
    fn as_order_base(&self) -> Option<&OrderBaseItem> {
        None
    }
}

/// Registered observers in registration order.
#[derive(Clone, Default)]
pub struct Listeners {
    entries: Vec<(Action, Arc<dyn Observer>)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Arc<dyn Observer>, action: Action) {
        self.entries.push((action, observer));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every observer registered for `action`, stopping at the first error.
    pub fn notify(&self, publisher: &dyn Publisher, action: Action, value: &EventValue) -> StoreResult<()> {
        for (_, observer) in self.entries.iter().filter(|(a, _)| *a == action) {
            tracing::trace!(action = %action, observer = ?observer, "Notifying observer");
            observer.update(publisher, action, value)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(action, _)| action.as_str()))
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in [
            Action::AddProductBefore,
            Action::AddProductAfter,
            Action::DeleteProductBefore,
            Action::DeleteProductAfter,
            Action::SetCustomerIdAfter,
            Action::CheckBefore,
            Action::CheckAfter,
        ] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("check.during".parse::<Action>().is_err());
    }

    #[test]
    fn test_parts_values() {
        assert_eq!(Parts::ADDRESS.bits(), 1);
        assert_eq!(Parts::COUPON.bits(), 2);
        assert_eq!(Parts::PRODUCT.bits(), 4);
        assert_eq!(Parts::SERVICE.bits(), 8);
        assert_eq!(Parts::ALL.bits(), 15);
        assert!(Parts::ALL.contains(Parts::PRODUCT));
    }

    #[test]
    fn test_event_value_parts() {
        assert_eq!(EventValue::Parts(Parts::PRODUCT).parts(), Parts::PRODUCT);
        assert_eq!(EventValue::Position(1).parts(), Parts::empty());
    }
}
