//! # Access Checks
//!
//! Pure capability functions. Callers run them before touching state.
//!
//! | Operation            | Allowed for                  |
//! |----------------------|------------------------------|
//! | change order status  | admin                        |
//! | view an order        | the order's owner, or admin  |
//! | adjust stock         | admin                        |

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, Principal};

/// Only privileged principals may move an order through its lifecycle.
pub fn authorize_status_change(principal: &Principal) -> CoreResult<()> {
    if principal.is_privileged() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "only administrators can update order status".to_string(),
        ))
    }
}

/// Only privileged principals may edit stock levels directly.
pub fn authorize_stock_edit(principal: &Principal) -> CoreResult<()> {
    if principal.is_privileged() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "only administrators can edit stock".to_string(),
        ))
    }
}

pub fn can_view_order(principal: &Principal, order: &Order) -> bool {
    principal.is_privileged() || principal.user_id == order.user_id
}

pub fn authorize_order_view(principal: &Principal, order: &Order) -> CoreResult<()> {
    if can_view_order(principal, order) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "not authorized to view this order".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::OrderStatus;
    use crate::types::Role;
    use chrono::Utc;

    fn order_owned_by(user_id: &str) -> Order {
        let now = Utc::now();
        Order {
            id: "o1".to_string(),
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_amount_cents: 0,
            shipping_address: "addr".to_string(),
            payment_method: "cash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_change_requires_admin() {
        assert!(authorize_status_change(&Principal::new("a", Role::Admin)).is_ok());
        assert!(matches!(
            authorize_status_change(&Principal::new("b", Role::Buyer)),
            Err(CoreError::Forbidden(_))
        ));
        assert!(authorize_status_change(&Principal::new("s", Role::Seller)).is_err());
    }

    #[test]
    fn test_order_view() {
        let order = order_owned_by("owner");
        assert!(authorize_order_view(&Principal::new("owner", Role::Buyer), &order).is_ok());
        assert!(authorize_order_view(&Principal::new("admin", Role::Admin), &order).is_ok());
        assert!(authorize_order_view(&Principal::new("stranger", Role::Buyer), &order).is_err());
    }

    #[test]
    fn test_stock_edit_requires_admin() {
        assert!(authorize_stock_edit(&Principal::new("a", Role::Admin)).is_ok());
        assert!(authorize_stock_edit(&Principal::new("s", Role::Seller)).is_err());
    }
}
