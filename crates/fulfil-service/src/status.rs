//! # Order Status Controller
//!
//! Moves an order through its lifecycle on behalf of an administrator.
//!
//! ```text
//!   pending ──► processing ──► shipped ──► delivered
//!      │            │
//!      └────────────┴──────► cancelled
//! ```
//!
//! Under [`TransitionPolicy::Permissive`] every change is accepted,
//! including out of a terminal state.
//!
//! The write is a compare-and-set on the status read in the same
//! transaction. Two admins racing on one order cannot both win: the loser
//! gets `CONFLICT` and re-reads.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use fulfil_core::access::authorize_status_change;
use fulfil_core::validation::validate_uuid;
use fulfil_core::{Order, OrderStatus, Principal, TransitionPolicy};
use fulfil_db::{Database, DbError};

#[derive(Debug, Clone)]
pub struct OrderStatusController {
    db: Database,
    policy: TransitionPolicy,
}

impl OrderStatusController {
    pub fn new(db: Database, policy: TransitionPolicy) -> Self {
        OrderStatusController { db, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Changes an order's status.
    ///
    /// Authorization is checked before anything is read, so a buyer
    /// probing for order ids learns nothing.
    ///
    /// ## Errors
    /// - `AUTHORIZATION_ERROR` principal is not an administrator
    /// - `VALIDATION_ERROR` malformed order id
    /// - `NOT_FOUND` no such order
    /// - `INVALID_TRANSITION` the policy forbids the change
    /// - `CONFLICT` another writer changed the status first
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        principal: &Principal,
    ) -> ServiceResult<Order> {
        if let Err(e) = authorize_status_change(principal) {
            warn!(user_id = %principal.user_id, order_id = %order_id, "Status change refused");
            return Err(e.into());
        }
        validate_uuid(order_id, "order_id")?;

        let mut tx = self.db.begin().await?;
        let orders = self.db.orders();

        let current = orders
            .find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

        self.policy.ensure_transition(current.status, new_status)?;

        debug!(order_id = %order_id, from = %current.status, to = %new_status, "Applying status change");

        let updated = orders
            .compare_and_set_status(&mut tx, order_id, current.status, new_status, Utc::now())
            .await?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order status changed concurrently");
                ServiceError::conflict(format!("Order {} was modified concurrently", order_id))
            })?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order_id,
            from = %current.status,
            to = %updated.status,
            by = %principal.user_id,
            "Order status changed"
        );
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutCoordinator;
    use crate::error::ErrorCode;
    use crate::testing::{add_product, admin, buyer, memory_db};
    use std::time::Duration;
    use uuid::Uuid;

    async fn placed_order(db: &Database, owner: &Principal) -> Order {
        let p = add_product(db, "4.00", 10).await;
        db.carts().upsert(&owner.user_id, &p.id, 1).await.unwrap();
        CheckoutCoordinator::new(db.clone(), Duration::from_secs(5))
            .checkout(&owner.user_id, "1 Main St", "card")
            .await
            .unwrap()
            .order
    }

    async fn stored_status(db: &Database, id: &str) -> OrderStatus {
        db.orders().get_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_buyer_cannot_change_status() {
        let db = memory_db().await;
        let owner = buyer();
        let order = placed_order(&db, &owner).await;

        let err = OrderStatusController::new(db.clone(), TransitionPolicy::Strict)
            .update_status(&order.id, OrderStatus::Shipped, &owner)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AuthorizationError);
        assert_eq!(stored_status(&db, &order.id).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_buyer_refused_before_lookup() {
        let db = memory_db().await;
        let err = OrderStatusController::new(db, TransitionPolicy::Strict)
            .update_status(&Uuid::new_v4().to_string(), OrderStatus::Shipped, &buyer())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AuthorizationError);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let db = memory_db().await;
        let order = placed_order(&db, &buyer()).await;
        let controller = OrderStatusController::new(db.clone(), TransitionPolicy::Strict);
        let staff = admin();

        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = controller
                .update_status(&order.id, next, &staff)
                .await
                .unwrap();
            assert_eq!(updated.status, next);
            assert!(updated.updated_at >= order.updated_at);
        }

        assert_eq!(stored_status(&db, &order.id).await, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_strict_rejects_skipping_ahead() {
        let db = memory_db().await;
        let order = placed_order(&db, &buyer()).await;

        let err = OrderStatusController::new(db.clone(), TransitionPolicy::Strict)
            .update_status(&order.id, OrderStatus::Shipped, &admin())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(stored_status(&db, &order.id).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_permissive_allows_skipping_ahead() {
        let db = memory_db().await;
        let order = placed_order(&db, &buyer()).await;

        let updated = OrderStatusController::new(db.clone(), TransitionPolicy::Permissive)
            .update_status(&order.id, OrderStatus::Shipped, &admin())
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_terminal_state_policy() {
        let db = memory_db().await;
        let order = placed_order(&db, &buyer()).await;
        let staff = admin();
        let strict = OrderStatusController::new(db.clone(), TransitionPolicy::Strict);

        strict
            .update_status(&order.id, OrderStatus::Cancelled, &staff)
            .await
            .unwrap();
        let err = strict
            .update_status(&order.id, OrderStatus::Processing, &staff)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let reopened = OrderStatusController::new(db.clone(), TransitionPolicy::Permissive)
            .update_status(&order.id, OrderStatus::Processing, &staff)
            .await
            .unwrap();
        assert_eq!(reopened.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let db = memory_db().await;
        let controller = OrderStatusController::new(db, TransitionPolicy::Strict);

        let err = controller
            .update_status(&Uuid::new_v4().to_string(), OrderStatus::Processing, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = controller
            .update_status("order-1", OrderStatus::Processing, &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
