//! Order reads for buyers and administrators.

use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use fulfil_core::access::authorize_order_view;
use fulfil_core::validation::validate_uuid;
use fulfil_core::{Order, OrderAggregate, Principal};
use fulfil_db::Database;

#[derive(Debug, Clone)]
pub struct OrderQueries {
    db: Database,
}

impl OrderQueries {
    pub fn new(db: Database) -> Self {
        OrderQueries { db }
    }

    /// An order with its items. Visible to its owner and to administrators.
    pub async fn get_order(&self, order_id: &str, principal: &Principal) -> ServiceResult<OrderAggregate> {
        validate_uuid(order_id, "order_id")?;

        let aggregate = self
            .db
            .orders()
            .get_aggregate(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

        if let Err(e) = authorize_order_view(principal, &aggregate.order) {
            warn!(user_id = %principal.user_id, order_id = %order_id, "Order view refused");
            return Err(e.into());
        }

        Ok(aggregate)
    }

    /// The principal's own orders, newest first.
    pub async fn list_orders(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        let orders = self.db.orders().list_for_user(&principal.user_id).await?;
        debug!(user_id = %principal.user_id, count = orders.len(), "Listed orders");
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutCoordinator;
    use crate::error::ErrorCode;
    use crate::testing::{add_product, admin, buyer, memory_db};
    use std::time::Duration;
    use uuid::Uuid;

    async fn place(db: &Database, owner: &Principal, price: &str) -> OrderAggregate {
        let p = add_product(db, price, 10).await;
        db.carts().upsert(&owner.user_id, &p.id, 1).await.unwrap();
        CheckoutCoordinator::new(db.clone(), Duration::from_secs(5))
            .checkout(&owner.user_id, "1 Main St", "card")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_owner_and_admin_can_view() {
        let db = memory_db().await;
        let owner = buyer();
        let placed = place(&db, &owner, "6.50").await;
        let queries = OrderQueries::new(db);

        let seen = queries.get_order(&placed.order.id, &owner).await.unwrap();
        assert_eq!(seen.order.id, placed.order.id);
        assert_eq!(seen.items.len(), 1);
        assert_eq!(seen.order.total_amount().to_string(), "6.50");

        assert!(queries.get_order(&placed.order.id, &admin()).await.is_ok());
    }

    #[tokio::test]
    async fn test_stranger_cannot_view() {
        let db = memory_db().await;
        let placed = place(&db, &buyer(), "1.00").await;

        let err = OrderQueries::new(db)
            .get_order(&placed.order.id, &buyer())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthorizationError);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let db = memory_db().await;
        let err = OrderQueries::new(db)
            .get_order(&Uuid::new_v4().to_string(), &admin())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_is_own_orders_newest_first() {
        let db = memory_db().await;
        let owner = buyer();
        let first = place(&db, &owner, "1.00").await;
        let second = place(&db, &owner, "2.00").await;
        place(&db, &buyer(), "3.00").await;

        let orders = OrderQueries::new(db).list_orders(&owner).await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![second.order.id.as_str(), first.order.id.as_str()]);
    }
}
