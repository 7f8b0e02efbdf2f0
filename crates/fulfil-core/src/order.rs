//! # Order Assembly
//!
//! Turns a cart snapshot plus the stock ledger's reservations into an
//! order aggregate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       OrderFactory::build                               │
//! │                                                                         │
//! │   cart: [A × 2, B × 1]        reservations: [A @ 10.00, B @ 5.00]       │
//! │              │                              │                           │
//! │              └──────────────┬───────────────┘                           │
//! │                             ▼                                           │
//! │             pair each line with its reservation                         │
//! │                             │                                           │
//! │                             ▼                                           │
//! │       OrderItem(A, 2, 10.00)   OrderItem(B, 1, 5.00)                    │
//! │                             │                                           │
//! │                             ▼                                           │
//! │       Order { status: pending, total_amount: 25.00 }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No I/O happens here; the caller persists the aggregate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::status::OrderStatus;
use crate::types::{CartLine, Order, OrderAggregate, OrderItem, StockReservation};
use crate::validation::{validate_payment_method, validate_shipping_address};

/// Builds order aggregates. Stateless.
pub struct OrderFactory;

impl OrderFactory {
    /// Builds a pending order stamped with the current time.
    pub fn build(
        user_id: &str,
        cart: &[CartLine],
        shipping_address: &str,
        payment_method: &str,
        reservations: &[StockReservation],
    ) -> CoreResult<OrderAggregate> {
        Self::build_at(
            user_id,
            cart,
            shipping_address,
            payment_method,
            reservations,
            Utc::now(),
        )
    }

    /// Same as [`OrderFactory::build`] with an explicit timestamp.
    ///
    /// ## Errors
    /// - `EmptyCart` when `cart` has no lines
    /// - `Validation` for a blank or oversized address / payment method
    /// - `ReservationMismatch` when a line has no reservation of the same
    ///   quantity, or a reservation is left over
    /// - `AmountOverflow` when the total does not fit
    pub fn build_at(
        user_id: &str,
        cart: &[CartLine],
        shipping_address: &str,
        payment_method: &str,
        reservations: &[StockReservation],
        now: DateTime<Utc>,
    ) -> CoreResult<OrderAggregate> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_shipping_address(shipping_address)?;
        validate_payment_method(payment_method)?;

        let order_id = Uuid::new_v4().to_string();
        let mut used = vec![false; reservations.len()];
        let mut items = Vec::with_capacity(cart.len());
        let mut total = Money::zero();

        for line in cart {
            let slot = reservations
                .iter()
                .enumerate()
                .position(|(i, r)| {
                    !used[i] && r.product_id == line.product_id && r.quantity == line.quantity
                })
                .ok_or_else(|| CoreError::ReservationMismatch {
                    product_id: line.product_id.clone(),
                })?;
            used[slot] = true;
            let reservation = &reservations[slot];

            let line_total = reservation
                .unit_price
                .checked_mul_quantity(line.quantity)
                .ok_or(CoreError::AmountOverflow)?;
            total = total
                .checked_add(line_total)
                .ok_or(CoreError::AmountOverflow)?;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price_cents: reservation.unit_price.cents(),
                created_at: now,
            });
        }

        if let Some(extra) = reservations.iter().zip(&used).find(|(_, u)| !**u) {
            return Err(CoreError::ReservationMismatch {
                product_id: extra.0.product_id.clone(),
            });
        }

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_amount_cents: total.cents(),
            shipping_address: shipping_address.trim().to_string(),
            payment_method: payment_method.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        Ok(OrderAggregate { order, items })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    fn reservation(product_id: &str, quantity: i64, price_cents: i64) -> StockReservation {
        StockReservation {
            product_id: product_id.to_string(),
            quantity,
            unit_price: Money::from_cents(price_cents),
            remaining_stock: 0,
        }
    }

    #[test]
    fn test_build_two_line_order() {
        let cart = vec![line("A", 2), line("B", 1)];
        let reservations = vec![reservation("B", 1, 500), reservation("A", 2, 1000)];

        let aggregate =
            OrderFactory::build("user-1", &cart, " 1 Main St ", "card", &reservations).unwrap();

        assert_eq!(aggregate.order.status, OrderStatus::Pending);
        assert_eq!(aggregate.order.total_amount().to_string(), "25.00");
        assert_eq!(aggregate.order.shipping_address, "1 Main St");
        assert_eq!(aggregate.items.len(), 2);
        assert!(aggregate
            .items
            .iter()
            .all(|item| item.order_id == aggregate.order.id));
        assert_eq!(aggregate.items_total(), Some(aggregate.order.total_amount()));
    }

    #[test]
    fn test_total_is_exact_for_fractional_prices() {
        // 3 × 0.10 + 7 × 0.20 = 1.70, which f64 cannot represent exactly
        let cart = vec![line("A", 3), line("B", 7)];
        let reservations = vec![reservation("A", 3, 10), reservation("B", 7, 20)];

        let aggregate = OrderFactory::build("u", &cart, "addr", "cash", &reservations).unwrap();
        assert_eq!(aggregate.order.total_amount_cents, 170);
    }

    #[test]
    fn test_empty_cart() {
        let err = OrderFactory::build("u", &[], "addr", "cash", &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_reservation_mismatch() {
        let cart = vec![line("A", 2)];

        let missing = OrderFactory::build("u", &cart, "addr", "cash", &[]).unwrap_err();
        assert!(matches!(missing, CoreError::ReservationMismatch { .. }));

        let wrong_qty =
            OrderFactory::build("u", &cart, "addr", "cash", &[reservation("A", 1, 100)])
                .unwrap_err();
        assert!(matches!(wrong_qty, CoreError::ReservationMismatch { .. }));

        let extra = OrderFactory::build(
            "u",
            &cart,
            "addr",
            "cash",
            &[reservation("A", 2, 100), reservation("Z", 1, 100)],
        )
        .unwrap_err();
        assert!(matches!(extra, CoreError::ReservationMismatch { product_id } if product_id == "Z"));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let cart = vec![line("A", 2)];
        let err =
            OrderFactory::build("u", &cart, "addr", "cash", &[reservation("A", 2, i64::MAX)])
                .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_blank_shipping_address_rejected() {
        let cart = vec![line("A", 1)];
        let err = OrderFactory::build("u", &cart, "  ", "cash", &[reservation("A", 1, 100)])
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
