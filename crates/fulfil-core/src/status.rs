//! # Order Status State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Strict Transition Policy                            │
//! │                                                                         │
//! │   ┌─────────┐    ┌────────────┐    ┌─────────┐    ┌───────────┐         │
//! │   │ pending │───►│ processing │───►│ shipped │───►│ delivered │ (final) │
//! │   └────┬────┘    └─────┬──────┘    └─────────┘    └───────────┘         │
//! │        │               │                                                │
//! │        │               ▼                                                │
//! │        │         ┌───────────┐                                          │
//! │        └────────►│ cancelled │ (final)                                  │
//! │                  └───────────┘                                          │
//! │                                                                         │
//! │   Permissive: any status may be set from any status.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by checkout, awaiting fulfilment.
    #[default]
    Pending,
    Processing,
    Shipped,
    /// Terminal.
    Delivered,
    /// Terminal.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders never move again under the strict policy.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Edges of the strict state machine.
    fn strict_allows(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Transition Policy
// =============================================================================

/// Which status changes the controller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only the edges drawn in the module diagram.
    #[default]
    Strict,
    /// Any status to any status. Compatibility mode for legacy admin tooling.
    Permissive,
}

impl TransitionPolicy {
    pub fn can_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Strict => from.strict_allows(to),
            TransitionPolicy::Permissive => true,
        }
    }

    /// Returns `InvalidStatusTransition` when the move is not allowed.
    pub fn ensure_transition(&self, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
        if self.can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            _ => Err(ValidationError::NotAllowed {
                field: "status_policy".to_string(),
                allowed: vec!["strict".to_string(), "permissive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_strict_happy_path() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.can_transition(Pending, Processing));
        assert!(policy.can_transition(Processing, Shipped));
        assert!(policy.can_transition(Shipped, Delivered));
        assert!(policy.can_transition(Pending, Cancelled));
        assert!(policy.can_transition(Processing, Cancelled));
    }

    #[test]
    fn test_strict_rejects_skips_and_terminal_moves() {
        let policy = TransitionPolicy::Strict;
        assert!(!policy.can_transition(Pending, Shipped));
        assert!(!policy.can_transition(Shipped, Cancelled));
        assert!(!policy.can_transition(Delivered, Pending));
        assert!(!policy.can_transition(Cancelled, Processing));
        assert!(!policy.can_transition(Pending, Pending));

        let err = policy.ensure_transition(Pending, Shipped).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_terminal_states_have_no_strict_exits() {
        for from in [Delivered, Cancelled] {
            assert!(from.is_terminal());
            for to in OrderStatus::ALL {
                assert!(!TransitionPolicy::Strict.can_transition(from, to));
            }
        }
    }

    #[test]
    fn test_permissive_allows_everything() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(TransitionPolicy::Permissive.can_transition(from, to));
            }
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), Shipped);
        assert_eq!(" Delivered ".parse::<OrderStatus>().unwrap(), Delivered);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default(), Pending);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&Processing).unwrap(), "\"processing\"");
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, Cancelled);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            "PERMISSIVE".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Permissive
        );
        assert!("loose".parse::<TransitionPolicy>().is_err());
    }
}
