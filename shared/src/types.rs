//! Core enums and identity types for the order lifecycle

use serde::{Deserialize, Serialize};

// ============================================================================
// Roles
// ============================================================================

/// Caller role, resolved by the upstream auth collaborator.
///
/// The engine trusts the role it is handed; it never authenticates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Parent/guardian placing orders for a child
    Parent,
    /// Canteen staff fulfilling orders
    Staff,
    /// Administrator (refunds, top-ups, inventory)
    Admin,
}

impl Role {
    /// Staff-level access (staff or admin)
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Parent => write!(f, "PARENT"),
            Role::Staff => write!(f, "STAFF"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PARENT" => Ok(Role::Parent),
            "STAFF" => Ok(Role::Staff),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated caller identity, as resolved by the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }
}

// ============================================================================
// Payment
// ============================================================================

/// How an order is paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash handed to staff, confirmed within the payment window
    Cash,
    /// Wallet balance, debited at checkout
    Balance,
}

/// Payment state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No payment collected (cash orders cancelled before confirmation)
    #[default]
    Unpaid,
    /// Cash order inside its payment window
    AwaitingPayment,
    /// Payment collected (balance debited, or cash confirmed)
    Paid,
    /// Payment window elapsed; order cancelled by the sweeper
    Timeout,
    /// A previously collected payment was compensated
    Refunded,
}

// ============================================================================
// Order Status
// ============================================================================

/// Fulfillment state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Cash order waiting for payment confirmation
    AwaitingPayment,
    /// Paid, queued for preparation
    Pending,
    /// Kitchen is preparing the order
    Preparing,
    /// Ready for pickup
    Ready,
    /// Handed over; terminal
    Completed,
    /// Cancelled or refunded; terminal
    Cancelled,
}

impl OrderStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the fulfillment state machine allows `self -> next`.
    ///
    /// `AwaitingPayment -> Pending` is intentionally absent: that edge is
    /// owned by cash payment confirmation, not by generic status updates.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (AwaitingPayment, Cancelled)
                | (Pending, Preparing)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Cancelled)
                | (Ready, Completed)
                | (Ready, Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::AwaitingPayment => write!(f, "AWAITING_PAYMENT"),
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
