//! Turning a cart into a placed order.
//!
//! Settlement decrements stock for every line, one call at a time and in cart
//! order, and clears the cart only once every decrement has succeeded. The
//! calls are not atomic: a failure part-way leaves earlier decrements applied.
//! The [`SettlementLedger`] remembers how much of each line the stock
//! collaborator has already accepted so that a retry only asks for the rest.

use std::collections::HashMap;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use super::cart::{Cart, LineItem, ProductKey};
use super::errors::SettlementError;
use super::ports::StockDecrementer;

/// Progress of one cart line through settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSettlement {
    Pending,
    /// The collaborator has taken `quantity` units out of stock.
    Decremented { quantity: i32 },
    /// The order containing this line has been placed.
    Confirmed,
}

#[derive(Debug, Default)]
pub struct SettlementLedger {
    order_id: Option<Uuid>,
    lines: HashMap<ProductKey, LineSettlement>,
}

impl SettlementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, key: &ProductKey) -> LineSettlement {
        self.lines
            .get(key)
            .copied()
            .unwrap_or(LineSettlement::Pending)
    }

    /// Order id of the attempt in progress, or of the last placed order.
    pub fn order_id(&self) -> Option<Uuid> {
        self.order_id
    }

    pub fn is_in_progress(&self) -> bool {
        self.lines
            .values()
            .any(|state| matches!(state, LineSettlement::Decremented { .. }))
    }

    pub fn reset(&mut self) {
        self.order_id = None;
        self.lines.clear();
    }

    fn decremented_quantity(&self, key: &ProductKey) -> i32 {
        match self.state_of(key) {
            LineSettlement::Decremented { quantity } => quantity,
            LineSettlement::Pending | LineSettlement::Confirmed => 0,
        }
    }

    fn is_settled(&self) -> bool {
        !self.lines.is_empty()
            && self
                .lines
                .values()
                .all(|state| *state == LineSettlement::Confirmed)
    }

    fn record_decrement(&mut self, key: &ProductKey, quantity: i32) {
        self.lines
            .insert(key.clone(), LineSettlement::Decremented { quantity });
    }

    fn confirm_all(&mut self) {
        for state in self.lines.values_mut() {
            *state = LineSettlement::Confirmed;
        }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub lines: Vec<LineItem>,
    pub total: BigDecimal,
    pub placed_at: DateTime<Utc>,
}

/// Settle `cart` against `stock`.
///
/// Each decrement is bounded by `timeout`. On the first failure the remaining
/// lines are not attempted and the cart is left as it was. On success the
/// cart is cleared and every line in `ledger` is marked confirmed.
///
/// Dropping the returned future cancels settlement between calls; decrements
/// already acknowledged stay recorded in `ledger`.
pub async fn place_order<S>(
    cart: &mut Cart,
    ledger: &mut SettlementLedger,
    stock: &S,
    timeout: Duration,
) -> Result<OrderReceipt, SettlementError>
where
    S: StockDecrementer + ?Sized,
{
    if cart.is_empty() {
        return Err(SettlementError::EmptyCart);
    }
    if ledger.is_settled() {
        ledger.reset();
    }
    let order_id = *ledger.order_id.get_or_insert_with(Uuid::new_v4);

    for item in cart.lines() {
        let already = ledger.decremented_quantity(&item.key);
        let outstanding = item.quantity - already;
        if outstanding <= 0 {
            debug!("order {}: {} already decremented, skipping", order_id, item.key);
            continue;
        }

        debug!(
            "order {}: decrementing {} by {}",
            order_id, item.key, outstanding
        );
        match tokio::time::timeout(timeout, stock.decrement_stock(&item.key, outstanding)).await {
            Ok(Ok(())) => ledger.record_decrement(&item.key, item.quantity),
            Ok(Err(source)) => {
                warn!("order {}: stock update for {} failed: {}", order_id, item.key, source);
                return Err(SettlementError::Stock {
                    key: item.key.clone(),
                    source,
                });
            }
            Err(_) => {
                warn!(
                    "order {}: stock update for {} timed out after {:?}",
                    order_id, item.key, timeout
                );
                return Err(SettlementError::Timeout {
                    key: item.key.clone(),
                    timeout,
                });
            }
        }
    }

    ledger.confirm_all();
    let receipt = OrderReceipt {
        order_id,
        lines: cart.lines().to_vec(),
        total: cart.compute_total(),
        placed_at: Utc::now(),
    };
    cart.clear();

    info!(
        "order {} placed: {} line(s), total {}",
        order_id,
        receipt.lines.len(),
        receipt.total
    );
    Ok(receipt)
}
