//! Profit of a drink against its vending price.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profit {
    /// Vending price minus production cost. Negative on a loss.
    pub profit: f64,
    /// Profit as a percentage of the vending price.
    pub margin_pct: f64,
    /// Profit as a percentage of the production cost; `None` when the drink
    /// costs nothing to make.
    pub markup_pct: Option<f64>,
}

impl Profit {
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}

/// Returns `None` when there is no usable vending price (≤ 0 or not finite).
#[must_use]
pub fn compute_profit(total_cost: f64, vending_price: f64) -> Option<Profit> {
    if !vending_price.is_finite() || vending_price <= 0.0 {
        return None;
    }
    let profit = vending_price - total_cost;
    let markup_pct = (total_cost != 0.0).then(|| 100.0 * profit / total_cost);
    Some(Profit {
        profit,
        margin_pct: 100.0 * profit / vending_price,
        markup_pct,
    })
}
