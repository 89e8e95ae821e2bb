//! Threshold alerting — predicate and notification delivery.
//!
//! Level-triggered: every qualifying poll re-fires, including consecutive
//! polls at the same low price. There is no cooldown.

use rust_decimal::Decimal;

use super::{AlertConfig, Notifier};
use crate::shared::format_price;

/// Returns the parsed threshold when an alert should fire.
///
/// Fires iff alerting is enabled, the configured minimum parses as a number,
/// the floor price is positive, and the floor price is at or below the
/// minimum. An unparseable minimum makes this a no-op, never an error.
pub fn due(config: &AlertConfig, floor_price: Decimal) -> Option<Decimal> {
    if !config.enabled {
        return None;
    }
    let threshold = config.threshold()?;
    if floor_price <= Decimal::ZERO {
        return None;
    }
    (floor_price <= threshold).then_some(threshold)
}

/// Deliver the low-price notification plus the feedback signal.
pub fn fire(notifier: &dyn Notifier, floor_price: Decimal) {
    notifier.notify(
        "地板价过低",
        &format!("当前价格 {}，低于设定阈值。", format_price(floor_price)),
    );
    notifier.feedback();
}
