//! Watch state container — current snapshot, rolling history, trend.
//!
//! Owned by the watcher task (single writer); consumers read clones.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{PriceSnapshot, Trend};

/// In-memory result of the polls so far.
#[derive(Debug, Clone)]
pub struct WatchState {
    current: Option<PriceSnapshot>,
    history: VecDeque<Decimal>,
    history_cap: usize,
    trend: Trend,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
    loading: bool,
}

impl WatchState {
    pub fn new(history_cap: usize) -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(history_cap),
            history_cap,
            trend: Trend::Flat,
            last_updated: None,
            last_error: None,
            loading: false,
        }
    }

    /// Apply a successful poll.
    ///
    /// Computes the trend against the previous in-memory floor price (Flat on
    /// the very first observation), appends to the bounded history evicting
    /// the oldest entry, stamps `last_updated` and clears any error state.
    pub fn observe(&mut self, snapshot: PriceSnapshot) -> Trend {
        self.trend = match &self.current {
            None => Trend::Flat,
            Some(prev) => Trend::from_change(snapshot.floor_price, prev.floor_price),
        };

        if self.history.len() >= self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(snapshot.floor_price);

        self.last_updated = Some(snapshot.observed_at);
        self.last_error = None;
        self.current = Some(snapshot);
        self.trend
    }

    /// Record a failed poll. Price state stays untouched.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&PriceSnapshot> {
        self.current.as_ref()
    }

    pub fn floor_price(&self) -> Option<Decimal> {
        self.current.as_ref().map(|s| s.floor_price)
    }

    /// Floor prices in observation order, oldest first.
    pub fn history(&self) -> &VecDeque<Decimal> {
        &self.history
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn snapshot(price: &str) -> PriceSnapshot {
        PriceSnapshot {
            project_name: "Test".into(),
            floor_price: Decimal::from_str(price).unwrap(),
            last_trade_price: Decimal::from_str(price).unwrap(),
            observed_at: Utc::now(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_first_observation_is_flat() {
        let mut state = WatchState::new(24);
        let trend = state.observe(snapshot("150.00"));
        assert_eq!(trend, Trend::Flat);
        assert_eq!(state.floor_price(), Some(dec("150.00")));
        assert!(state.last_updated().is_some());
    }

    #[test]
    fn test_trend_follows_price_direction() {
        let mut state = WatchState::new(24);
        state.observe(snapshot("150.00"));
        assert_eq!(state.observe(snapshot("151.00")), Trend::Up);
        assert_eq!(state.observe(snapshot("110.00")), Trend::Down);
        assert_eq!(state.observe(snapshot("110.00")), Trend::Flat);
        assert_eq!(state.trend(), Trend::Flat);
    }

    #[test]
    fn test_history_keeps_last_cap_in_order() {
        let mut state = WatchState::new(24);
        for i in 0..30 {
            state.observe(snapshot(&format!("{}", 100 + i)));
        }
        assert_eq!(state.history().len(), 24);
        let expected: Vec<Decimal> = (6..30).map(|i| Decimal::from(100 + i)).collect();
        let actual: Vec<Decimal> = state.history().iter().copied().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_error_leaves_price_state_untouched() {
        let mut state = WatchState::new(24);
        state.observe(snapshot("150.00"));
        let updated = state.last_updated();

        state.record_error("boom");
        assert_eq!(state.last_error(), Some("boom"));
        assert_eq!(state.floor_price(), Some(dec("150.00")));
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.last_updated(), updated);
    }

    #[test]
    fn test_success_clears_error() {
        let mut state = WatchState::new(24);
        state.record_error("boom");
        state.observe(snapshot("150.00"));
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn test_loading_flag() {
        let mut state = WatchState::new(24);
        assert!(!state.is_loading());
        state.set_loading(true);
        assert!(state.is_loading());
        state.set_loading(false);
        assert!(!state.is_loading());
    }
}
