//! Project domain — the collectible listing whose floor price is watched.

pub mod client;
pub mod convert;
pub mod wire;

use crate::shared::ProjectId;
use rust_decimal::Decimal;

/// A collectible project as listed on a catalog tab.
///
/// Prices are decimals here; the wire carries them as numeric strings and an
/// unparseable string becomes zero (see [`crate::shared::parse_price`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub img_url: String,
    pub floor_price: Decimal,
    pub last_trade_price: Decimal,
}
