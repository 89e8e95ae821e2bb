//! Conversion: ProjectRecord → Project.

use super::wire::ProjectRecord;
use super::Project;
use crate::shared::parse_price;

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.project_id,
            name: record.name,
            img_url: record.img_url,
            floor_price: parse_price(&record.floor_price),
            last_trade_price: parse_price(&record.last_trade_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(floor: &str, last: &str) -> ProjectRecord {
        ProjectRecord {
            project_id: "p1".into(),
            name: "Test".into(),
            img_url: String::new(),
            floor_price: floor.into(),
            last_trade_price: last.into(),
        }
    }

    #[test]
    fn test_prices_parsed() {
        let p: Project = record("150.00", "148.50").into();
        assert_eq!(p.floor_price, Decimal::from_str("150.00").unwrap());
        assert_eq!(p.last_trade_price, Decimal::from_str("148.50").unwrap());
    }

    #[test]
    fn test_unparseable_price_becomes_zero() {
        let p: Project = record("--", "148.50").into();
        assert_eq!(p.floor_price, Decimal::ZERO);
        assert_eq!(p.last_trade_price, Decimal::from_str("148.50").unwrap());
    }
}
