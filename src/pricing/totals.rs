use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_items: u64,
    pub total_price_before_discount: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub total_price_after_discount: Decimal,
}

/// Sums `(unit price, quantity)` lines and applies a percentage discount.
/// The percentage is taken as given; callers validate it to `[0, 100]`.
pub fn aggregate(lines: impl IntoIterator<Item = (Decimal, u32)>, discount_percent: Decimal) -> Totals {
    let (total_items, before) = lines.into_iter().fold((0u64, Decimal::ZERO), |(count, sum), (price, qty)| {
        (count + u64::from(qty), sum + price * Decimal::from(qty))
    });
    let discount_amount = before * discount_percent / Decimal::ONE_HUNDRED;
    Totals {
        total_items,
        total_price_before_discount: before,
        discount_percent,
        discount_amount,
        total_price_after_discount: before - discount_amount,
    }
}

/// Presentation-time pricing applied on top of persisted totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayPricing {
    /// Flat tax as a fraction, e.g. `0.10`.
    pub tax_rate: Decimal,
}

impl Default for DisplayPricing {
    fn default() -> Self { Self { tax_rate: Decimal::new(10, 2) } }
}

impl DisplayPricing {
    pub fn display_total(&self, totals: &Totals) -> Decimal {
        totals.total_price_after_discount * (Decimal::ONE + self.tax_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_lines() {
        let t = aggregate(Vec::<(Decimal, u32)>::new(), dec!(25));
        assert_eq!(t.total_items, 0);
        assert_eq!(t.total_price_before_discount, Decimal::ZERO);
        assert_eq!(t.discount_amount, Decimal::ZERO);
        assert_eq!(t.total_price_after_discount, Decimal::ZERO);
        assert_eq!(DisplayPricing::default().display_total(&t), Decimal::ZERO);
    }

    #[test]
    fn test_discount_and_display_total() {
        let t = aggregate([(dec!(100), 2)], dec!(10));
        assert_eq!(t.total_items, 2);
        assert_eq!(t.total_price_before_discount, dec!(200));
        assert_eq!(t.discount_amount, dec!(20));
        assert_eq!(t.total_price_after_discount, dec!(180));
        assert_eq!(DisplayPricing::default().display_total(&t), dec!(198.0));
    }

    #[test]
    fn test_configured_tax_rate() {
        let t = aggregate([(dec!(50), 1), (dec!(25), 2)], Decimal::ZERO);
        assert_eq!(t.total_price_after_discount, dec!(100));
        assert_eq!(DisplayPricing { tax_rate: dec!(0.15) }.display_total(&t), dec!(115));
    }
}
