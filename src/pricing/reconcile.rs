use rust_decimal::Decimal;
use crate::domain::aggregates::{CartItem, OrderItem, VariantOption};
use crate::domain::value_objects::{Quantity, Sku};

/// A cart or order line as seen by the reconciler.
pub trait PricedLine {
    fn product_id(&self) -> &str;
    fn sku(&self) -> &Sku;
    fn quantity(&self) -> Quantity;
    fn notes(&self) -> Option<&str>;
    /// Unit price stored on the line; `None` when never captured.
    fn stored_price(&self) -> Option<Decimal>;
}

impl PricedLine for CartItem {
    fn product_id(&self) -> &str { &self.product_id }
    fn sku(&self) -> &Sku { &self.sku }
    fn quantity(&self) -> Quantity { self.quantity }
    fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    fn stored_price(&self) -> Option<Decimal> { self.price }
}

impl PricedLine for OrderItem {
    fn product_id(&self) -> &str { &self.product_id }
    fn sku(&self) -> &Sku { &self.sku }
    fn quantity(&self) -> Quantity { self.quantity }
    fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    fn stored_price(&self) -> Option<Decimal> { self.price }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub price: Decimal,
    /// The price was derived from the variant option and should be persisted.
    pub was_corrected: bool,
}

/// Picks the authoritative unit price for a line.
///
/// A positive stored price always wins. Otherwise the resolved option's
/// effective price is used, and flagged as a correction when positive.
/// Never persists anything.
pub fn reconcile(line: &impl PricedLine, option: Option<&VariantOption>) -> Reconciled {
    match line.stored_price() {
        Some(p) if p > Decimal::ZERO => Reconciled { price: p, was_corrected: false },
        _ => {
            let price = option.map(VariantOption::effective_price).unwrap_or_default();
            Reconciled { price, was_corrected: price > Decimal::ZERO }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::tests::item;
    use crate::domain::aggregates::product::tests::option;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_stored_price_is_authoritative() {
        let resolved = option("A1", dec!(999), Some(dec!(500)));
        for opt in [Some(&resolved), None] {
            let r = reconcile(&item("P", "A1", 1, Some(dec!(30))), opt);
            assert_eq!(r, Reconciled { price: dec!(30), was_corrected: false });
        }
    }

    #[test]
    fn test_missing_price_uses_discounted_option_price() {
        let opt = option("A1", dec!(70), Some(dec!(50)));
        for stored in [None, Some(dec!(0))] {
            let r = reconcile(&item("P", "A1", 1, stored), Some(&opt));
            assert_eq!(r, Reconciled { price: dec!(50), was_corrected: true });
        }
    }

    #[test]
    fn test_missing_price_falls_back_to_base_price() {
        let r = reconcile(&item("P", "A1", 1, None), Some(&option("A1", dec!(70), None)));
        assert_eq!(r, Reconciled { price: dec!(70), was_corrected: true });
    }

    #[test]
    fn test_unresolved_zero_price_stays_zero() {
        let r = reconcile(&item("P", "A1", 1, Some(dec!(0))), None);
        assert_eq!(r, Reconciled { price: dec!(0), was_corrected: false });
        // A zero-priced option is not a correction either.
        let r = reconcile(&item("P", "A1", 1, None), Some(&option("A1", dec!(0), None)));
        assert!(!r.was_corrected);
    }
}
