//! Admin dashboard figures.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use crate::domain::aggregates::{CartItem, CartStatus, OrderStatus};
use crate::store::Stores;
use crate::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub orders_by_status: BTreeMap<String, u64>,
    pub paid_orders: u64,
    /// Post-discount totals of paid orders.
    pub revenue: Decimal,
    pub carts_by_status: BTreeMap<String, u64>,
    pub unresolved_cart_items: u64,
}

#[derive(Clone)]
pub struct AnalyticsService {
    stores: Stores,
}

impl AnalyticsService {
    pub fn new(stores: Stores) -> Self { Self { stores } }

    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        let orders = self.stores.orders.list().await?;
        let carts = self.stores.carts.list().await?;

        let mut orders_by_status: BTreeMap<String, u64> = OrderStatus::ALL.iter().map(|s| (s.to_string(), 0)).collect();
        let mut paid_orders = 0;
        let mut revenue = Decimal::ZERO;
        for order in &orders {
            *orders_by_status.entry(order.status().to_string()).or_default() += 1;
            if order.is_paid() {
                paid_orders += 1;
                revenue += order.totals().total_price_after_discount;
            }
        }

        let mut carts_by_status = BTreeMap::new();
        for status in [CartStatus::Active, CartStatus::Abandoned, CartStatus::Converted] {
            carts_by_status.insert(cart_status_key(status).to_string(), 0);
        }
        let mut unresolved_cart_items = 0;
        for cart in &carts {
            *carts_by_status.entry(cart_status_key(cart.status()).to_string()).or_default() += 1;
            unresolved_cart_items += cart.items().iter().filter(|i| CartItem::has_unresolved_price(i)).count() as u64;
        }

        Ok(AnalyticsSummary { orders_by_status, paid_orders, revenue, carts_by_status, unresolved_cart_items })
    }
}

fn cart_status_key(status: CartStatus) -> &'static str {
    match status { CartStatus::Active => "active", CartStatus::Abandoned => "abandoned", CartStatus::Converted => "converted" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Cart, Order, OrderItem, PaymentMethod};
    use crate::domain::aggregates::cart::tests::item;
    use crate::domain::aggregates::order::tests::address;
    use crate::domain::value_objects::{Quantity, Sku};
    use rust_decimal_macros::dec;

    fn order(price: Decimal) -> Order {
        let line = OrderItem { product_id: "P".into(), sku: Sku::new("S").unwrap(), quantity: Quantity::new(1).unwrap(), price: Some(price), notes: None };
        Order::place("U1", vec![line], address(), PaymentMethod::Card, Decimal::ZERO).unwrap()
    }

    #[tokio::test]
    async fn test_summary() {
        let stores = Stores::in_memory();
        let mut paid = order(dec!(100));
        paid.mark_paid().unwrap();
        stores.orders.save(&paid).await.unwrap();
        stores.orders.save(&order(dec!(40))).await.unwrap();

        let mut cart = Cart::for_user("U1");
        cart.add_item(item("P", "S", 1, None));
        cart.add_item(item("P", "T", 1, Some(dec!(5))));
        stores.carts.save(&cart).await.unwrap();

        let s = AnalyticsService::new(stores).summary().await.unwrap();
        assert_eq!(s.orders_by_status["processing"], 1);
        assert_eq!(s.orders_by_status["pending"], 1);
        assert_eq!(s.orders_by_status["delivered"], 0);
        assert_eq!(s.paid_orders, 1);
        assert_eq!(s.revenue, dec!(100));
        assert_eq!(s.carts_by_status["active"], 1);
        assert_eq!(s.unresolved_cart_items, 1);
    }
}
