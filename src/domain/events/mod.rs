//! Domain events
use crate::domain::aggregates::OrderStatus;
use crate::domain::value_objects::Sku;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", content = "event", rename_all = "lowercase")]
pub enum DomainEvent {
    Product(ProductEvent),
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: String },
    Updated { product_id: String },
    Archived { product_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { cart_id: String, product_id: String, sku: Sku },
    ItemRemoved { cart_id: String, product_id: String },
    PricesCorrected { cart_id: String, items: usize },
    Converted { cart_id: String, order_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, user_id: String, total: Decimal },
    Paid { order_id: String },
    StatusChanged { order_id: String, status: OrderStatus },
    Cancelled { order_id: String },
}

impl DomainEvent {
    /// NATS subject, e.g. `shop.order.placed`.
    pub fn subject(&self) -> String {
        let (kind, name) = match self {
            Self::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Updated { .. } => "updated",
                ProductEvent::Archived { .. } => "archived",
            }),
            Self::Cart(e) => ("cart", match e {
                CartEvent::ItemAdded { .. } => "item_added",
                CartEvent::ItemRemoved { .. } => "item_removed",
                CartEvent::PricesCorrected { .. } => "prices_corrected",
                CartEvent::Converted { .. } => "converted",
            }),
            Self::Order(e) => ("order", match e {
                OrderEvent::Placed { .. } => "placed",
                OrderEvent::Paid { .. } => "paid",
                OrderEvent::StatusChanged { .. } => "status_changed",
                OrderEvent::Cancelled { .. } => "cancelled",
            }),
        };
        format!("shop.{kind}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject() {
        let e = DomainEvent::Order(OrderEvent::Cancelled { order_id: "O1".into() });
        assert_eq!(e.subject(), "shop.order.cancelled");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "order");
        assert_eq!(json["event"]["type"], "cancelled");
    }
}
