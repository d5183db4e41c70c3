//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{LocalizedText, Quantity, Sku};
use crate::pricing::{self, Totals};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    order_number: String,
    user_id: String,
    items: Vec<OrderItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    totals: Totals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    delivered_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Line frozen at checkout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub sku: Sku,
    pub quantity: Quantity,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Each required field must be non-blank in at least one language.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(custom = "localized_required")]
    pub full_name: LocalizedText,
    #[validate(length(min = 5, max = 32, message = "phone must be 5-32 characters"))]
    pub phone: String,
    #[validate(custom = "localized_required")]
    pub street: LocalizedText,
    #[validate(custom = "localized_required")]
    pub city: LocalizedText,
    #[validate(custom = "localized_required")]
    pub country: LocalizedText,
    #[serde(default)]
    pub building: LocalizedText,
    #[serde(default)]
    pub postal_code: Option<String>,
}

fn localized_required(value: &LocalizedText) -> Result<(), ValidationError> {
    if value.is_blank() { Err(ValidationError::new("required")) } else { Ok(()) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod { #[default] CashOnDelivery, Card }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered, Cancelled }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus { #[default] Pending, Paid, Failed }

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [Self::Pending, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled];

    pub fn is_terminal(self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }

    fn rank(self) -> u8 {
        match self { Self::Pending => 0, Self::Processing => 1, Self::Shipped => 2, Self::Delivered => 3, Self::Cancelled => 4 }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending", Self::Processing => "processing", Self::Shipped => "shipped",
            Self::Delivered => "delivered", Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl Order {
    /// Places an order from lines whose prices are already reconciled.
    pub fn place(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        discount_percent: Decimal,
    ) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        let totals = pricing::aggregate(items.iter().map(|i| (i.price.unwrap_or_default(), i.quantity.value())), discount_percent);
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::now_v7().to_string(),
            order_number: format!("ORD-{:08}", rand::random::<u32>() % 100_000_000),
            user_id: user_id.into(), items, shipping_address, payment_method,
            payment_status: PaymentStatus::Pending, is_paid: false, paid_at: None,
            status: OrderStatus::Pending, totals, created_at: now, updated_at: now,
            cancelled_at: None, delivered_at: None, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id.clone(), user_id: order.user_id.clone(), total: order.totals.total_price_after_discount,
        }));
        Ok(order)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn user_id(&self) -> &str { &self.user_id }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn payment_status(&self) -> PaymentStatus { self.payment_status }
    pub fn payment_method(&self) -> PaymentMethod { self.payment_method }
    pub fn is_paid(&self) -> bool { self.is_paid }
    pub fn paid_at(&self) -> Option<DateTime<Utc>> { self.paid_at }
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> { self.delivered_at }
    pub fn totals(&self) -> &Totals { &self.totals }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Owner-initiated cancellation, only while the order is still pending.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending { return Err(OrderError::CannotCancel(self.status)); }
        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(Utc::now());
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id.clone() }));
        Ok(())
    }

    /// Records a successful payment. A pending order moves to processing in the same write.
    pub fn mark_paid(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled { return Err(OrderError::Cancelled); }
        if self.is_paid { return Err(OrderError::AlreadyPaid); }
        let now = Utc::now();
        self.payment_status = PaymentStatus::Paid;
        self.is_paid = true;
        self.paid_at = Some(now);
        if self.status == OrderStatus::Pending { self.status = OrderStatus::Processing; }
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Paid { order_id: self.id.clone() }));
        Ok(())
    }

    pub fn mark_payment_failed(&mut self) -> Result<(), OrderError> {
        if self.is_paid { return Err(OrderError::AlreadyPaid); }
        self.payment_status = PaymentStatus::Failed;
        self.touch();
        Ok(())
    }

    /// Admin-driven fulfillment update. Forward jumps are allowed; terminal
    /// states are final and cancellation is only reachable from pending.
    pub fn update_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        let current = self.status;
        if current.is_terminal() { return Err(OrderError::Terminal(current)); }
        match next {
            OrderStatus::Cancelled => return self.cancel(),
            n if n.rank() < current.rank() => return Err(OrderError::Backwards { from: current, to: n }),
            n if n == current => return Ok(()),
            _ => {}
        }
        self.status = next;
        if next == OrderStatus::Delivered { self.delivered_at = Some(Utc::now()); }
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id.clone(), status: next }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum OrderError {
    #[error("Order has no items")]
    NoItems,
    #[error("Only pending orders can be cancelled (order is {0})")]
    CannotCancel(OrderStatus),
    #[error("Order is cancelled")]
    Cancelled,
    #[error("Order is already paid")]
    AlreadyPaid,
    #[error("Order is {0} and can no longer change status")]
    Terminal(OrderStatus),
    #[error("Cannot move order from {from} back to {to}")]
    Backwards { from: OrderStatus, to: OrderStatus },
}

impl From<OrderError> for crate::ShopError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NoItems => crate::ShopError::Validation(e.to_string()),
            _ => crate::ShopError::InvalidState(e.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: LocalizedText::bilingual("Sara Ali", "سارة علي"),
            phone: "+966500000000".into(),
            street: "King Fahd Rd".into(),
            city: LocalizedText::bilingual("Riyadh", "الرياض"),
            country: LocalizedText::bilingual("", "السعودية"),
            ..Default::default()
        }
    }

    fn order() -> Order {
        let item = OrderItem { product_id: "P1".into(), sku: Sku::new("W001").unwrap(), quantity: Quantity::new(2).unwrap(), price: Some(dec!(100)), notes: None };
        Order::place("U1", vec![item], address(), PaymentMethod::CashOnDelivery, dec!(10)).unwrap()
    }

    #[test]
    fn test_place_computes_totals() {
        let o = order();
        assert_eq!(o.status(), OrderStatus::Pending);
        assert_eq!(o.totals().total_price_before_discount, dec!(200));
        assert_eq!(o.totals().total_price_after_discount, dec!(180));
        assert!(o.order_number().starts_with("ORD-"));
        assert!(matches!(Order::place("U1", vec![], address(), PaymentMethod::Card, dec!(0)), Err(OrderError::NoItems)));
    }

    #[test]
    fn test_cancel_only_from_pending() {
        let mut o = order();
        o.update_status(OrderStatus::Processing).unwrap();
        assert!(matches!(o.cancel(), Err(OrderError::CannotCancel(OrderStatus::Processing))));

        let mut o = order();
        o.cancel().unwrap();
        assert_eq!(o.status(), OrderStatus::Cancelled);
        assert!(matches!(o.update_status(OrderStatus::Processing), Err(OrderError::Terminal(_))));
    }

    #[test]
    fn test_admin_cancel_past_pending_is_rejected() {
        for reached in [OrderStatus::Processing, OrderStatus::Shipped] {
            let mut o = order();
            o.update_status(reached).unwrap();
            let err = o.update_status(OrderStatus::Cancelled);
            assert!(matches!(err, Err(OrderError::CannotCancel(s)) if s == reached));
            assert_eq!(o.status(), reached);
            assert!(o.cancelled_at.is_none());
        }
    }

    #[test]
    fn test_cancelled_order_cannot_be_paid() {
        let mut o = order();
        o.update_status(OrderStatus::Cancelled).unwrap();
        assert!(matches!(o.mark_paid(), Err(OrderError::Cancelled)));
        assert!(!o.is_paid());
        assert_eq!(o.payment_status(), PaymentStatus::Pending);
        assert_eq!(o.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_mark_paid_moves_to_processing() {
        let mut o = order();
        o.mark_paid().unwrap();
        assert_eq!(o.payment_status(), PaymentStatus::Paid);
        assert!(o.is_paid());
        assert!(o.paid_at().is_some());
        assert_eq!(o.status(), OrderStatus::Processing);
        assert!(matches!(o.mark_paid(), Err(OrderError::AlreadyPaid)));
    }

    #[test]
    fn test_failed_payment_keeps_status() {
        let mut o = order();
        o.mark_payment_failed().unwrap();
        assert_eq!(o.payment_status(), PaymentStatus::Failed);
        assert_eq!(o.status(), OrderStatus::Pending);
        o.mark_paid().unwrap();
        assert_eq!(o.status(), OrderStatus::Processing);
    }

    #[test]
    fn test_order_workflow() {
        let mut o = order();
        o.update_status(OrderStatus::Shipped).unwrap(); // forward jump
        assert!(matches!(o.update_status(OrderStatus::Processing), Err(OrderError::Backwards { .. })));
        o.update_status(OrderStatus::Delivered).unwrap();
        assert!(o.delivered_at().is_some());
        assert!(o.update_status(OrderStatus::Shipped).is_err());
    }

    #[test]
    fn test_address_single_locale_is_enough() {
        assert!(address().validate().is_ok());
        let mut bad = address();
        bad.city = LocalizedText::Absent;
        assert!(bad.validate().is_err());
    }
}
