//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Quantity, Sku};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    id: String,
    user_id: String,
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default)]
    discount_percent: Option<Decimal>,
    #[serde(default)]
    status: CartStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub sku: Sku,
    pub quantity: Quantity,
    /// Unit price captured at add time; `None` or zero means unresolved.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CartItem {
    pub fn matches(&self, product_id: &str, sku: &str) -> bool {
        self.product_id == product_id && self.sku == *sku
    }

    pub fn has_unresolved_price(&self) -> bool {
        self.price.map_or(true, |p| p.is_zero())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus { #[default] Active, Abandoned, Converted }

/// A repaired unit price for one line, keyed by product and SKU.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceCorrection {
    pub product_id: String,
    pub sku: Sku,
    pub price: Decimal,
}

impl Cart {
    /// A user owns at most one cart, so its id is derived from the user id.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        let user_id = user_id.into();
        Self {
            id: Self::id_for(&user_id), user_id, items: vec![],
            discount_percent: None, status: CartStatus::Active,
            created_at: now, updated_at: now, events: vec![],
        }
    }

    pub fn id_for(user_id: &str) -> String { format!("cart-{user_id}") }

    pub fn id(&self) -> &str { &self.id }
    pub fn user_id(&self) -> &str { &self.user_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn status(&self) -> CartStatus { self.status }
    pub fn discount_percent(&self) -> Decimal { self.discount_percent.unwrap_or_default() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Adds a line, merging quantities with an existing line of the same product and SKU.
    /// A converted or abandoned cart becomes active again.
    pub fn add_item(&mut self, item: CartItem) {
        self.status = CartStatus::Active;
        let product_id = item.product_id.clone();
        let sku = item.sku.clone();
        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&item.product_id, item.sku.as_str())) {
            existing.quantity = existing.quantity.add(item.quantity);
            if item.notes.is_some() { existing.notes = item.notes; }
            if existing.has_unresolved_price() { existing.price = item.price; }
        } else {
            self.items.push(item);
        }
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { cart_id: self.id.clone(), product_id, sku }));
    }

    pub fn update_quantity(&mut self, product_id: &str, sku: &str, quantity: Quantity) -> Result<(), CartError> {
        self.item_mut(product_id, sku)?.quantity = quantity;
        self.touch();
        Ok(())
    }

    pub fn update_notes(&mut self, product_id: &str, sku: &str, notes: Option<String>) -> Result<(), CartError> {
        self.item_mut(product_id, sku)?.notes = notes.filter(|n| !n.trim().is_empty());
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, sku: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, sku));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { cart_id: self.id.clone(), product_id: product_id.to_string() }));
        Ok(())
    }

    pub fn set_discount(&mut self, percent: Decimal) -> Result<(), CartError> {
        if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED { return Err(CartError::InvalidDiscount); }
        self.discount_percent = (!percent.is_zero()).then_some(percent);
        self.touch();
        Ok(())
    }

    pub fn mark_abandoned(&mut self) -> Result<(), CartError> {
        if self.status != CartStatus::Active { return Err(CartError::NotActive); }
        self.status = CartStatus::Abandoned;
        self.touch();
        Ok(())
    }

    /// Checkout hand-off: the items now live in an order.
    pub fn convert(&mut self, order_id: &str) {
        self.items.clear();
        self.discount_percent = None;
        self.status = CartStatus::Converted;
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::Converted { cart_id: self.id.clone(), order_id: order_id.to_string() }));
    }

    /// Writes repaired prices onto lines that are still unresolved; lines priced
    /// in the meantime are left alone. Returns how many lines changed.
    pub fn apply_price_corrections(&mut self, corrections: &[PriceCorrection]) -> usize {
        let mut applied = 0;
        for c in corrections {
            if let Some(item) = self.items.iter_mut().find(|i| i.matches(&c.product_id, c.sku.as_str()) && i.has_unresolved_price()) {
                item.price = Some(c.price);
                applied += 1;
            }
        }
        if applied > 0 { self.touch(); }
        applied
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }

    fn item_mut(&mut self, product_id: &str, sku: &str) -> Result<&mut CartItem, CartError> {
        self.items.iter_mut().find(|i| i.matches(product_id, sku)).ok_or(CartError::ItemNotFound)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CartError {
    #[error("Cart item not found")]
    ItemNotFound,
    #[error("Discount percent must be between 0 and 100")]
    InvalidDiscount,
    #[error("Cart is not active")]
    NotActive,
}

impl From<CartError> for crate::ShopError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => crate::ShopError::NotFound(e.to_string()),
            CartError::InvalidDiscount => crate::ShopError::Validation(e.to_string()),
            CartError::NotActive => crate::ShopError::InvalidState(e.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn item(product_id: &str, sku: &str, qty: u32, price: Option<Decimal>) -> CartItem {
        CartItem { product_id: product_id.into(), sku: Sku::new(sku).unwrap(), quantity: Quantity::new(qty).unwrap(), price, notes: None }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::for_user("U1");
        cart.add_item(item("P1", "A1", 2, Some(dec!(10))));
        cart.add_item(item("P1", "A1", 1, Some(dec!(10))));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity.value(), 3); // Merged
        cart.add_item(item("P2", "A1", 1, Some(dec!(5))));
        assert_eq!(cart.items().len(), 2);

        cart.update_quantity("P2", "A1", Quantity::new(4).unwrap()).unwrap();
        cart.update_notes("P2", "A1", Some("gift wrap".into())).unwrap();
        assert_eq!(cart.items()[1].notes.as_deref(), Some("gift wrap"));

        cart.remove_item("P1", "A1").unwrap();
        assert!(matches!(cart.remove_item("P1", "A1"), Err(CartError::ItemNotFound)));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_discount_bounds() {
        let mut cart = Cart::for_user("U1");
        assert!(cart.set_discount(dec!(101)).is_err());
        assert!(cart.set_discount(dec!(-1)).is_err());
        cart.set_discount(dec!(15)).unwrap();
        assert_eq!(cart.discount_percent(), dec!(15));
    }

    #[test]
    fn test_convert_then_reactivate() {
        let mut cart = Cart::for_user("U1");
        cart.add_item(item("P1", "A1", 1, Some(dec!(10))));
        cart.convert("O1");
        assert!(cart.is_empty());
        assert_eq!(cart.status(), CartStatus::Converted);
        assert!(cart.mark_abandoned().is_err());
        cart.add_item(item("P1", "A1", 1, Some(dec!(10))));
        assert_eq!(cart.status(), CartStatus::Active);
    }

    #[test]
    fn test_price_corrections_only_touch_unresolved() {
        let mut cart = Cart::for_user("U1");
        cart.add_item(item("P1", "A1", 1, None));
        cart.add_item(item("P1", "A2", 1, Some(dec!(30))));
        let corrections = vec![
            PriceCorrection { product_id: "P1".into(), sku: Sku::new("A1").unwrap(), price: dec!(50) },
            PriceCorrection { product_id: "P1".into(), sku: Sku::new("A2").unwrap(), price: dec!(99) },
        ];
        assert_eq!(cart.apply_price_corrections(&corrections), 1);
        assert_eq!(cart.items()[0].price, Some(dec!(50)));
        assert_eq!(cart.items()[1].price, Some(dec!(30)));
    }
}
