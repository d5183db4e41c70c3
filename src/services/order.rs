//! Order service: checkout, owner views and admin status/payment updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;
use crate::auth::AuthUser;
use crate::domain::aggregates::{CartStatus, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::domain::value_objects::Lang;
use crate::pricing::{enrich_lines, reconcile, DisplayPricing, EnrichedItem, Totals};
use crate::publisher::EventPublisher;
use crate::store::Stores;
use crate::{Result, ShopError};
use super::product_index;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentUpdateRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub items: Vec<EnrichedItem>,
    #[serde(flatten)]
    pub totals: Totals,
    pub display_total: Decimal,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct OrderService {
    stores: Stores,
    publisher: EventPublisher,
    display: DisplayPricing,
}

impl OrderService {
    pub fn new(stores: Stores, publisher: EventPublisher, display: DisplayPricing) -> Self {
        Self { stores, publisher, display }
    }

    /// Turns the caller's active cart into a pending order, then empties the cart.
    /// The two writes are independent: a failed cart update leaves the order in place.
    #[instrument(skip(self, req))]
    pub async fn checkout(&self, user_id: &str, req: CheckoutRequest, lang: Lang) -> Result<OrderView> {
        req.validate()?;
        let mut cart = self.stores.carts.find_by_owner(user_id).await?.into_iter().next()
            .ok_or_else(|| ShopError::not_found("Cart"))?;
        if cart.is_empty() { return Err(ShopError::validation("cart is empty")); }
        if cart.status() != CartStatus::Active {
            return Err(ShopError::InvalidState("cart is not active".into()));
        }

        let products = product_index(&self.stores, cart.items()).await?;
        let mut items = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            let option = products.get(&line.product_id)
                .and_then(|p| p.resolve(line.sku.as_str()))
                .ok_or_else(|| ShopError::validation(format!("invalid SKU {} for product {}", line.sku, line.product_id)))?;
            let reconciled = reconcile(line, Some(option));
            items.push(OrderItem {
                product_id: line.product_id.clone(),
                sku: line.sku.clone(),
                quantity: line.quantity,
                price: Some(reconciled.price),
                notes: line.notes.clone(),
            });
        }

        let mut order = Order::place(user_id, items, req.shipping_address, req.payment_method, cart.discount_percent())?;
        self.save(&mut order).await?;
        info!(order_id = order.id(), order_number = order.order_number(), "order placed");

        cart.convert(order.id());
        self.stores.carts.save(&cart).await?;
        self.publisher.publish_all(cart.take_events()).await;

        self.render(&order, lang).await
    }

    pub async fn list_for_user(&self, user_id: &str, lang: Lang) -> Result<Vec<OrderView>> {
        let orders = self.stores.orders.find_by_owner(user_id).await?;
        self.render_all(&orders, lang).await
    }

    pub async fn list_all(&self, lang: Lang) -> Result<Vec<OrderView>> {
        let orders = self.stores.orders.list().await?;
        self.render_all(&orders, lang).await
    }

    pub async fn get(&self, user: &AuthUser, order_id: &str, lang: Lang) -> Result<OrderView> {
        let order = self.find(order_id).await?;
        user.require_owner_or_admin(order.user_id())?;
        self.render(&order, lang).await
    }

    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn cancel(&self, user: &AuthUser, order_id: &str, lang: Lang) -> Result<OrderView> {
        let mut order = self.find(order_id).await?;
        user.require_owner_or_admin(order.user_id())?;
        order.cancel()?;
        self.save(&mut order).await?;
        self.render(&order, lang).await
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, req: StatusUpdateRequest, lang: Lang) -> Result<OrderView> {
        let mut order = self.find(order_id).await?;
        order.update_status(req.status)?;
        self.save(&mut order).await?;
        self.render(&order, lang).await
    }

    #[instrument(skip(self))]
    pub async fn update_payment(&self, order_id: &str, req: PaymentUpdateRequest, lang: Lang) -> Result<OrderView> {
        let mut order = self.find(order_id).await?;
        match req.status {
            PaymentStatus::Paid => order.mark_paid()?,
            PaymentStatus::Failed => order.mark_payment_failed()?,
            PaymentStatus::Pending => return Err(ShopError::validation("payment status can only be set to paid or failed")),
        }
        self.save(&mut order).await?;
        self.render(&order, lang).await
    }

    async fn find(&self, order_id: &str) -> Result<Order> {
        self.stores.orders.find_by_id(order_id).await?.ok_or_else(|| ShopError::not_found("Order"))
    }

    async fn save(&self, order: &mut Order) -> Result<()> {
        self.stores.orders.save(order).await?;
        self.publisher.publish_all(order.take_events()).await;
        Ok(())
    }

    async fn render_all(&self, orders: &[Order], lang: Lang) -> Result<Vec<OrderView>> {
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.render(order, lang).await?);
        }
        Ok(views)
    }

    /// Item prices are display-reconciled only; persisted totals stay frozen.
    async fn render(&self, order: &Order, lang: Lang) -> Result<OrderView> {
        let products = product_index(&self.stores, order.items()).await?;
        let enriched = enrich_lines(order.items(), &products, lang);
        let totals = order.totals().clone();
        Ok(OrderView {
            id: order.id().to_string(),
            order_number: order.order_number().to_string(),
            user_id: order.user_id().to_string(),
            status: order.status(),
            payment_method: order.payment_method(),
            payment_status: order.payment_status(),
            is_paid: order.is_paid(),
            paid_at: order.paid_at(),
            items: enriched.items,
            display_total: self.display.display_total(&totals),
            totals,
            shipping_address: order.shipping_address().clone(),
            created_at: order.created_at(),
            delivered_at: order.delivered_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::domain::aggregates::{Cart, Product, Variant};
    use crate::domain::aggregates::cart::tests::item;
    use crate::domain::aggregates::order::tests::address;
    use crate::domain::aggregates::product::tests::{option, phone};
    use crate::domain::value_objects::LocalizedText;
    use rust_decimal_macros::dec;

    fn customer(id: &str) -> AuthUser { AuthUser { user_id: id.into(), role: Role::Customer } }

    async fn seeded(lines: &[(&str, Option<Decimal>, u32)]) -> (OrderService, Stores, Product) {
        let stores = Stores::in_memory();
        let product = phone(vec![Variant {
            name: LocalizedText::bilingual("Storage", "السعة"),
            options: vec![option("A1", dec!(70), Some(dec!(50))), option("A2", dec!(30), None)],
        }]);
        stores.products.save(&product).await.unwrap();
        let mut cart = Cart::for_user("U1");
        for (sku, price, qty) in lines {
            cart.add_item(item(&product.id, sku, *qty, *price));
        }
        stores.carts.save(&cart).await.unwrap();
        let svc = OrderService::new(stores.clone(), EventPublisher::default(), DisplayPricing::default());
        (svc, stores, product)
    }

    fn checkout_req() -> CheckoutRequest {
        CheckoutRequest { shipping_address: address(), payment_method: PaymentMethod::CashOnDelivery }
    }

    #[tokio::test]
    async fn test_checkout_freezes_reconciled_prices_and_converts_cart() {
        let (svc, stores, _) = seeded(&[("A1", Some(dec!(0)), 2), ("A2", Some(dec!(30)), 1)]).await;
        let view = svc.checkout("U1", checkout_req(), Lang::En).await.unwrap();
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.totals.total_price_before_discount, dec!(130));

        let stored = stores.orders.find_by_id(&view.id).await.unwrap().unwrap();
        assert_eq!(stored.items()[0].price, Some(dec!(50)));

        let cart = stores.carts.find_by_owner("U1").await.unwrap().remove(0);
        assert!(cart.is_empty());
        assert_eq!(cart.status(), CartStatus::Converted);
        assert!(matches!(svc.checkout("U1", checkout_req(), Lang::En).await, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_checkout_rejects_unknown_sku() {
        let (svc, _, _) = seeded(&[("ZZ", Some(dec!(10)), 1)]).await;
        assert!(matches!(svc.checkout("U1", checkout_req(), Lang::En).await, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_checkout_rejects_abandoned_cart() {
        let (svc, stores, _) = seeded(&[("A2", None, 1)]).await;
        let mut cart = stores.carts.find_by_owner("U1").await.unwrap().remove(0);
        cart.mark_abandoned().unwrap();
        stores.carts.save(&cart).await.unwrap();

        assert!(matches!(svc.checkout("U1", checkout_req(), Lang::En).await, Err(ShopError::InvalidState(_))));
        assert!(stores.orders.list().await.unwrap().is_empty());
        let cart = stores.carts.find_by_owner("U1").await.unwrap().remove(0);
        assert_eq!(cart.status(), CartStatus::Abandoned);
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_rejects_bad_address() {
        let (svc, _, _) = seeded(&[("A1", None, 1)]).await;
        let mut req = checkout_req();
        req.shipping_address.phone = "1".into();
        assert!(matches!(svc.checkout("U1", req, Lang::En).await, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancel_and_payment_rules() {
        let (svc, _, _) = seeded(&[("A2", None, 1)]).await;
        let order = svc.checkout("U1", checkout_req(), Lang::En).await.unwrap();

        assert!(matches!(svc.cancel(&customer("U2"), &order.id, Lang::En).await, Err(ShopError::Forbidden(_))));

        let paid = svc.update_payment(&order.id, PaymentUpdateRequest { status: PaymentStatus::Paid }, Lang::En).await.unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.status, OrderStatus::Processing);

        let err = svc.cancel(&customer("U1"), &order.id, Lang::En).await;
        assert!(matches!(err, Err(ShopError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_owner_cancels_pending_order() {
        let (svc, _, _) = seeded(&[("A2", None, 1)]).await;
        let order = svc.checkout("U1", checkout_req(), Lang::En).await.unwrap();
        let cancelled = svc.cancel(&customer("U1"), &order.id, Lang::En).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(svc.list_for_user("U1", Lang::En).await.unwrap().len(), 1);
        assert!(matches!(svc.get(&customer("U1"), "nope", Lang::En).await, Err(ShopError::NotFound(_))));
    }
}
