//! Cart service: per-user cart mutations, enriched views and price repair.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use validator::Validate;
use crate::domain::aggregates::{Cart, CartItem, CartStatus, PriceCorrection};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Lang, Quantity, Sku};
use crate::pricing::{enrich_lines, DisplayPricing, EnrichedItem, Totals};
use crate::publisher::EventPublisher;
use crate::store::Stores;
use crate::{Result, ShopError};
use super::product_index;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: u32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(range(min = 1, max = 10000))]
    pub quantity: Option<u32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    #[validate(custom = "percent_range")]
    pub discount_percent: Decimal,
}

fn percent_range(value: &Decimal) -> std::result::Result<(), validator::ValidationError> {
    if value.is_sign_negative() || *value > Decimal::ONE_HUNDRED {
        Err(validator::ValidationError::new("discount_percent_range"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub status: CartStatus,
    pub items: Vec<EnrichedItem>,
    #[serde(flatten)]
    pub totals: Totals,
    pub display_total: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFixReport {
    pub carts_scanned: usize,
    pub carts_updated: usize,
    pub items_corrected: usize,
}

#[derive(Clone)]
pub struct CartService {
    stores: Stores,
    publisher: EventPublisher,
    display: DisplayPricing,
}

impl CartService {
    pub fn new(stores: Stores, publisher: EventPublisher, display: DisplayPricing) -> Self {
        Self { stores, publisher, display }
    }

    /// The caller's cart with reconciled prices. Repaired prices are written
    /// back in the background; the view never waits on or fails because of that.
    #[instrument(skip(self))]
    pub async fn view(&self, user_id: &str, lang: Lang) -> Result<CartView> {
        let cart = self.find_for_user(user_id).await?.ok_or_else(|| ShopError::not_found("Cart"))?;
        let (view, corrections) = self.render(&cart, lang).await?;
        if !corrections.is_empty() {
            self.spawn_price_write_back(cart.id().to_string(), corrections);
        }
        Ok(view)
    }

    #[instrument(skip(self, req), fields(product_id = %req.product_id, sku = %req.sku))]
    pub async fn add_item(&self, user_id: &str, req: AddItemRequest, lang: Lang) -> Result<CartView> {
        req.validate()?;
        let sku = Sku::new(req.sku)?;
        let quantity = Quantity::new(req.quantity).ok_or_else(|| ShopError::validation("quantity must be positive"))?;
        let product = self.stores.products.find_by_id(&req.product_id).await?
            .ok_or_else(|| ShopError::not_found("Product"))?;
        let option = product.resolve(sku.as_str()).ok_or_else(|| ShopError::not_found("Variant"))?;
        let price = option.effective_price();

        let mut cart = self.find_for_user(user_id).await?.unwrap_or_else(|| Cart::for_user(user_id));
        cart.add_item(CartItem {
            product_id: product.id.clone(), sku, quantity,
            price: (!price.is_zero()).then_some(price),
            notes: req.notes.filter(|n| !n.trim().is_empty()),
        });
        self.save(&mut cart).await?;
        Ok(self.render(&cart, lang).await?.0)
    }

    pub async fn update_item(&self, user_id: &str, product_id: &str, sku: &str, req: UpdateItemRequest, lang: Lang) -> Result<CartView> {
        req.validate()?;
        let mut cart = self.find_for_user(user_id).await?.ok_or_else(|| ShopError::not_found("Cart"))?;
        if let Some(q) = req.quantity {
            let quantity = Quantity::new(q).ok_or_else(|| ShopError::validation("quantity must be positive"))?;
            cart.update_quantity(product_id, sku, quantity)?;
        }
        if req.notes.is_some() {
            cart.update_notes(product_id, sku, req.notes)?;
        }
        self.save(&mut cart).await?;
        Ok(self.render(&cart, lang).await?.0)
    }

    pub async fn remove_item(&self, user_id: &str, product_id: &str, sku: &str, lang: Lang) -> Result<CartView> {
        let mut cart = self.find_for_user(user_id).await?.ok_or_else(|| ShopError::not_found("Cart"))?;
        cart.remove_item(product_id, sku)?;
        self.save(&mut cart).await?;
        Ok(self.render(&cart, lang).await?.0)
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let cart = self.find_for_user(user_id).await?.ok_or_else(|| ShopError::not_found("Cart"))?;
        self.stores.carts.delete(cart.id()).await?;
        info!(cart_id = cart.id(), "cart deleted");
        Ok(())
    }

    /// All carts, enriched. Corrections are not written back here; use [`Self::fix_prices`].
    pub async fn list_all(&self, lang: Lang) -> Result<Vec<CartView>> {
        let mut views = Vec::new();
        for cart in self.stores.carts.list().await? {
            views.push(self.render(&cart, lang).await?.0);
        }
        Ok(views)
    }

    pub async fn set_discount(&self, cart_id: &str, req: DiscountRequest, lang: Lang) -> Result<CartView> {
        req.validate()?;
        let mut cart = self.find_by_id(cart_id).await?;
        cart.set_discount(req.discount_percent)?;
        self.save(&mut cart).await?;
        Ok(self.render(&cart, lang).await?.0)
    }

    pub async fn abandon(&self, cart_id: &str, lang: Lang) -> Result<CartView> {
        let mut cart = self.find_by_id(cart_id).await?;
        cart.mark_abandoned()?;
        self.save(&mut cart).await?;
        Ok(self.render(&cart, lang).await?.0)
    }

    /// Synchronous repair of every cart holding unresolved prices.
    #[instrument(skip(self))]
    pub async fn fix_prices(&self) -> Result<PriceFixReport> {
        let mut report = PriceFixReport::default();
        for mut cart in self.stores.carts.list().await? {
            report.carts_scanned += 1;
            if !cart.items().iter().any(CartItem::has_unresolved_price) { continue; }
            let products = product_index(&self.stores, cart.items()).await?;
            let corrections = enrich_lines(cart.items(), &products, Lang::En).corrections;
            let applied = cart.apply_price_corrections(&corrections);
            if applied > 0 {
                self.stores.carts.save(&cart).await?;
                report.carts_updated += 1;
                report.items_corrected += applied;
            }
        }
        info!(?report, "bulk price repair finished");
        Ok(report)
    }

    /// Persists repaired prices without blocking the caller. Errors are logged only.
    pub fn spawn_price_write_back(&self, cart_id: String, corrections: Vec<PriceCorrection>) -> JoinHandle<()> {
        let stores = self.stores.clone();
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            match write_back(&stores, &cart_id, &corrections).await {
                Ok(0) => {}
                Ok(items) => {
                    info!(%cart_id, items, "cart prices corrected");
                    publisher.publish_all(vec![DomainEvent::Cart(CartEvent::PricesCorrected { cart_id, items })]).await;
                }
                Err(e) => warn!(%cart_id, error = %e, "price write-back failed"),
            }
        })
    }

    pub(crate) async fn find_for_user(&self, user_id: &str) -> Result<Option<Cart>> {
        Ok(self.stores.carts.find_by_owner(user_id).await?.into_iter().next())
    }

    async fn find_by_id(&self, cart_id: &str) -> Result<Cart> {
        self.stores.carts.find_by_id(cart_id).await?.ok_or_else(|| ShopError::not_found("Cart"))
    }

    async fn save(&self, cart: &mut Cart) -> Result<()> {
        self.stores.carts.save(cart).await?;
        self.publisher.publish_all(cart.take_events()).await;
        Ok(())
    }

    async fn render(&self, cart: &Cart, lang: Lang) -> Result<(CartView, Vec<PriceCorrection>)> {
        let products = product_index(&self.stores, cart.items()).await?;
        let enriched = enrich_lines(cart.items(), &products, lang);
        let totals = enriched.totals(cart.discount_percent());
        let view = CartView {
            id: cart.id().to_string(),
            user_id: cart.user_id().to_string(),
            status: cart.status(),
            display_total: self.display.display_total(&totals),
            totals,
            items: enriched.items,
            updated_at: cart.updated_at(),
        };
        Ok((view, enriched.corrections))
    }
}

/// Re-reads the cart so concurrent edits since the view are kept.
async fn write_back(stores: &Stores, cart_id: &str, corrections: &[PriceCorrection]) -> Result<usize> {
    let Some(mut cart) = stores.carts.find_by_id(cart_id).await? else { return Ok(0) };
    let applied = cart.apply_price_corrections(corrections);
    if applied > 0 {
        stores.carts.save(&cart).await?;
    }
    Ok(applied)
}
