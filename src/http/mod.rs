//! HTTP surface: shared state, extractors and the router.

mod admin;
mod carts;
mod orders;
mod products;

use axum::{async_trait, extract::{FromRequest, FromRequestParts, Request}, http::{header, request::Parts}, routing::{get, patch, post, put}, Json, Router};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::auth::JwtKeys;
use crate::domain::value_objects::Lang;
use crate::pricing::DisplayPricing;
use crate::publisher::EventPublisher;
use crate::services::{AnalyticsService, CartService, CatalogService, OrderService};
use crate::store::Stores;
use crate::ShopError;

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtKeys,
    pub catalog: CatalogService,
    pub carts: CartService,
    pub orders: OrderService,
    pub analytics: AnalyticsService,
}

impl AppState {
    pub fn new(stores: Stores, publisher: EventPublisher, display: DisplayPricing, jwt: JwtKeys) -> Self {
        Self {
            jwt,
            catalog: CatalogService::new(stores.clone(), publisher.clone()),
            carts: CartService::new(stores.clone(), publisher.clone(), display),
            orders: OrderService::new(stores.clone(), publisher, display),
            analytics: AnalyticsService::new(stores),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.headers.get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Lang::from_accept_language)
            .unwrap_or_default())
    }
}

/// `Json` body extractor whose rejections render as `ShopError`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ShopError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/categories", get(products::list_categories).post(products::create_category))
        .route("/categories/:id", get(products::get_category))
        .route("/cart", get(carts::get_cart).delete(carts::delete_cart))
        .route("/cart/items", post(carts::add_item))
        .route("/cart/items/:product_id/:sku", patch(carts::update_item).delete(carts::remove_item))
        .route("/orders", get(orders::list_orders).post(orders::checkout))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/cancel", post(orders::cancel_order))
        .route("/admin/carts", get(admin::list_carts))
        .route("/admin/carts/fix-prices", post(admin::fix_prices))
        .route("/admin/carts/:id/discount", put(admin::set_discount))
        .route("/admin/carts/:id/abandon", post(admin::abandon_cart))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/:id/status", put(admin::update_order_status))
        .route("/admin/orders/:id/payment", put(admin::update_payment))
        .route("/admin/analytics", get(admin::analytics));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "shop-admin"})) }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
