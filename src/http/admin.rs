//! Admin-only endpoints. Every handler checks the role first.

use axum::{extract::{Path, State}, Json};
use crate::auth::AuthUser;
use crate::domain::value_objects::Lang;
use crate::services::cart::DiscountRequest;
use crate::services::order::{PaymentUpdateRequest, StatusUpdateRequest};
use crate::services::{AnalyticsSummary, CartView, OrderView, PriceFixReport};
use crate::Result;
use super::{ApiJson, AppState};

pub async fn list_carts(State(s): State<AppState>, user: AuthUser, lang: Lang) -> Result<Json<Vec<CartView>>> {
    user.require_admin()?;
    Ok(Json(s.carts.list_all(lang).await?))
}

pub async fn fix_prices(State(s): State<AppState>, user: AuthUser) -> Result<Json<PriceFixReport>> {
    user.require_admin()?;
    Ok(Json(s.carts.fix_prices().await?))
}

pub async fn set_discount(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>, ApiJson(r): ApiJson<DiscountRequest>) -> Result<Json<CartView>> {
    user.require_admin()?;
    Ok(Json(s.carts.set_discount(&id, r, lang).await?))
}

pub async fn abandon_cart(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>) -> Result<Json<CartView>> {
    user.require_admin()?;
    Ok(Json(s.carts.abandon(&id, lang).await?))
}

pub async fn list_orders(State(s): State<AppState>, user: AuthUser, lang: Lang) -> Result<Json<Vec<OrderView>>> {
    user.require_admin()?;
    Ok(Json(s.orders.list_all(lang).await?))
}

pub async fn update_order_status(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>, ApiJson(r): ApiJson<StatusUpdateRequest>) -> Result<Json<OrderView>> {
    user.require_admin()?;
    Ok(Json(s.orders.update_status(&id, r, lang).await?))
}

pub async fn update_payment(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>, ApiJson(r): ApiJson<PaymentUpdateRequest>) -> Result<Json<OrderView>> {
    user.require_admin()?;
    Ok(Json(s.orders.update_payment(&id, r, lang).await?))
}

pub async fn analytics(State(s): State<AppState>, user: AuthUser) -> Result<Json<AnalyticsSummary>> {
    user.require_admin()?;
    Ok(Json(s.analytics.summary().await?))
}
