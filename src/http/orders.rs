use axum::{extract::{Path, State}, http::StatusCode, Json};
use crate::auth::AuthUser;
use crate::domain::value_objects::Lang;
use crate::services::{CheckoutRequest, OrderView};
use crate::Result;
use super::{ApiJson, AppState};

pub async fn checkout(State(s): State<AppState>, user: AuthUser, lang: Lang, ApiJson(r): ApiJson<CheckoutRequest>) -> Result<(StatusCode, Json<OrderView>)> {
    Ok((StatusCode::CREATED, Json(s.orders.checkout(&user.user_id, r, lang).await?)))
}

pub async fn list_orders(State(s): State<AppState>, user: AuthUser, lang: Lang) -> Result<Json<Vec<OrderView>>> {
    Ok(Json(s.orders.list_for_user(&user.user_id, lang).await?))
}

pub async fn get_order(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>) -> Result<Json<OrderView>> {
    Ok(Json(s.orders.get(&user, &id, lang).await?))
}

pub async fn cancel_order(State(s): State<AppState>, user: AuthUser, lang: Lang, Path(id): Path<String>) -> Result<Json<OrderView>> {
    Ok(Json(s.orders.cancel(&user, &id, lang).await?))
}
