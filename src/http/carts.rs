use axum::{extract::{Path, State}, http::StatusCode, Json};
use crate::auth::AuthUser;
use crate::domain::value_objects::Lang;
use crate::services::{AddItemRequest, CartView, UpdateItemRequest};
use crate::Result;
use super::{ApiJson, AppState};

pub async fn get_cart(State(s): State<AppState>, user: AuthUser, lang: Lang) -> Result<Json<CartView>> {
    Ok(Json(s.carts.view(&user.user_id, lang).await?))
}

pub async fn add_item(State(s): State<AppState>, user: AuthUser, lang: Lang, ApiJson(r): ApiJson<AddItemRequest>) -> Result<(StatusCode, Json<CartView>)> {
    Ok((StatusCode::CREATED, Json(s.carts.add_item(&user.user_id, r, lang).await?)))
}

pub async fn update_item(
    State(s): State<AppState>,
    user: AuthUser,
    lang: Lang,
    Path((product_id, sku)): Path<(String, String)>,
    ApiJson(r): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    Ok(Json(s.carts.update_item(&user.user_id, &product_id, &sku, r, lang).await?))
}

pub async fn remove_item(State(s): State<AppState>, user: AuthUser, lang: Lang, Path((product_id, sku)): Path<(String, String)>) -> Result<Json<CartView>> {
    Ok(Json(s.carts.remove_item(&user.user_id, &product_id, &sku, lang).await?))
}

pub async fn delete_cart(State(s): State<AppState>, user: AuthUser) -> Result<StatusCode> {
    s.carts.delete(&user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
