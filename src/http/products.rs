use axum::{extract::{Path, State}, http::StatusCode, Json};
use crate::auth::AuthUser;
use crate::domain::aggregates::Product;
use crate::domain::value_objects::Lang;
use crate::services::catalog::{CategoryRequest, CategoryView, ProductRequest};
use crate::services::ProductSummary;
use crate::Result;
use super::{ApiJson, AppState};

pub async fn list_products(State(s): State<AppState>, lang: Lang) -> Result<Json<Vec<ProductSummary>>> {
    Ok(Json(s.catalog.list_products(lang).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.get_product(&id).await?))
}

pub async fn create_product(State(s): State<AppState>, user: AuthUser, ApiJson(r): ApiJson<ProductRequest>) -> Result<(StatusCode, Json<Product>)> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(s.catalog.create_product(r).await?)))
}

pub async fn update_product(State(s): State<AppState>, user: AuthUser, Path(id): Path<String>, ApiJson(r): ApiJson<ProductRequest>) -> Result<Json<Product>> {
    user.require_admin()?;
    Ok(Json(s.catalog.update_product(&id, r).await?))
}

pub async fn delete_product(State(s): State<AppState>, user: AuthUser, Path(id): Path<String>) -> Result<StatusCode> {
    user.require_admin()?;
    s.catalog.archive_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(s): State<AppState>, lang: Lang) -> Result<Json<Vec<CategoryView>>> {
    Ok(Json(s.catalog.list_categories(lang).await?))
}

pub async fn get_category(State(s): State<AppState>, lang: Lang, Path(id): Path<String>) -> Result<Json<CategoryView>> {
    Ok(Json(s.catalog.get_category(&id, lang).await?))
}

pub async fn create_category(State(s): State<AppState>, user: AuthUser, lang: Lang, ApiJson(r): ApiJson<CategoryRequest>) -> Result<(StatusCode, Json<CategoryView>)> {
    user.require_admin()?;
    Ok((StatusCode::CREATED, Json(s.catalog.create_category(r, lang).await?)))
}
