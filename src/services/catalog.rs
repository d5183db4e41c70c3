//! Catalog service: products and categories.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use crate::domain::aggregates::{Category, Product, Variant};
use crate::domain::value_objects::{Lang, LocalizedText};
use crate::publisher::EventPublisher;
use crate::store::Stores;
use crate::{Result, ShopError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub category_id: Option<String>,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: LocalizedText,
    pub parent_id: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Localized listing row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    /// Lowest effective option price.
    pub min_price: Decimal,
    pub option_count: usize,
    pub images: Vec<String>,
}

impl ProductSummary {
    fn new(p: &Product, lang: Lang) -> Self {
        let min_price = p.variants.iter().flat_map(|v| v.options.iter()).map(|o| o.effective_price()).min().unwrap_or_default();
        Self {
            id: p.id.clone(), name: p.name.localize(lang), category_id: p.category_id.clone(),
            min_price, option_count: p.option_count(), images: p.images.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryView {
    fn new(c: &Category, lang: Lang) -> Self {
        Self { id: c.id.clone(), name: c.name.localize(lang), slug: c.slug.clone(), parent_id: c.parent_id.clone(), image_url: c.image_url.clone() }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    stores: Stores,
    publisher: EventPublisher,
}

impl CatalogService {
    pub fn new(stores: Stores, publisher: EventPublisher) -> Self { Self { stores, publisher } }

    /// Active products only.
    pub async fn list_products(&self, lang: Lang) -> Result<Vec<ProductSummary>> {
        let products = self.stores.products.list().await?;
        Ok(products.iter().filter(|p| p.is_active()).map(|p| ProductSummary::new(p, lang)).collect())
    }

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        self.stores.products.find_by_id(id).await?.ok_or_else(|| ShopError::not_found("Product"))
    }

    pub async fn create_product(&self, req: ProductRequest) -> Result<Product> {
        self.ensure_category(req.category_id.as_deref()).await?;
        let mut product = Product::create(req.name, req.variants)?;
        product.description = req.description;
        product.category_id = req.category_id;
        product.images = req.images;
        self.save(&mut product).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, req: ProductRequest) -> Result<Product> {
        self.ensure_category(req.category_id.as_deref()).await?;
        let mut product = self.get_product(id).await?;
        let mut changes = product.clone();
        changes.name = req.name;
        changes.description = req.description;
        changes.category_id = req.category_id;
        changes.variants = req.variants;
        changes.images = req.images;
        product.update(changes)?;
        self.save(&mut product).await?;
        Ok(product)
    }

    /// Soft delete: archived products stay resolvable for existing carts and orders.
    pub async fn archive_product(&self, id: &str) -> Result<()> {
        let mut product = self.get_product(id).await?;
        product.archive();
        self.save(&mut product).await
    }

    pub async fn list_categories(&self, lang: Lang) -> Result<Vec<CategoryView>> {
        let mut views: Vec<_> = self.stores.categories.list().await?.iter().map(|c| CategoryView::new(c, lang)).collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(views)
    }

    pub async fn get_category(&self, id: &str, lang: Lang) -> Result<CategoryView> {
        let category = self.stores.categories.find_by_id(id).await?.ok_or_else(|| ShopError::not_found("Category"))?;
        Ok(CategoryView::new(&category, lang))
    }

    pub async fn create_category(&self, req: CategoryRequest, lang: Lang) -> Result<CategoryView> {
        req.validate()?;
        if req.name.is_blank() { return Err(ShopError::validation("category name is required")); }
        self.ensure_category(req.parent_id.as_deref()).await?;
        let category = Category::create(req.name, req.parent_id, req.image_url);
        self.stores.categories.save(&category).await?;
        Ok(CategoryView::new(&category, lang))
    }

    async fn ensure_category(&self, id: Option<&str>) -> Result<()> {
        let Some(id) = id else { return Ok(()) };
        if self.stores.categories.find_by_id(id).await?.is_none() {
            return Err(ShopError::validation(format!("unknown category {id}")));
        }
        Ok(())
    }

    async fn save(&self, product: &mut Product) -> Result<()> {
        self.stores.products.save(product).await?;
        self.publisher.publish_all(product.take_events()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::option;
    use rust_decimal_macros::dec;

    fn request(skus: &[(&str, Decimal)]) -> ProductRequest {
        ProductRequest {
            name: LocalizedText::bilingual("Laptop", "حاسوب"),
            description: LocalizedText::Absent,
            category_id: None,
            variants: vec![Variant { name: "RAM".into(), options: skus.iter().map(|(s, p)| option(s, *p, None)).collect() }],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let svc = CatalogService::new(Stores::in_memory(), EventPublisher::default());
        let p = svc.create_product(request(&[("L-8", dec!(900)), ("L-16", dec!(1100))])).await.unwrap();

        let listed = svc.list_products(Lang::Ar).await.unwrap();
        assert_eq!(listed[0].name, "حاسوب");
        assert_eq!(listed[0].min_price, dec!(900));

        let updated = svc.update_product(&p.id, request(&[("L-32", dec!(1500))])).await.unwrap();
        assert_eq!(updated.id, p.id);
        assert!(updated.resolve("L-8").is_none());

        svc.archive_product(&p.id).await.unwrap();
        assert!(svc.list_products(Lang::En).await.unwrap().is_empty());
        assert!(svc.get_product(&p.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_product_validation() {
        let svc = CatalogService::new(Stores::in_memory(), EventPublisher::default());
        let dup = svc.create_product(request(&[("X", dec!(1)), ("X", dec!(2))])).await;
        assert!(matches!(dup, Err(ShopError::Validation(_))));
        let mut orphan = request(&[("X", dec!(1))]);
        orphan.category_id = Some("missing".into());
        assert!(matches!(svc.create_product(orphan).await, Err(ShopError::Validation(_))));

        let blank_sku = serde_json::json!({"name": "Laptop", "variants": [{"name": "RAM", "options": [{"sku": " ", "price": 5}]}]});
        assert!(serde_json::from_value::<ProductRequest>(blank_sku).is_err());
    }

    #[tokio::test]
    async fn test_categories() {
        let svc = CatalogService::new(Stores::in_memory(), EventPublisher::default());
        let req = CategoryRequest { name: LocalizedText::bilingual("Phones", "هواتف"), parent_id: None, image_url: None };
        let c = svc.create_category(req, Lang::En).await.unwrap();
        assert_eq!(c.slug, "phones");
        assert_eq!(svc.get_category(&c.id, Lang::Ar).await.unwrap().name, "هواتف");
        let blank = CategoryRequest { name: LocalizedText::Absent, parent_id: None, image_url: None };
        assert!(svc.create_category(blank, Lang::En).await.is_err());
    }
}
