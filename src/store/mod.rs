//! Document persistence.
//!
//! Every aggregate is stored whole as one document. `save` replaces the
//! document; there is no cross-document transaction and concurrent writers
//! to the same document are last-write-wins.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use crate::domain::aggregates::{Cart, Category, Order, Product};
use crate::Result;

pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const COLLECTION: &'static str;
    fn doc_id(&self) -> &str;
    /// Owning user, for collections queried per user.
    fn owner_id(&self) -> Option<&str> { None }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";
    fn doc_id(&self) -> &str { &self.id }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";
    fn doc_id(&self) -> &str { &self.id }
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";
    fn doc_id(&self) -> &str { self.id() }
    fn owner_id(&self) -> Option<&str> { Some(self.user_id()) }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";
    fn doc_id(&self) -> &str { self.id() }
    fn owner_id(&self) -> Option<&str> { Some(self.user_id()) }
}

#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;
    /// Documents for the given ids; missing ids are skipped.
    async fn find_many(&self, ids: &[String]) -> Result<Vec<T>>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<T>>;
    async fn list(&self) -> Result<Vec<T>>;
    /// Inserts or fully replaces the document.
    async fn save(&self, doc: &T) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// One repository per collection.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn Repository<Product>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub carts: Arc<dyn Repository<Cart>>,
    pub orders: Arc<dyn Repository<Order>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(MemoryStore::<Product>::default()),
            categories: Arc::new(MemoryStore::<Category>::default()),
            carts: Arc::new(MemoryStore::<Cart>::default()),
            orders: Arc::new(MemoryStore::<Order>::default()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            products: Arc::new(PgStore::<Product>::new(pool.clone())),
            categories: Arc::new(PgStore::<Category>::new(pool.clone())),
            carts: Arc::new(PgStore::<Cart>::new(pool.clone())),
            orders: Arc::new(PgStore::<Order>::new(pool)),
        }
    }

    /// Connects and migrates when a database URL is configured, otherwise
    /// falls back to process-local storage.
    pub async fn connect(database_url: Option<&str>, max_connections: u32) -> Result<Self> {
        match database_url {
            Some(url) => {
                let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!(max_connections, "connected to postgres document store");
                Ok(Self::postgres(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                Ok(Self::in_memory())
            }
        }
    }
}
