use async_trait::async_trait;
use tokio::sync::RwLock;
use super::{Document, Repository};
use crate::Result;

/// Process-local store keeping documents in insertion order.
#[derive(Debug)]
pub struct MemoryStore<T> {
    docs: RwLock<Vec<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self { Self { docs: RwLock::new(Vec::new()) } }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryStore<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        Ok(self.docs.read().await.iter().find(|d| d.doc_id() == id).cloned())
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<T>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| ids.iter().any(|id| id == d.doc_id())).cloned().collect())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<T>> {
        Ok(self.docs.read().await.iter().filter(|d| d.owner_id() == Some(owner_id)).cloned().collect())
    }

    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.docs.read().await.clone())
    }

    async fn save(&self, doc: &T) -> Result<()> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.doc_id() == doc.doc_id()) {
            Some(existing) => *existing = doc.clone(),
            None => docs.push(doc.clone()),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| d.doc_id() != id);
        Ok(docs.len() != before)
    }
}
