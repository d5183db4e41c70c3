use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use std::marker::PhantomData;
use super::{Document, Repository};
use crate::Result;

/// JSONB document store; all collections share the `documents` table.
pub struct PgStore<T> {
    pool: PgPool,
    _doc: PhantomData<fn() -> T>,
}

impl<T> PgStore<T> {
    pub fn new(pool: PgPool) -> Self { Self { pool, _doc: PhantomData } }
}

#[async_trait]
impl<T: Document> Repository<T> for PgStore<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        let row = sqlx::query_as::<_, (Json<T>,)>("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(doc),)| doc))
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, (Json<T>,)>("SELECT body FROM documents WHERE collection = $1 AND id = ANY($2) ORDER BY seq")
            .bind(T::COLLECTION).bind(ids).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(doc),)| doc).collect())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, (Json<T>,)>("SELECT body FROM documents WHERE collection = $1 AND owner_id = $2 ORDER BY seq")
            .bind(T::COLLECTION).bind(owner_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(doc),)| doc).collect())
    }

    async fn list(&self) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, (Json<T>,)>("SELECT body FROM documents WHERE collection = $1 ORDER BY seq")
            .bind(T::COLLECTION).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(doc),)| doc).collect())
    }

    async fn save(&self, doc: &T) -> Result<()> {
        sqlx::query("INSERT INTO documents (collection, id, owner_id, body, updated_at) VALUES ($1, $2, $3, $4, NOW()) ON CONFLICT (collection, id) DO UPDATE SET owner_id = EXCLUDED.owner_id, body = EXCLUDED.body, updated_at = NOW()")
            .bind(T::COLLECTION).bind(doc.doc_id()).bind(doc.owner_id()).bind(Json(doc))
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let done = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION).bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }
}
