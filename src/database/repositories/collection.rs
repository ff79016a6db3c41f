use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{Collection, DbResult};
use crate::models::{Document, Resource};

type DocumentRow<T> = (Uuid, Json<T>, DateTime<Utc>, DateTime<Utc>);

fn into_document<T>((id, Json(body), created_at, updated_at): DocumentRow<T>) -> Document<T> {
    Document {
        id,
        created_at,
        updated_at,
        body,
    }
}

/// JSONB 文档集合，表名取自 `Resource::COLLECTION`
pub struct PgCollection<T> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PgCollection<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Resource> Collection<T> for PgCollection<T> {
    async fn list(&self) -> DbResult<Vec<Document<T>>> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} ORDER BY created_at DESC",
            T::COLLECTION
        );
        let rows: Vec<DocumentRow<T>> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<Document<T>>> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE id = $1",
            T::COLLECTION
        );
        let row: Option<DocumentRow<T>> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_document))
    }

    async fn insert(&self, body: T) -> DbResult<Document<T>> {
        let sql = format!(
            "INSERT INTO {} (id, doc, created_at, updated_at) VALUES ($1, $2, NOW(), NOW()) \
             RETURNING id, doc, created_at, updated_at",
            T::COLLECTION
        );
        let row: DocumentRow<T> = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(Json(&body))
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!("Inserted {} document {}", T::COLLECTION, row.0);
        Ok(into_document(row))
    }

    async fn replace(&self, id: Uuid, body: T) -> DbResult<Option<Document<T>>> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, doc, created_at, updated_at",
            T::COLLECTION
        );
        let row: Option<DocumentRow<T>> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(&body))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_document))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::database::Store;
    use crate::models::{Club, Event, Opportunity};

    fn assert_collection<T: Resource>(_: Arc<dyn Collection<T>>) {}

    // 惰性连接池不会真正连库，只验证 Postgres 集合满足 trait 约束
    #[tokio::test]
    async fn postgres_collections_build_for_every_resource() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://alumni@localhost/alumni")
            .unwrap();

        assert_collection::<Club>(Arc::new(PgCollection::new(pool.clone())));
        assert_collection::<Event>(Arc::new(PgCollection::new(pool.clone())));
        assert_collection::<Opportunity>(Arc::new(PgCollection::new(pool.clone())));

        let store = Store::postgres(pool);
        assert_collection(store.clubs);
        assert_collection(store.opportunities);
    }
}
