//! 文档资源的通用读写流程

use uuid::Uuid;

use crate::database::Collection;
use crate::error::{AppError, AppResult};
use crate::models::{Document, Resource};

pub(crate) async fn find_or_404<T: Resource>(
    collection: &dyn Collection<T>,
    id: Uuid,
    not_found: &str,
) -> AppResult<Document<T>> {
    collection
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(not_found))
}

pub(crate) async fn create_validated<T: Resource>(
    collection: &dyn Collection<T>,
    body: T,
) -> AppResult<Document<T>> {
    body.validate().map_err(AppError::Validation)?;
    let document = collection.insert(body).await?;
    tracing::info!("Created {} document {}", T::COLLECTION, document.id);
    Ok(document)
}

/// 读取、合并补丁、校验后整体写回；并发更新以最后一次写入为准
pub(crate) async fn apply_patch<T: Resource>(
    collection: &dyn Collection<T>,
    id: Uuid,
    patch: T::Patch,
    not_found: &str,
) -> AppResult<Document<T>> {
    let mut body = find_or_404(collection, id, not_found).await?.body;
    body.apply(patch);
    body.validate().map_err(AppError::Validation)?;

    collection
        .replace(id, body)
        .await?
        .ok_or_else(|| AppError::not_found(not_found))
}

pub(crate) async fn delete_or_404<T: Resource>(
    collection: &dyn Collection<T>,
    id: Uuid,
    not_found: &str,
) -> AppResult<()> {
    if collection.delete(id).await? {
        tracing::info!("Deleted {} document {}", T::COLLECTION, id);
        Ok(())
    } else {
        Err(AppError::not_found(not_found))
    }
}
