use async_trait::async_trait;

use crate::error::StorageError;

/// Basic keyed persistence for one entity type.
#[async_trait]
pub trait Repository<T> {
    /// Inserts or replaces the entity.
    async fn save(&self, entity: &T) -> Result<(), StorageError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, StorageError>;
    async fn find_all(&self) -> Result<Vec<T>, StorageError>;
    /// Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;
}
