use crate::error::AppError;
use crate::model::Beer;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for beer records.
///
/// `save` owns the server-managed columns: it assigns `id` and `created_date` on insert,
/// stores `version = 1` on insert and increments it on every update, and stamps
/// `last_modified_date` on each write. The id of an existing record never changes.
///
/// A UPC identifies one beer: saving a record whose `upc` is already held by a different
/// id fails with `AppError::Conflict` and leaves the store unchanged.
#[async_trait]
pub trait BeerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Beer>, AppError>;

    async fn save(&self, beer: Beer) -> Result<Beer, AppError>;

    /// Readiness check against the backing store.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
