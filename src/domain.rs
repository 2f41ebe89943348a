use crate::errors::RepoError;
use crate::models::{NewTrophy, Trophy};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining operations for storing and retrieving trophy records.
#[async_trait]
pub trait TrophyRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Persists a new trophy, assigning its id and creation timestamp.
    /// Returns the stored record.
    async fn create(&self, new: NewTrophy) -> Result<Trophy, RepoError>;

    /// Lists all trophies, newest first by creation timestamp.
    /// An empty store yields an empty Vec, not an error.
    async fn list_all(&self) -> Result<Vec<Trophy>, RepoError>;

    /// Removes and returns the trophy with the given id.
    /// Returns `RepoError::NotFound` if no such record exists.
    async fn delete_by_id(&self, id: Uuid) -> Result<Trophy, RepoError>;
}
