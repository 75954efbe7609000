//! Read paths for artworks, served from the live store or the demo dataset.
//!
//! Handlers obtain an `ArtworkReader` from application state; which
//! implementation they get depends on store connectivity, so no handler ever
//! branches on mode itself.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    mock_data::mock_artworks,
    models::{Artwork, ArtworkCategory, ArtworkQuery},
    repository::RepositoryState,
};

pub const DEFAULT_LATEST_ARTWORKS: usize = 6;

#[async_trait]
pub trait ArtworkReader: Send + Sync {
    async fn list(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, AppError>;

    /// Single artwork. The live store counts the fetch as a view.
    async fn detail(&self, id: Uuid) -> Result<Artwork, AppError>;

    /// Newest first.
    async fn latest(&self, limit: usize) -> Result<Vec<Artwork>, AppError>;

    /// Distinct categories in use.
    async fn categories(&self) -> Result<Vec<ArtworkCategory>, AppError>;
}

pub type ArtworkReaderState = Arc<dyn ArtworkReader>;

/// Reader over the live store.
pub struct StoreArtworkReader {
    repo: RepositoryState,
}

impl StoreArtworkReader {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ArtworkReader for StoreArtworkReader {
    async fn list(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, AppError> {
        Ok(self.repo.list_artworks(query).await?)
    }

    async fn detail(&self, id: Uuid) -> Result<Artwork, AppError> {
        self.repo
            .view_artwork(id)
            .await?
            .ok_or(AppError::NotFound("Artwork"))
    }

    async fn latest(&self, limit: usize) -> Result<Vec<Artwork>, AppError> {
        Ok(self.repo.list_artworks(&ArtworkQuery::latest(limit)).await?)
    }

    async fn categories(&self) -> Result<Vec<ArtworkCategory>, AppError> {
        Ok(self.repo.artwork_categories().await?)
    }
}

/// Read-only reader over the static demo dataset.
#[derive(Default)]
pub struct MockArtworkReader;

#[async_trait]
impl ArtworkReader for MockArtworkReader {
    async fn list(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>, AppError> {
        Ok(query.apply(mock_artworks().iter().cloned()))
    }

    async fn detail(&self, id: Uuid) -> Result<Artwork, AppError> {
        mock_artworks()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AppError::NotFound("Artwork"))
    }

    async fn latest(&self, limit: usize) -> Result<Vec<Artwork>, AppError> {
        Ok(ArtworkQuery::latest(limit).apply(mock_artworks().iter().cloned()))
    }

    async fn categories(&self) -> Result<Vec<ArtworkCategory>, AppError> {
        let mut categories: Vec<ArtworkCategory> =
            mock_artworks().iter().map(|a| a.category).collect();
        categories.sort_by_key(|c| c.as_str());
        categories.dedup();
        Ok(categories)
    }
}
