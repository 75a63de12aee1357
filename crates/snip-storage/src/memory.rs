use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snip_core::repository::{ReadRepository, Repository, Result};
use snip_core::{ShortenedUrl, StorageError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory implementation of the repository contract using DashMap.
///
/// Ids are handed out from an atomic counter starting at 1. The URL index
/// doubles as the uniqueness constraint: `save` claims the URL through a
/// DashMap entry, so two concurrent saves of the same URL cannot both win.
#[derive(Debug)]
pub struct InMemoryRepository {
    next_id: AtomicU64,
    by_id: DashMap<u64, String>,
    by_url: DashMap<String, u64>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            by_id: DashMap::new(),
            by_url: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            by_id: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_id(&self, id: u64) -> Result<Option<ShortenedUrl>> {
        Ok(self
            .by_id
            .get(&id)
            .map(|url| ShortenedUrl::new(id, url.value().as_str())))
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortenedUrl>> {
        let Some(id) = self.by_url.get(original_url).map(|id| *id) else {
            return Ok(None);
        };
        Ok(Some(ShortenedUrl::new(id, original_url)))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, original_url: &str) -> Result<ShortenedUrl> {
        match self.by_url.entry(original_url.to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(original_url.to_owned())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                // by_id first: a URL visible in the index always resolves by id.
                self.by_id.insert(id, original_url.to_owned());
                slot.insert(id);
                trace!(id, "Saved record in memory");
                Ok(ShortenedUrl::new(id, original_url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn save_assigns_increasing_ids_from_one() {
        let repo = InMemoryRepository::new();

        let a = repo.save("https://a.example").await.unwrap();
        let b = repo.save("https://b.example").await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.original_url, "https://b.example");
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn find_by_id_and_url() {
        let repo = InMemoryRepository::new();
        let saved = repo.save("https://example.org/page").await.unwrap();

        assert_eq!(repo.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));
        assert_eq!(
            repo.find_by_original_url("https://example.org/page")
                .await
                .unwrap(),
            Some(saved)
        );
    }

    #[tokio::test]
    async fn lookups_miss_on_unknown_keys() {
        let repo = InMemoryRepository::new();
        repo.save("https://example.org").await.unwrap();

        assert!(repo.find_by_id(0).await.unwrap().is_none());
        assert!(repo.find_by_id(42).await.unwrap().is_none());
        assert!(repo
            .find_by_original_url("https://example.org/")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_conflicts_on_duplicate_url() {
        let repo = InMemoryRepository::new();
        repo.save("https://example.org").await.unwrap();

        let err = repo.save("https://example.org").await.unwrap_err();

        assert!(matches!(err, StorageError::Conflict(url) if url == "https://example.org"));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_saves_of_same_url_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.save("https://race.example").await })
            })
            .collect();

        let mut won = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(StorageError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(won, 1);
        assert_eq!(conflicts, 31);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_saves_of_distinct_urls_get_distinct_ids() {
        let repo = Arc::new(InMemoryRepository::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.save(&format!("https://{i}.example")).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap().id);
        }

        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(|id| (1..=64).contains(id)));
    }
}
