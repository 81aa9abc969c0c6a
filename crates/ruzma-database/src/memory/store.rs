//! In-memory milestone store backed by a `DashMap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use ruzma_core::result::AppResult;
use ruzma_core::types::{MilestoneId, PageRequest, PageResponse, ProjectId};
use ruzma_entity::milestone::{CreateMilestone, Milestone};

use crate::store::MilestoneStore;

#[derive(Debug)]
struct Entry {
    seq: u64,
    milestone: Milestone,
}

/// Milestone store held in process memory.
///
/// Compare-and-set runs under the map's shard lock, so it is atomic with
/// respect to other writers on the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryMilestoneStore {
    entries: Arc<DashMap<MilestoneId, Entry>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryMilestoneStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a milestone as-is, raw deliverable field included.
    pub fn insert(&self, milestone: Milestone) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(milestone.id, Entry { seq, milestone });
    }

    /// Number of stored milestones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted(&self, filter: impl Fn(&Milestone) -> bool) -> Vec<Milestone> {
        let mut found: Vec<(u64, Milestone)> = self
            .entries
            .iter()
            .filter(|e| filter(&e.milestone))
            .map(|e| (e.seq, e.milestone.clone()))
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, m)| m).collect()
    }
}

#[async_trait]
impl MilestoneStore for MemoryMilestoneStore {
    async fn find_by_id(&self, id: MilestoneId) -> AppResult<Option<Milestone>> {
        Ok(self.entries.get(&id).map(|e| e.milestone.clone()))
    }

    async fn find_by_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Milestone>> {
        let all = self.sorted(|m| m.project_id == project_id);
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn create(&self, data: &CreateMilestone) -> AppResult<Milestone> {
        let now = Utc::now();
        let milestone = Milestone {
            id: MilestoneId::new(),
            project_id: data.project_id,
            title: data.title.clone(),
            description: data.description.clone(),
            price: data.price,
            due_date: data.due_date,
            deliverable_link: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(milestone.clone());
        Ok(milestone)
    }

    async fn compare_and_set_deliverable(
        &self,
        id: MilestoneId,
        expected: Option<&str>,
        replacement: Option<&str>,
    ) -> AppResult<bool> {
        let Some(mut entry) = self.entries.get_mut(&id) else {
            return Ok(false);
        };
        if entry.milestone.deliverable_link.as_deref() != expected {
            debug!(milestone_id = %id, "Deliverable compare-and-set lost");
            return Ok(false);
        }
        entry.milestone.deliverable_link = replacement.map(str::to_string);
        entry.milestone.updated_at = Utc::now();
        Ok(true)
    }

    async fn find_with_deliverable(&self) -> AppResult<Vec<Milestone>> {
        Ok(self.sorted(|m| m.deliverable_link.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_milestone(project_id: ProjectId, title: &str) -> CreateMilestone {
        CreateMilestone {
            project_id,
            title: title.to_string(),
            description: None,
            price: Some(250.0),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_with_empty_field() {
        let store = MemoryMilestoneStore::new();
        let created = store
            .create(&new_milestone(ProjectId::new(), "Logo"))
            .await
            .unwrap();
        assert!(created.deliverable_link.is_none());

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Logo");
    }

    #[tokio::test]
    async fn test_compare_and_set() {
        let store = MemoryMilestoneStore::new();
        let m = store
            .create(&new_milestone(ProjectId::new(), "Site"))
            .await
            .unwrap();

        assert!(
            store
                .compare_and_set_deliverable(m.id, None, Some("a"))
                .await
                .unwrap()
        );
        // Stale expectation loses.
        assert!(
            !store
                .compare_and_set_deliverable(m.id, None, Some("b"))
                .await
                .unwrap()
        );
        assert!(
            store
                .compare_and_set_deliverable(m.id, Some("a"), Some("c"))
                .await
                .unwrap()
        );

        let found = store.find_by_id(m.id).await.unwrap().unwrap();
        assert_eq!(found.deliverable_link.as_deref(), Some("c"));

        assert!(
            !store
                .compare_and_set_deliverable(MilestoneId::new(), None, Some("x"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_find_by_project_pages_in_creation_order() {
        let store = MemoryMilestoneStore::new();
        let project = ProjectId::new();
        for title in ["one", "two", "three"] {
            store.create(&new_milestone(project, title)).await.unwrap();
        }
        store
            .create(&new_milestone(ProjectId::new(), "elsewhere"))
            .await
            .unwrap();

        let page = store
            .find_by_project(project, &PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total_items, 3);
        let titles: Vec<_> = page.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["one", "two"]);
        assert!(page.has_next);
    }
}
