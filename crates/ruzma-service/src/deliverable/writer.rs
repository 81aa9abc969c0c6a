//! Compare-and-swap writes of the deliverable field.

use std::sync::Arc;

use tracing::{debug, warn};

use ruzma_core::config::DeliverableConfig;
use ruzma_core::error::AppError;
use ruzma_core::result::AppResult;
use ruzma_core::types::MilestoneId;
use ruzma_database::MilestoneStore;
use ruzma_entity::milestone::Milestone;

/// What a change function wants done with the field it was shown.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange<T> {
    /// Store `raw` and hand back `output`.
    Write {
        /// New raw field value.
        raw: Option<String>,
        /// Value returned to the caller once the write lands.
        output: T,
    },
    /// Leave the field alone.
    Keep(T),
}

/// Applies read-modify-write changes to a milestone's deliverable field.
///
/// Each attempt reads the milestone, runs the change function against the
/// current value and swaps the result in only if the stored value is still
/// the one that was read. A lost race re-reads and re-runs the change, so
/// checks such as the revision limit always see fresh data.
#[derive(Debug, Clone)]
pub struct DeliverableWriter {
    store: Arc<dyn MilestoneStore>,
    retry_attempts: u32,
}

impl DeliverableWriter {
    /// Creates a writer that retries `config.write_retry_attempts` times.
    pub fn new(store: Arc<dyn MilestoneStore>, config: &DeliverableConfig) -> Self {
        Self {
            store,
            retry_attempts: config.write_retry_attempts,
        }
    }

    /// Loads a milestone or fails with `NotFound`.
    pub async fn load(&self, id: MilestoneId) -> AppResult<Milestone> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Milestone {id} not found")))
    }

    /// Runs `change` against the current field until its result is stored.
    ///
    /// Errors returned by `change` abort immediately. After the retry budget
    /// is spent the call fails with `Conflict`.
    pub async fn update<T, F>(&self, id: MilestoneId, mut change: F) -> AppResult<T>
    where
        F: FnMut(&Milestone) -> AppResult<FieldChange<T>> + Send,
        T: Send,
    {
        let attempts = self.retry_attempts.saturating_add(1);

        for attempt in 1..=attempts {
            let milestone = self.load(id).await?;
            let current = milestone.deliverable_link.as_deref();

            let (raw, output) = match change(&milestone)? {
                FieldChange::Keep(output) => return Ok(output),
                FieldChange::Write { raw, output } => (raw, output),
            };
            if raw.as_deref() == current {
                return Ok(output);
            }

            if self
                .store
                .compare_and_set_deliverable(id, current, raw.as_deref())
                .await?
            {
                debug!(milestone_id = %id, attempt, "Deliverable field written");
                return Ok(output);
            }

            warn!(
                milestone_id = %id,
                attempt,
                "Deliverable field changed concurrently, retrying"
            );
            tokio::task::yield_now().await;
        }

        Err(AppError::conflict(format!(
            "Milestone {id} was modified concurrently, please retry"
        )))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use ruzma_core::error::ErrorKind;
    use ruzma_core::types::{PageRequest, PageResponse, ProjectId};
    use ruzma_database::memory::MemoryMilestoneStore;
    use ruzma_entity::milestone::CreateMilestone;

    /// Store that lets another writer slip in before the next `n` swaps.
    #[derive(Debug)]
    pub(crate) struct InterferingStore {
        pub(crate) inner: MemoryMilestoneStore,
        remaining: AtomicU32,
        rival: fn(Option<&str>) -> Option<String>,
    }

    impl InterferingStore {
        pub(crate) fn new(n: u32, rival: fn(Option<&str>) -> Option<String>) -> Self {
            Self {
                inner: MemoryMilestoneStore::new(),
                remaining: AtomicU32::new(n),
                rival,
            }
        }
    }

    #[async_trait]
    impl MilestoneStore for InterferingStore {
        async fn find_by_id(&self, id: MilestoneId) -> AppResult<Option<Milestone>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_project(
            &self,
            project_id: ProjectId,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Milestone>> {
            self.inner.find_by_project(project_id, page).await
        }

        async fn create(&self, data: &CreateMilestone) -> AppResult<Milestone> {
            self.inner.create(data).await
        }

        async fn compare_and_set_deliverable(
            &self,
            id: MilestoneId,
            expected: Option<&str>,
            replacement: Option<&str>,
        ) -> AppResult<bool> {
            let interfere = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if interfere {
                let rival = (self.rival)(expected);
                self.inner
                    .compare_and_set_deliverable(id, expected, rival.as_deref())
                    .await?;
            }
            self.inner
                .compare_and_set_deliverable(id, expected, replacement)
                .await
        }

        async fn find_with_deliverable(&self) -> AppResult<Vec<Milestone>> {
            self.inner.find_with_deliverable().await
        }
    }

    pub(crate) fn draft() -> CreateMilestone {
        CreateMilestone {
            project_id: ProjectId::new(),
            title: "Brand kit".to_string(),
            description: None,
            price: None,
            due_date: None,
        }
    }

    fn append_x(raw: Option<&str>) -> Option<String> {
        Some(format!("{}x", raw.unwrap_or_default()))
    }

    fn config(retries: u32) -> DeliverableConfig {
        DeliverableConfig {
            write_retry_attempts: retries,
        }
    }

    #[tokio::test]
    async fn test_update_retries_against_fresh_value() {
        let store = Arc::new(InterferingStore::new(2, append_x));
        let m = store.create(&draft()).await.unwrap();
        let writer = DeliverableWriter::new(store.clone(), &config(5));

        let mut seen = Vec::new();
        let written = writer
            .update(m.id, |m| {
                let current = m.deliverable_link.clone().unwrap_or_default();
                seen.push(current.clone());
                Ok(FieldChange::Write {
                    raw: Some(format!("{current}!")),
                    output: current,
                })
            })
            .await
            .unwrap();

        assert_eq!(seen, ["", "x", "xx"]);
        assert_eq!(written, "xx");
        let stored = store.find_by_id(m.id).await.unwrap().unwrap();
        assert_eq!(stored.deliverable_link.as_deref(), Some("xx!"));
    }

    #[tokio::test]
    async fn test_update_gives_up_with_conflict() {
        let store = Arc::new(InterferingStore::new(u32::MAX, append_x));
        let m = store.create(&draft()).await.unwrap();
        let writer = DeliverableWriter::new(store, &config(2));

        let mut calls = 0;
        let err = writer
            .update(m.id, |_| {
                calls += 1;
                Ok(FieldChange::Write {
                    raw: Some("mine".to_string()),
                    output: (),
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_keep_and_unchanged_skip_the_write() {
        let store = Arc::new(InterferingStore::new(u32::MAX, append_x));
        let m = store.create(&draft()).await.unwrap();
        let writer = DeliverableWriter::new(store, &config(0));

        let kept = writer.update(m.id, |_| Ok(FieldChange::Keep(7))).await.unwrap();
        assert_eq!(kept, 7);

        let same = writer
            .update(m.id, |m| {
                Ok(FieldChange::Write {
                    raw: m.deliverable_link.clone(),
                    output: 8,
                })
            })
            .await
            .unwrap();
        assert_eq!(same, 8);
    }

    #[tokio::test]
    async fn test_change_error_aborts_and_missing_is_not_found() {
        let store = Arc::new(MemoryMilestoneStore::new());
        let m = store.create(&draft()).await.unwrap();
        let writer = DeliverableWriter::new(store, &config(5));

        let err = writer
            .update(m.id, |_| Err::<FieldChange<()>, _>(AppError::policy("no")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Policy);

        let err = writer
            .update(MilestoneId::new(), |_| Ok(FieldChange::Keep(())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
