use crate::support::*;
use async_trait::async_trait;
use mapkit_core::{Capability, HistoryKey};
use mapkit_history::{Changeset, ChangesetError, ChangesetResult, HistoryConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Yields while "busy" and fails if another operation overlaps it.
struct Exclusive {
    busy: Arc<AtomicBool>,
    completed: Arc<AtomicUsize>,
}

impl Exclusive {
    async fn run(&self) -> ChangesetResult {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ChangesetError::StateDrift("overlapping operation".to_string()));
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        self.busy.store(false, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Changeset for Exclusive {
    fn name(&self) -> &str {
        "Exclusive"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.run().await
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.run().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_key_operations_are_serialized() {
    let h = harness(HistoryConfig::default());
    let busy = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));
    let key = HistoryKey::MainMap;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = h.service.clone();
        let changeset = Exclusive {
            busy: busy.clone(),
            completed: completed.clone(),
        };
        tasks.push(tokio::spawn(async move {
            service.execute(key, changeset.boxed()).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(h.service.depths(key).await, (8, 0));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = h.service.clone();
        tasks.push(tokio::spawn(async move { service.undo(key).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(completed.load(Ordering::SeqCst), 16);
    assert_eq!(h.service.depths(key).await, (0, 8));
    assert!(!h.service.can_undo(key));
    assert!(h.service.can_redo(key));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_other_keys_are_not_blocked() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let busy = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));

    let slow = {
        let service = h.service.clone();
        let changeset = Exclusive {
            busy: busy.clone(),
            completed: completed.clone(),
        };
        tokio::spawn(async move { service.execute(HistoryKey::Layout, changeset.boxed()).await })
    };

    for i in 0..5 {
        h.service
            .execute(HistoryKey::MainMap, Insert::new(&doc, &i.to_string()).boxed())
            .await
            .unwrap();
    }

    slow.await.unwrap().unwrap();
    assert_eq!(h.service.depths(HistoryKey::MainMap).await, (5, 0));
    assert_eq!(h.service.depths(HistoryKey::Layout).await, (1, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clean_on_fresh_key_never_hides_a_concurrent_edit() {
    for _ in 0..20 {
        let h = harness(HistoryConfig::default());
        let doc = names();
        let key = HistoryKey::Export;

        let cleaner = {
            let service = h.service.clone();
            tokio::spawn(async move { service.clean(Some(key)).await })
        };
        let editor = {
            let service = h.service.clone();
            let changeset = Insert::new(&doc, "edit").boxed();
            tokio::spawn(async move { service.execute(key, changeset).await })
        };
        cleaner.await.unwrap();
        editor.await.unwrap().unwrap();

        // Whichever ran last, the published value matches the stacks
        let (undo, redo) = h.service.depths(key).await;
        assert_eq!(h.service.capability(key), Capability::from_depths(undo, redo));
    }
}
