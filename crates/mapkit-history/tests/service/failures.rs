use crate::support::*;
use mapkit_core::{AppEvent, HistoryEvent, HistoryKey, HistoryOperation};
use mapkit_history::{Changeset, ChangesetError, HistoryConfig, HistoryError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn failures(h: &Harness) -> Vec<(HistoryKey, HistoryOperation)> {
    h.events
        .lock()
        .iter()
        .filter_map(|event| match event {
            AppEvent::History(HistoryEvent::OperationFailed { key, operation, .. }) => {
                Some((*key, *operation))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_failed_undo_preserves_stack() {
    let h = harness(HistoryConfig::default());
    let broken = Arc::new(AtomicBool::new(false));
    let key = HistoryKey::Layout;

    h.service
        .execute(key, Fragile { broken: broken.clone() }.boxed())
        .await
        .unwrap();
    broken.store(true, Ordering::SeqCst);

    let before = h.service.depths(key).await;
    let err = h.service.undo(key).await.unwrap_err();
    assert!(matches!(
        err,
        HistoryError::ChangesetUndoFailed {
            source: ChangesetError::StateDrift(_),
            ..
        }
    ));
    assert_eq!(h.service.depths(key).await, before);
    assert!(h.service.can_undo(key));
    assert!(!h.service.can_redo(key));
    assert_eq!(failures(&h), vec![(key, HistoryOperation::Undo)]);

    // Once the document is consistent again the same changeset can be undone
    broken.store(false, Ordering::SeqCst);
    h.service.undo(key).await.unwrap();
    assert_eq!(h.service.depths(key).await, (0, 1));
}

#[tokio::test]
async fn test_failed_redo_preserves_stack() {
    let h = harness(HistoryConfig::default());
    let broken = Arc::new(AtomicBool::new(false));
    let key = HistoryKey::SharedViews;

    h.service
        .execute(key, Fragile { broken: broken.clone() }.boxed())
        .await
        .unwrap();
    h.service.undo(key).await.unwrap();
    broken.store(true, Ordering::SeqCst);

    let err = h.service.redo(key).await.unwrap_err();
    assert!(matches!(err, HistoryError::ChangesetApplyFailed { .. }));
    assert_eq!(h.service.depths(key).await, (0, 1));
    assert!(h.service.can_redo(key));
}

#[tokio::test]
async fn test_failed_execute_records_nothing() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let key = HistoryKey::MainMap;

    h.service.execute(key, Insert::new(&doc, "a").boxed()).await.unwrap();
    h.service.undo(key).await.unwrap();

    let err = h
        .service
        .execute(key, Rename::new(&doc, "missing", "x").boxed())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HistoryError::ChangesetApplyFailed {
            source: ChangesetError::TargetNotFound { .. },
            ..
        }
    ));

    // The redo branch survives because nothing new was recorded
    assert_eq!(h.service.depths(key).await, (0, 1));
    assert!(h.service.can_redo(key));
    assert_eq!(failures(&h), vec![(key, HistoryOperation::Register)]);
}

#[tokio::test]
async fn test_failure_on_one_key_leaves_others_usable() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let broken = Arc::new(AtomicBool::new(true));

    h.service
        .execute(HistoryKey::MainMap, Insert::new(&doc, "ok").boxed())
        .await
        .unwrap();
    assert!(h
        .service
        .execute(HistoryKey::Layout, Fragile { broken }.boxed())
        .await
        .is_err());

    h.service.undo(HistoryKey::MainMap).await.unwrap();
    assert!(contents(&doc).is_empty());
    assert!(!h.service.can_undo(HistoryKey::Layout));
}

#[tokio::test]
async fn test_empty_history_is_reported() {
    let h = harness(HistoryConfig::default());

    assert!(h.service.redo(HistoryKey::Export).await.is_err());
    assert_eq!(failures(&h), vec![(HistoryKey::Export, HistoryOperation::Redo)]);
}
