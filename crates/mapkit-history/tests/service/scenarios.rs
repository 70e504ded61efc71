use crate::support::*;
use mapkit_core::{AppEvent, Capability, HistoryEvent, HistoryKey};
use mapkit_history::{Changeset, CompositeChangeset, HistoryConfig, HistoryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_empty_timeline_rejects_undo() {
    let h = harness(HistoryConfig::default());

    assert!(!h.service.can_undo(HistoryKey::MainMap));
    assert!(!h.service.can_redo(HistoryKey::MainMap));

    let err = h.service.undo(HistoryKey::MainMap).await.unwrap_err();
    assert!(err.is_empty_history());
    assert!(matches!(err, HistoryError::EmptyHistory { key: HistoryKey::MainMap, .. }));
    assert_eq!(h.service.capability(HistoryKey::MainMap), Capability::NONE);
}

#[tokio::test]
async fn test_add_then_undo_then_redo() {
    let h = harness(HistoryConfig::default());
    let doc = names();

    h.service
        .execute(HistoryKey::MainMap, Insert::new(&doc, "F").boxed())
        .await
        .unwrap();
    assert_eq!(contents(&doc), vec!["F"]);
    assert!(h.service.can_undo(HistoryKey::MainMap));
    assert!(!h.service.can_redo(HistoryKey::MainMap));

    h.service.undo(HistoryKey::MainMap).await.unwrap();
    assert!(contents(&doc).is_empty());
    assert!(!h.service.can_undo(HistoryKey::MainMap));
    assert!(h.service.can_redo(HistoryKey::MainMap));

    h.service.redo(HistoryKey::MainMap).await.unwrap();
    assert_eq!(contents(&doc), vec!["F"]);
    assert!(h.service.can_undo(HistoryKey::MainMap));
    assert!(!h.service.can_redo(HistoryKey::MainMap));
}

#[tokio::test]
async fn test_new_edit_clears_redo_branch() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let key = HistoryKey::MainMap;

    h.service.execute(key, Insert::new(&doc, "L1").boxed()).await.unwrap();
    h.service.execute(key, Insert::new(&doc, "L2").boxed()).await.unwrap();

    h.service.undo(key).await.unwrap();
    assert_eq!(contents(&doc), vec!["L1"]);
    assert!(h.service.can_redo(key));
    assert_eq!(h.service.depths(key).await, (1, 1));

    h.service.execute(key, Rename::new(&doc, "L1", "Roads").boxed()).await.unwrap();
    assert!(!h.service.can_redo(key));
    assert_eq!(h.service.depths(key).await, (2, 0));
    assert_eq!(contents(&doc), vec!["Roads"]);

    assert!(h.service.redo(key).await.unwrap_err().is_empty_history());
}

#[tokio::test]
async fn test_register_records_already_applied_changeset() {
    let h = harness(HistoryConfig::default());
    let doc = names();

    let mut insert = Insert::new(&doc, "pre-applied");
    insert.apply().await.unwrap();
    h.service.register(HistoryKey::Layout, insert.boxed()).await;

    assert_eq!(contents(&doc), vec!["pre-applied"]);
    assert!(h.service.can_undo(HistoryKey::Layout));
    h.service.undo(HistoryKey::Layout).await.unwrap();
    assert!(contents(&doc).is_empty());
}

#[tokio::test]
async fn test_keys_are_isolated() {
    let h = harness(HistoryConfig::default());
    let doc = names();

    h.service
        .execute(HistoryKey::MainMap, Insert::new(&doc, "A").boxed())
        .await
        .unwrap();
    assert!(!h.service.can_undo(HistoryKey::Layout));

    h.service
        .execute(HistoryKey::Layout, Insert::new(&doc, "B").boxed())
        .await
        .unwrap();
    h.service.undo(HistoryKey::Layout).await.unwrap();

    assert!(h.service.can_undo(HistoryKey::MainMap));
    assert!(!h.service.can_redo(HistoryKey::MainMap));
    assert_eq!(h.service.depths(HistoryKey::MainMap).await, (1, 0));
    assert_eq!(contents(&doc), vec!["A"]);
}

#[tokio::test]
async fn test_composite_undoes_every_item_together() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    for name in ["a", "b", "c"] {
        doc.lock().push(name.to_string());
    }

    let composite = CompositeChangeset::new("Restyle selection")
        .with(Rename::new(&doc, "a", "a*").boxed())
        .with(Rename::new(&doc, "b", "b*").boxed())
        .with(Rename::new(&doc, "c", "c*").boxed());
    h.service
        .execute(HistoryKey::MainMap, composite.boxed())
        .await
        .unwrap();
    assert_eq!(contents(&doc), vec!["a*", "b*", "c*"]);
    assert_eq!(h.service.depths(HistoryKey::MainMap).await, (1, 0));

    h.service.undo(HistoryKey::MainMap).await.unwrap();
    assert_eq!(contents(&doc), vec!["a", "b", "c"]);

    h.service.redo(HistoryKey::MainMap).await.unwrap();
    assert_eq!(contents(&doc), vec!["a*", "b*", "c*"]);
}

#[tokio::test]
async fn test_capability_reads_are_stable() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    h.service
        .execute(HistoryKey::SharedViews, Insert::new(&doc, "v").boxed())
        .await
        .unwrap();

    let first = h.service.capability(HistoryKey::SharedViews);
    for _ in 0..10 {
        assert_eq!(h.service.capability(HistoryKey::SharedViews), first);
        assert_eq!(h.service.can_undo(HistoryKey::SharedViews), first.can_undo);
    }
}

#[tokio::test]
async fn test_depth_limit_evicts_and_disposes() {
    let h = harness(HistoryConfig::new(100).with_override(HistoryKey::Export, 3));
    let doc = names();
    let disposed = Arc::new(AtomicUsize::new(0));

    for i in 0..5 {
        let name = format!("n{}", i);
        h.service
            .execute(HistoryKey::Export, Insert::counting(&doc, &name, &disposed).boxed())
            .await
            .unwrap();
    }

    assert_eq!(h.service.depths(HistoryKey::Export).await, (3, 0));
    assert_eq!(disposed.load(Ordering::SeqCst), 2);

    for _ in 0..3 {
        h.service.undo(HistoryKey::Export).await.unwrap();
    }
    assert_eq!(contents(&doc), vec!["n0", "n1"]);
    assert!(!h.service.can_undo(HistoryKey::Export));
}

#[tokio::test]
async fn test_clean_discards_without_undoing() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let disposed = Arc::new(AtomicUsize::new(0));

    for key in [HistoryKey::MainMap, HistoryKey::Layout] {
        h.service
            .execute(key, Insert::counting(&doc, key.as_str(), &disposed).boxed())
            .await
            .unwrap();
    }
    h.service.undo(HistoryKey::Layout).await.unwrap();
    h.events.lock().clear();

    let discarded = h.service.clean(None).await;
    assert_eq!(discarded, 2);
    assert_eq!(disposed.load(Ordering::SeqCst), 2);
    assert_eq!(contents(&doc), vec!["main-map"]);

    for key in HistoryKey::ALL {
        assert_eq!(h.service.capability(key), Capability::NONE);
    }

    let events = h.events.lock();
    for key in [HistoryKey::MainMap, HistoryKey::Layout] {
        assert!(events.contains(&AppEvent::History(HistoryEvent::Cleared { key })));
        assert!(events.contains(&AppEvent::History(HistoryEvent::CapabilityChanged {
            key,
            capability: Capability::NONE,
        })));
    }
}

#[tokio::test]
async fn test_clean_single_key_leaves_others() {
    let h = harness(HistoryConfig::default());
    let doc = names();

    h.service
        .execute(HistoryKey::MainMap, Insert::new(&doc, "keep").boxed())
        .await
        .unwrap();
    h.service
        .execute(HistoryKey::Layout, Insert::new(&doc, "drop").boxed())
        .await
        .unwrap();

    assert_eq!(h.service.clean(Some(HistoryKey::Layout)).await, 1);
    assert!(!h.service.can_undo(HistoryKey::Layout));
    assert!(h.service.can_undo(HistoryKey::MainMap));
}

#[tokio::test]
async fn test_capability_events_follow_stack_changes() {
    let h = harness(HistoryConfig::default());
    let doc = names();
    let key = HistoryKey::MainMap;

    h.service.execute(key, Insert::new(&doc, "x").boxed()).await.unwrap();
    h.service.execute(key, Insert::new(&doc, "y").boxed()).await.unwrap();
    h.service.undo(key).await.unwrap();

    let changes: Vec<Capability> = h
        .events
        .lock()
        .iter()
        .filter_map(|event| match event {
            AppEvent::History(HistoryEvent::CapabilityChanged { capability, .. }) => {
                Some(*capability)
            }
            _ => None,
        })
        .collect();

    // The second execute does not change {true, false}, so it is not announced
    assert_eq!(
        changes,
        vec![Capability::from_depths(1, 0), Capability::from_depths(1, 1)]
    );

    let state = h.service.capability_state();
    assert!(state.can_undo(key));
    assert!(state.can_redo(key));
}
