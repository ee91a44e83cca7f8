/*!
 * Tests for the relationship manager
 */

use std::sync::Arc;

use labelflow::errors::RelationshipError;
use labelflow::relationship::RelationshipManager;

use crate::common;
use crate::common::mock_collaborators::{CallEvent, RecordingCollaborator};

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn manager_with_mock() -> (RelationshipManager, Arc<RecordingCollaborator>) {
    let mock = Arc::new(RecordingCollaborator::new());
    (RelationshipManager::new(mock.clone()), mock)
}

/// Test that a mixed-family chain is rejected without touching state
#[test]
fn test_establish_relationship_withMixedFamilies_shouldLeaveStateUnchanged() {
    let (manager, _) = manager_with_mock();

    let result = manager.establish_relationship(
        "mother_2",
        ids(&["mother_2A", "mother_1B"]),
        "new-comp-trans",
        "text",
        ids(&["a", "b", "c"]),
    );

    assert!(matches!(result, Err(RelationshipError::CrossFamily { .. })));
    assert!(manager.get_relationship("mother_2").is_none());
    assert!(manager.get_all_relationships().is_empty());
}

/// Test that distribution length must match the chain
#[test]
fn test_establish_relationship_withShortDistribution_shouldReject() {
    let (manager, _) = manager_with_mock();
    let result = manager.establish_relationship("mother_1", ids(&["mother_1A", "mother_1B"]), "x", "t", ids(&["a"]));

    assert_eq!(
        result,
        Err(RelationshipError::DistributionMismatch {
            master_id: "mother_1".to_string(),
            expected: 3,
            actual: 1,
        })
    );
}

/// Test that an empty child list is rejected
#[test]
fn test_establish_relationship_withNoChildren_shouldReject() {
    let (manager, _) = manager_with_mock();
    let result = manager.establish_relationship("mother_1", Vec::new(), "x", "t", ids(&["t"]));
    assert!(matches!(result, Err(RelationshipError::EmptyChain { .. })));
}

/// Test that cascade deletion fires every callback once, in order
#[tokio::test]
async fn test_cascade_delete_children_withThreeChildren_shouldDeleteAllInOrder() {
    let (manager, mock) = manager_with_mock();
    manager
        .establish_relationship(
            "mother_5",
            ids(&["mother_5A", "mother_5B", "mother_5C"]),
            "x",
            "a b c d",
            ids(&["a", "b", "c", "d"]),
        )
        .unwrap();

    let deleted = manager.cascade_delete_children("mother_5").await;

    assert_eq!(deleted, 3);
    assert_eq!(
        mock.tracker().lock().unwrap().deleted_ids(),
        ids(&["mother_5A", "mother_5B", "mother_5C"])
    );
    assert!(manager.get_relationship("mother_5").is_none());
    assert!(manager.get_chain_metadata("mother_5").is_none());
}

/// Test that one failing delete does not stop the cascade
#[tokio::test]
async fn test_cascade_delete_children_withFailingChild_shouldContinueAndForget() {
    let (manager, mock) = manager_with_mock();
    mock.fail_delete_for("mother_5B");
    manager
        .establish_relationship(
            "mother_5",
            ids(&["mother_5A", "mother_5B", "mother_5C"]),
            "x",
            "a b c d",
            ids(&["a", "b", "c", "d"]),
        )
        .unwrap();

    let deleted = manager.cascade_delete_children("mother_5").await;

    assert_eq!(deleted, 2);
    assert_eq!(mock.tracker().lock().unwrap().deleted_ids().len(), 3);
    assert!(manager.get_relationship("mother_5").is_none());
}

/// Test that cascading a master without children is a no-op
#[tokio::test]
async fn test_cascade_delete_children_withNoRelationship_shouldDoNothing() {
    let (manager, mock) = manager_with_mock();
    assert_eq!(manager.cascade_delete_children("mother_9").await, 0);
    assert!(mock.tracker().lock().unwrap().events.is_empty());
}

/// Test the change predicate
#[test]
fn test_detect_overflow_change_withAndWithoutRelationship_shouldRequireBoth() {
    let (manager, _) = manager_with_mock();
    assert!(!manager.detect_overflow_change("mother_1", "old", "new"));

    manager
        .establish_relationship("mother_1", ids(&["mother_1A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();
    assert!(manager.detect_overflow_change("mother_1", "old", "new"));
    assert!(!manager.detect_overflow_change("mother_1", "same", "same"));
}

/// Test that fitting text creates no children and records nothing
#[tokio::test]
async fn test_dynamic_rerender_withFittingText_shouldNotCreateChildren() {
    let (manager, mock) = manager_with_mock();
    let region = common::settings_region("mother_1");

    let outcome = manager
        .dynamic_rerender("mother_1", "100% cotton", &region, |_| common::fixed_capacity(5))
        .await
        .unwrap();

    assert!(!outcome.has_overflow);
    assert_eq!(outcome.text_distribution, ids(&["100% cotton"]));
    assert!(outcome.child_ids.is_empty());
    assert!(manager.get_relationship("mother_1").is_none());
    assert!(mock.tracker().lock().unwrap().events.is_empty());
}

/// Test that rerendering over an existing chain is refused
#[tokio::test]
async fn test_dynamic_rerender_withExistingChain_shouldRefuse() {
    let (manager, _) = manager_with_mock();
    manager
        .establish_relationship("mother_1", ids(&["mother_1A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();

    let result = manager
        .dynamic_rerender("mother_1", "a\nb\nc", &common::settings_region("mother_1"), |_| common::fixed_capacity(1))
        .await;

    assert!(matches!(result, Err(RelationshipError::AlreadyRelated { .. })));
}

/// Test that a failed child creation skips only that child
#[tokio::test]
async fn test_handle_chain_management_withFailedCreation_shouldSkipChild() {
    let (manager, mock) = manager_with_mock();
    mock.fail_create_for("mother_1B");
    let region = common::settings_region("mother_1");

    let outcome = manager
        .handle_chain_management("mother_1", "a\nb\nc\nd", &region, |_| common::fixed_capacity(1))
        .await;

    assert_eq!(outcome.child_ids, ids(&["mother_1A", "mother_1C"]));
    assert_eq!(outcome.text_distribution, ids(&["a", "b", "d"]));
    assert_eq!(outcome.unplaced_chunks, 1);

    let relationship = manager.get_relationship("mother_1").unwrap();
    assert_eq!(relationship.child_ids, ids(&["mother_1A", "mother_1C"]));
    let metadata = manager.get_chain_metadata("mother_1").unwrap();
    assert_eq!(metadata.capacity_limits, vec![1, 1, 1]);
    assert_eq!(metadata.original_text, "a\nb\nc\nd");

    let tracker = mock.tracker();
    let tracker = tracker.lock().unwrap();
    assert!(!tracker.updates().iter().any(|(id, _)| id == "mother_1B"));
}

/// Test that a content-update failure does not abort distribution
#[tokio::test]
async fn test_handle_chain_management_withFailedUpdate_shouldStillRecordChain() {
    let (manager, mock) = manager_with_mock();
    mock.fail_update_for("mother_1");

    let outcome = manager
        .handle_chain_management("mother_1", "a\nb", &common::settings_region("mother_1"), |_| common::fixed_capacity(1))
        .await;

    assert_eq!(outcome.child_ids, ids(&["mother_1A"]));
    assert_eq!(mock.tracker().lock().unwrap().updates().len(), 2);
    assert!(manager.get_relationship("mother_1").is_some());
}

/// Test that a content change on a fitting master without chain does nothing
#[tokio::test]
async fn test_handle_content_change_withoutOverflow_shouldReturnNone() {
    let (manager, mock) = manager_with_mock();
    let region = common::settings_region("mother_1");

    let outcome = manager
        .handle_content_change("mother_1", "cotton", "wool", &region, |_| common::fixed_capacity(3))
        .await;

    assert!(outcome.is_none());
    assert!(mock.tracker().lock().unwrap().events.is_empty());
}

/// Test that shrinking text removes a chain that is no longer needed
#[tokio::test]
async fn test_handle_content_change_withShrunkText_shouldRemoveChain() {
    let (manager, mock) = manager_with_mock();
    let region = common::settings_region("mother_1");
    manager
        .handle_chain_management("mother_1", "a\nb\nc", &region, |_| common::fixed_capacity(2))
        .await;
    assert!(manager.has_relationship("mother_1"));

    let outcome = manager
        .handle_content_change("mother_1", "a\nb\nc", "a", &region, |_| common::fixed_capacity(2))
        .await
        .unwrap();

    assert!(!outcome.has_overflow);
    assert!(!manager.has_relationship("mother_1"));
    let tracker = mock.tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.deleted_ids(), ids(&["mother_1A"]));
    assert!(matches!(tracker.events.last(), Some(CallEvent::Deleted { .. })));
}

/// Test teardown and clear
#[tokio::test]
async fn test_teardown_withTwoChains_shouldDeleteEveryChild() {
    let (manager, mock) = manager_with_mock();
    manager
        .establish_relationship("mother_1", ids(&["mother_1A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();
    manager
        .establish_relationship("mother_2", ids(&["mother_2A", "mother_2B"]), "x", "a b c", ids(&["a", "b", "c"]))
        .unwrap();

    manager.teardown().await;

    assert!(manager.get_all_relationships().is_empty());
    assert_eq!(mock.tracker().lock().unwrap().deleted_ids().len(), 3);
}

/// Test that clear drops records without callbacks
#[test]
fn test_clear_all_relationships_shouldNotCallCollaborator() {
    let (manager, mock) = manager_with_mock();
    manager
        .establish_relationship("mother_1", ids(&["mother_1A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();

    manager.clear_all_relationships();

    assert!(manager.get_all_relationships().is_empty());
    assert!(manager.get_chain_metadata("mother_1").is_none());
    assert!(mock.tracker().lock().unwrap().events.is_empty());
}

/// Test that two managers do not share state
#[test]
fn test_managers_withSeparateInstances_shouldNotInterfere() {
    let first = RelationshipManager::without_callbacks();
    let second = RelationshipManager::without_callbacks();
    first
        .establish_relationship("mother_1", ids(&["mother_1A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();

    assert!(first.has_relationship("mother_1"));
    assert!(!second.has_relationship("mother_1"));
}

/// Test that the cascade future can be driven outside a tokio runtime macro
#[test]
fn test_cascade_delete_children_withBlockOn_shouldComplete() {
    let (manager, mock) = manager_with_mock();
    manager
        .establish_relationship("mother_6", ids(&["mother_6A"]), "x", "a b", ids(&["a", "b"]))
        .unwrap();

    let deleted = tokio_test::block_on(manager.cascade_delete_children("mother_6"));

    assert_eq!(deleted, 1);
    assert_eq!(mock.tracker().lock().unwrap().deleted_ids(), ids(&["mother_6A"]));
}

/// Test that masters without digits still record the children they create
#[tokio::test]
async fn test_handle_chain_management_withLetterOnlyMasters_shouldRecordEveryCreatedChild() {
    for master in ["CARE", "mother_A"] {
        let (manager, mock) = manager_with_mock();
        let region = common::settings_region(master);

        let outcome = manager
            .handle_chain_management(master, &common::numbered_lines(12), &region, |_| common::fixed_capacity(5))
            .await;

        let expected = vec![format!("{}A", master), format!("{}B", master)];
        assert_eq!(outcome.child_ids, expected, "master {}", master);
        assert_eq!(outcome.unplaced_chunks, 0);
        assert_eq!(mock.tracker().lock().unwrap().created_ids(), expected);

        let recorded = manager.get_relationship(master).expect("chain should be recorded");
        assert_eq!(recorded.child_ids, expected);

        // Recorded children can be cascaded away again
        assert_eq!(manager.cascade_delete_children(master).await, 2);
        assert_eq!(mock.tracker().lock().unwrap().deleted_ids(), expected);
    }
}

/// Test that an uppercase master accepts its own suffixed children
#[test]
fn test_establish_relationship_withUppercaseMaster_shouldAcceptSuffixedChildren() {
    let (manager, _) = manager_with_mock();
    let result = manager.establish_relationship("CARE", ids(&["CAREA", "CAREB"]), "x", "t", ids(&["a", "b", "c"]));

    assert!(result.is_ok());
    assert_eq!(manager.master_of("CAREB").as_deref(), Some("CARE"));
}
