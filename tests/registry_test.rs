mod common;

use lendstream::protocol::Frame;

use common::{assert_no_frame, test_connection, test_state};

#[tokio::test]
async fn join_is_idempotent() {
    let (state, _) = test_state();
    let conn = test_connection(1);
    state.registry.register(conn.clone()).await;

    assert!(state.registry.join_group(&conn.id, "chat:1").await);
    assert!(state.registry.join_group(&conn.id, "chat:1").await);

    let members = state.registry.members_of("chat:1").await;
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn join_fails_for_unknown_connection() {
    let (state, _) = test_state();
    assert!(!state.registry.join_group("NOSUCH", "chat:1").await);
    assert!(state.registry.members_of("chat:1").await.is_empty());
}

#[tokio::test]
async fn unregister_sweeps_all_groups_and_frees_empty_ones() {
    let (state, _) = test_state();
    let a = test_connection(1);
    let b = test_connection(2);
    state.registry.register(a.clone()).await;
    state.registry.register(b.clone()).await;

    state.registry.join_group(&a.id, "chat:1").await;
    state.registry.join_group(&a.id, "notifications:1").await;
    state.registry.join_group(&b.id, "chat:1").await;

    let (_, mut left) = state.registry.unregister(&a.id).await.unwrap();
    left.sort();
    assert_eq!(left, vec!["chat:1".to_string(), "notifications:1".to_string()]);

    // chat:1 still has b; the solo notification group is gone.
    assert_eq!(state.registry.members_of("chat:1").await.len(), 1);
    assert!(state
        .registry
        .group_counts()
        .await
        .iter()
        .all(|(name, _)| name != "notifications:1"));

    assert!(state.registry.unregister(&a.id).await.is_none());
}

#[tokio::test]
async fn leave_group_frees_group_when_last_member_leaves() {
    let (state, _) = test_state();
    let conn = test_connection(1);
    state.registry.register(conn.clone()).await;
    state.registry.join_group(&conn.id, "loanUpdates:1").await;

    state.registry.leave_group(&conn.id, "loanUpdates:1").await;
    assert!(state.registry.group_counts().await.is_empty());
}

#[tokio::test]
async fn publish_to_empty_group_is_a_no_op() {
    let (state, _) = test_state();
    let conn = test_connection(1);
    state.registry.register(conn.clone()).await;

    state
        .broker
        .publish("chat:99", &Frame::UnreadCount { count: 1 }, None)
        .await;

    assert_no_frame(&conn).await;
}
