mod common;

use lendstream::models::loan::LoanRef;
use lendstream::models::notification::NewNotification;
use lendstream::store::NotificationStore;
use lendstream::websocket::connection::SessionHandler;
use lendstream::websocket::loan_updates::LoanUpdateSession;
use lendstream::websocket::notifications::NotificationSession;

use common::{assert_no_frame, recv_frame, test_connection, test_state};

fn sample_notification(user_id: i64) -> NewNotification {
    NewNotification {
        user_id,
        kind: "payment_due".to_string(),
        title: "Payment Due".to_string(),
        message: "Your payment of 150.00 is due tomorrow".to_string(),
        loan_id: Some(7),
        amount: Some("150.00".to_string()),
    }
}

#[tokio::test]
async fn offline_dispatch_persists_for_later() {
    let (state, store) = test_state();

    let created = state
        .dispatcher
        .notify(sample_notification(5))
        .await
        .unwrap();
    assert!(!created.is_read);
    assert_eq!(store.count_unread(5).await.unwrap(), 1);
}

#[tokio::test]
async fn joining_reports_the_backlog_count() {
    let (state, _) = test_state();
    state
        .dispatcher
        .notify(sample_notification(5))
        .await
        .unwrap();
    state
        .dispatcher
        .notify(sample_notification(5))
        .await
        .unwrap();

    let conn = test_connection(5);
    let _session = NotificationSession::join(state, conn.clone()).await.unwrap();

    let frame = recv_frame(&conn).await;
    assert_eq!(frame["type"], "unread_count");
    assert_eq!(frame["count"], 2);
}

#[tokio::test]
async fn online_dispatch_pushes_content_then_count() {
    let (state, _) = test_state();
    let conn = test_connection(5);
    let _session = NotificationSession::join(state.clone(), conn.clone())
        .await
        .unwrap();
    let initial = recv_frame(&conn).await;
    assert_eq!(initial["count"], 0);

    state
        .dispatcher
        .notify(sample_notification(5))
        .await
        .unwrap();

    let frame = recv_frame(&conn).await;
    assert_eq!(frame["type"], "notification");
    assert_eq!(frame["notification"]["type"], "payment_due");
    assert_eq!(frame["notification"]["amount"], "150.00");

    let count = recv_frame(&conn).await;
    assert_eq!(count["type"], "unread_count");
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn mark_read_mutates_silently_and_idempotently() {
    let (state, store) = test_state();
    let created = state
        .dispatcher
        .notify(sample_notification(5))
        .await
        .unwrap();

    let conn = test_connection(5);
    let session = NotificationSession::join(state, conn.clone()).await.unwrap();
    recv_frame(&conn).await; // unread_count

    let event = format!(r#"{{"type":"mark_read","notification_id":{}}}"#, created.id);
    session.handle_frame(&event).await;
    session.handle_frame(&event).await;

    assert_no_frame(&conn).await;
    assert_eq!(store.count_unread(5).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_all_read_clears_the_backlog() {
    let (state, store) = test_state();
    for _ in 0..3 {
        state
            .dispatcher
            .notify(sample_notification(5))
            .await
            .unwrap();
    }

    let conn = test_connection(5);
    let session = NotificationSession::join(state, conn.clone()).await.unwrap();
    recv_frame(&conn).await;

    session.handle_frame(r#"{"type":"mark_all_read"}"#).await;

    assert_no_frame(&conn).await;
    assert_eq!(store.count_unread(5).await.unwrap(), 0);
}

#[tokio::test]
async fn status_change_reaches_the_loan_stream_with_mapped_copy() {
    let (state, store) = test_state();
    let conn = test_connection(9);
    let _session = LoanUpdateSession::join(state.clone(), conn.clone())
        .await
        .unwrap();

    let loan = LoanRef {
        id: 12,
        borrower_user_id: 9,
    };
    let created = state
        .dispatcher
        .notify_loan_status_change(&loan, "APPROVED", "")
        .await
        .unwrap();

    let frame = recv_frame(&conn).await;
    assert_eq!(frame["type"], "loan_status_changed");
    assert_eq!(frame["loan_id"], 12);
    assert_eq!(frame["status"], "APPROVED");
    assert_eq!(
        frame["message"],
        "Your loan status has been updated to APPROVED"
    );

    assert_eq!(created.kind, "loan_approved");
    assert_eq!(created.title, "Loan Approved");
    assert_eq!(created.loan_id, Some(12));
    assert_eq!(store.count_unread(9).await.unwrap(), 1);
}

#[tokio::test]
async fn unmapped_status_gets_the_generic_copy() {
    let (state, _) = test_state();
    let loan = LoanRef {
        id: 12,
        borrower_user_id: 9,
    };
    let created = state
        .dispatcher
        .notify_loan_status_change(&loan, "FROZEN", "Account under review")
        .await
        .unwrap();

    assert_eq!(created.kind, "loan_update");
    assert_eq!(created.title, "Loan Status Update");
    assert_eq!(created.message, "Account under review");
}

#[tokio::test]
async fn payment_received_is_push_only() {
    let (state, store) = test_state();
    let conn = test_connection(9);
    let _session = LoanUpdateSession::join(state.clone(), conn.clone())
        .await
        .unwrap();

    state
        .dispatcher
        .payment_received(9, 12, 301, "150.00", "850.00")
        .await;

    let frame = recv_frame(&conn).await;
    assert_eq!(frame["type"], "payment_received");
    assert_eq!(frame["payment_id"], 301);
    assert_eq!(frame["remaining_balance"], "850.00");

    // Pure stream event, no notification record behind it.
    assert_eq!(store.count_unread(9).await.unwrap(), 0);
}
