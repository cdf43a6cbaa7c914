use std::sync::Arc;

use chrono::Utc;

use crate::broker::{GroupBroker, loan_updates_group, notifications_group};
use crate::error::SessionError;
use crate::models::loan::LoanRef;
use crate::models::notification::{NewNotification, Notification};
use crate::protocol::Frame;
use crate::store::NotificationStore;

/// Entry point business workflows call to persist a notification and push it
/// live. Persistence comes first and its failure aborts the call; live
/// delivery failing (user offline, slow socket) never rolls back the record.
#[derive(Clone)]
pub struct NotificationDispatcher {
    broker: GroupBroker,
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationDispatcher {
    pub fn new(broker: GroupBroker, notifications: Arc<dyn NotificationStore>) -> Self {
        Self {
            broker,
            notifications,
        }
    }

    pub async fn notify(&self, new: NewNotification) -> Result<Notification, SessionError> {
        let user_id = new.user_id;
        let notification = self.notifications.create_notification(new).await?;
        let group = notifications_group(user_id);
        self.broker
            .publish(
                &group,
                &Frame::Notification {
                    notification: notification.clone(),
                },
                None,
            )
            .await;
        // The count rides as its own frame so count and content can never
        // drift apart on the client.
        match self.notifications.count_unread(user_id).await {
            Ok(count) => {
                self.broker
                    .publish(&group, &Frame::UnreadCount { count }, None)
                    .await;
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "unread count refresh failed after dispatch");
            }
        }
        Ok(notification)
    }

    /// Publishes the status change to the borrower's loan-update stream and
    /// records a notification with human-readable copy for the status.
    /// Statuses outside the fixed mapping get the generic copy.
    pub async fn notify_loan_status_change(
        &self,
        loan: &LoanRef,
        status: &str,
        message: &str,
    ) -> Result<Notification, SessionError> {
        let message = if message.is_empty() {
            format!("Your loan status has been updated to {status}")
        } else {
            message.to_string()
        };

        self.broker
            .publish(
                &loan_updates_group(loan.borrower_user_id),
                &Frame::LoanStatusChanged {
                    loan_id: loan.id,
                    status: status.to_string(),
                    message: message.clone(),
                    updated_at: Utc::now(),
                },
                None,
            )
            .await;

        let (kind, title) = status_copy(status);
        self.notify(NewNotification {
            user_id: loan.borrower_user_id,
            kind: kind.to_string(),
            title: title.to_string(),
            message,
            loan_id: Some(loan.id),
            amount: None,
        })
        .await
    }

    pub async fn loan_approved(&self, user_id: i64, loan_id: i64, amount: &str, message: &str) {
        self.broker
            .publish(
                &loan_updates_group(user_id),
                &Frame::LoanApproved {
                    loan_id,
                    amount: amount.to_string(),
                    message: message.to_string(),
                },
                None,
            )
            .await;
    }

    pub async fn loan_disbursed(
        &self,
        user_id: i64,
        loan_id: i64,
        amount: &str,
        account_number: &str,
    ) {
        self.broker
            .publish(
                &loan_updates_group(user_id),
                &Frame::LoanDisbursed {
                    loan_id,
                    amount: amount.to_string(),
                    account_number: account_number.to_string(),
                },
                None,
            )
            .await;
    }

    pub async fn payment_received(
        &self,
        user_id: i64,
        loan_id: i64,
        payment_id: i64,
        amount: &str,
        remaining_balance: &str,
    ) {
        self.broker
            .publish(
                &loan_updates_group(user_id),
                &Frame::PaymentReceived {
                    loan_id,
                    payment_id,
                    amount: amount.to_string(),
                    remaining_balance: remaining_balance.to_string(),
                },
                None,
            )
            .await;
    }

    pub async fn payment_due_reminder(
        &self,
        user_id: i64,
        loan_id: i64,
        due_date: &str,
        amount: &str,
    ) {
        self.broker
            .publish(
                &loan_updates_group(user_id),
                &Frame::PaymentDueReminder {
                    loan_id,
                    due_date: due_date.to_string(),
                    amount: amount.to_string(),
                },
                None,
            )
            .await;
    }
}

/// Fixed status→(notification type, title) copy map.
fn status_copy(status: &str) -> (&'static str, &'static str) {
    match status {
        "APPROVED" => ("loan_approved", "Loan Approved"),
        "REJECTED" => ("loan_rejected", "Loan Rejected"),
        "DISBURSED" => ("loan_disbursed", "Loan Disbursed"),
        "PENDING" => ("loan_pending", "Loan Pending Review"),
        "ACTIVE" => ("loan_active", "Loan Activated"),
        "COMPLETED" => ("loan_completed", "Loan Completed"),
        "DEFAULTED" => ("loan_defaulted", "Loan Defaulted"),
        _ => ("loan_update", "Loan Status Update"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_copy_covers_known_statuses() {
        assert_eq!(status_copy("APPROVED"), ("loan_approved", "Loan Approved"));
        assert_eq!(status_copy("DEFAULTED"), ("loan_defaulted", "Loan Defaulted"));
    }

    #[test]
    fn unknown_status_falls_back_to_generic_copy() {
        assert_eq!(status_copy("FROZEN"), ("loan_update", "Loan Status Update"));
    }
}
