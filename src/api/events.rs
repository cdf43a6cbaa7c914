use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::SessionError;
use crate::models::loan::LoanRef;
use crate::models::notification::NewNotification;
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

/// Out-of-process dispatcher call sites live here: business workflows that
/// cannot call `NotificationDispatcher` directly post their events to these
/// routes. A persistence failure is the caller's failure too, hence 503.
#[derive(Deserialize)]
pub struct NotifyPayload {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub loan_id: Option<i64>,
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanEventPayload {
    StatusChanged {
        user_id: i64,
        loan_id: i64,
        status: String,
        #[serde(default)]
        message: String,
    },
    Approved {
        user_id: i64,
        loan_id: i64,
        amount: String,
        #[serde(default)]
        message: String,
    },
    Disbursed {
        user_id: i64,
        loan_id: i64,
        amount: String,
        #[serde(default)]
        account_number: String,
    },
    PaymentReceived {
        user_id: i64,
        loan_id: i64,
        payment_id: i64,
        amount: String,
        remaining_balance: String,
    },
    PaymentDueReminder {
        user_id: i64,
        loan_id: i64,
        due_date: String,
        amount: String,
    },
}

fn persistence_error(err: SessionError) -> ApiError {
    tracing::error!(error = %err, "notification dispatch failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": "PERSISTENCE_ERROR" })),
    )
}

pub async fn notify_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NotifyPayload>,
) -> Result<Json<Value>, ApiError> {
    let notification = state
        .dispatcher
        .notify(NewNotification {
            user_id: payload.user_id,
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            loan_id: payload.loan_id,
            amount: payload.amount,
        })
        .await
        .map_err(persistence_error)?;

    Ok(Json(
        serde_json::json!({ "notification_id": notification.id }),
    ))
}

pub async fn loan_event_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoanEventPayload>,
) -> Result<Json<Value>, ApiError> {
    match payload {
        LoanEventPayload::StatusChanged {
            user_id,
            loan_id,
            status,
            message,
        } => {
            let loan = LoanRef {
                id: loan_id,
                borrower_user_id: user_id,
            };
            let notification = state
                .dispatcher
                .notify_loan_status_change(&loan, &status, &message)
                .await
                .map_err(persistence_error)?;
            Ok(Json(
                serde_json::json!({ "notification_id": notification.id }),
            ))
        }
        LoanEventPayload::Approved {
            user_id,
            loan_id,
            amount,
            message,
        } => {
            state
                .dispatcher
                .loan_approved(user_id, loan_id, &amount, &message)
                .await;
            Ok(Json(serde_json::json!({ "ok": true })))
        }
        LoanEventPayload::Disbursed {
            user_id,
            loan_id,
            amount,
            account_number,
        } => {
            state
                .dispatcher
                .loan_disbursed(user_id, loan_id, &amount, &account_number)
                .await;
            Ok(Json(serde_json::json!({ "ok": true })))
        }
        LoanEventPayload::PaymentReceived {
            user_id,
            loan_id,
            payment_id,
            amount,
            remaining_balance,
        } => {
            state
                .dispatcher
                .payment_received(user_id, loan_id, payment_id, &amount, &remaining_balance)
                .await;
            Ok(Json(serde_json::json!({ "ok": true })))
        }
        LoanEventPayload::PaymentDueReminder {
            user_id,
            loan_id,
            due_date,
            amount,
        } => {
            state
                .dispatcher
                .payment_due_reminder(user_id, loan_id, &due_date, &amount)
                .await;
            Ok(Json(serde_json::json!({ "ok": true })))
        }
    }
}
