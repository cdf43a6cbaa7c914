use serde::Deserialize;

/// Minimal projection of a loan used at dispatch call sites; the loan
/// aggregate itself belongs to the servicing layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanRef {
    pub id: i64,
    pub borrower_user_id: i64,
}
