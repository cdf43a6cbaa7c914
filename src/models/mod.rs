pub mod auth;
pub mod conversation;
pub mod loan;
pub mod message;
pub mod notification;
