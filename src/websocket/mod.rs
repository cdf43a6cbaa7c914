pub mod chat;
pub mod connection;
pub mod handler;
pub mod loan_updates;
pub mod notifications;
