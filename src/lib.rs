pub mod api;
pub mod auth;
pub mod broker;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod outbox;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod state;
pub mod store;
pub mod utils;
pub mod websocket;

pub use server::Server;
