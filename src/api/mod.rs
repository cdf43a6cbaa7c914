pub mod events;
pub mod handlers;
pub mod middleware;
pub mod routes;
