pub mod ids;
pub mod rate_limit;
