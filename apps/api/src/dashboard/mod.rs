pub mod activity;
pub mod handlers;
pub mod metrics;
pub mod repo;
