// Career goals: CRUD endpoints plus the UI ↔ persisted status reconciliation.

pub mod handlers;
pub mod repo;
pub mod status;
