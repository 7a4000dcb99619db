/// Fixture store abstraction and its backends.
pub mod fixture_store;
/// Persisted record definitions and change events.
pub mod models;
/// Storage error type shared by every backend.
pub mod storage;
