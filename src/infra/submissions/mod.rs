// Implementations of the submission store.

#[cfg(test)]
pub mod in_memory;
pub mod sqlite_store;

#[cfg(test)]
pub use in_memory::InMemorySubmissionStore;
pub use sqlite_store::SqliteSubmissionStore;
