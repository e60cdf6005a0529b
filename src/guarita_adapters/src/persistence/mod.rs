pub mod in_memory_account_store;
pub mod in_memory_event_store;
pub mod postgres_account_store;
pub mod postgres_event_store;

pub use in_memory_account_store::InMemoryAccountStore;
pub use in_memory_event_store::InMemoryEventStore;
pub use postgres_account_store::PostgresAccountStore;
pub use postgres_event_store::PostgresEventStore;
