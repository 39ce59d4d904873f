// src/repositories/postgres/mod.rs

pub mod records;
pub mod users;

pub use records::PostgresRecordRepository;
pub use users::PostgresUserStore;
