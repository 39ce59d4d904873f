// src/repositories/mod.rs

pub use guardian_common::traits::{RecordRepository, UserStore};
pub use postgres::{PostgresRecordRepository, PostgresUserStore};

pub mod postgres;
