// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use config::GuardianConfig;
pub use db::Database;
pub use guardian_common::error::Error;
pub use guardian_common::models;
