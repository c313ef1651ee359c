pub mod migrations;
pub mod repository;
pub mod store;

pub use store::{LocalStore, SessionToken, StoreError, WeightStore};
