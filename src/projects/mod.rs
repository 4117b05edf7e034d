pub mod commands;
pub mod ops;
pub mod store;

pub use store::{KvProjectStore, ProjectStore};
