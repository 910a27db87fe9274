//! tadrib-core: Local persistence, data model, and state orchestration.
//!
//! This crate defines the persisted key space, the typed repositories over
//! it, the application state orchestrator, backup export/import, and the
//! contract the AI collaborator implements.

pub mod defaults;
pub mod error;
pub mod keys;
pub mod merge;
pub mod model;
pub mod repository;
pub mod state;
pub mod store;
pub mod tasks;
pub mod traits;
pub mod transfer;
