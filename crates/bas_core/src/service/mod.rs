//! Entity services.
//!
//! # Responsibility
//! - Compose attribute filtering, relation resolution, history capture and
//!   the CRUD executor into one uniform surface per entity.
//! - Log every failed operation once and return the error unchanged.

pub mod entity_service;

pub use entity_service::EntityService;
