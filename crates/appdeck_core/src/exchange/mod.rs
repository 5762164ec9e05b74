//! Configuration export/import.
//!
//! # Responsibility
//! - Define the portable document describing folders and app assignments.
//! - Snapshot the catalog to a document and rebuild a catalog from one.
//!
//! # Invariants
//! - The document references folders by name, never by internal id; ids are
//!   regenerated on import.
//! - Import fully replaces the stored catalog in one transaction.

pub mod config;
pub mod document;
