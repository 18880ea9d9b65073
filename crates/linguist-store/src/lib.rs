//! linguist-store — file-backed persistence for the Study Link collections.
//!
//! Provides the JSON-file implementation of the storage traits defined in
//! `linguist-core`. Tests that want a throwaway store should use
//! `linguist_core::store::MemoryStore` instead.

pub mod json;

pub use json::JsonStore;
