//! Pinecone integration for stylerag
//!
//! This crate provides the Pinecone implementation of the `VectorIndex` trait,
//! speaking the index data-plane REST API (`/query`, `/describe_index_stats`).

mod client;
mod config;


pub use client::PineconeIndex;
pub use config::PineconeConfig;

// Re-export core types for convenience
pub use stylerag_core::{Error, IndexStats, Result, SearchMatch, VectorIndex};
