//! Shared test utilities for the filebox workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`actions`]: terse constructors for file actions and owners
//! - [`store`]: [`store::TestStore`], a durable index in a temp directory

pub mod actions;
pub mod store;
