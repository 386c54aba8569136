//! Trellis Core - shared foundation types
//!
//! This crate holds the pieces every other Trellis crate leans on:
//!
//! - Identifiers for content nodes, authorization policies and actors
//! - The unified [`TrellisError`] and [`Result`] alias
//! - The configuration layer for the authorization engine
//!
//! It contains no authorization logic of its own; see `trellis-authorization`
//! for the engine and `trellis-collaboration` for the content-tree collaborator.

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Node, policy and actor identifiers
pub mod identifiers;

/// Authorization engine configuration
pub mod config;

pub use config::{AuthorizationConfig, ConfigValidation};
pub use errors::{Result, TrellisError};
pub use identifiers::{ActorId, NodeId, PolicyId};
