//! Trellis Collaboration - content trees driving authorization propagation
//!
//! A collaboration holds callouts; a callout holds an optional framing, an
//! optional comments thread and any number of contributions; a contribution
//! wraps one post, whiteboard, link or memo. This crate keeps those trees in
//! memory, serves them to the engine through [`NodeLoader`](trellis_authorization::NodeLoader),
//! and re-propagates and persists policies after every structural change.
//!
//! Policies are only kept in memory here; [`PolicyStore`] is the seam a real
//! persistence layer plugs into.

#![forbid(unsafe_code)]

pub mod graph;
pub mod service;
pub mod store;

pub use graph::ContentGraph;
pub use service::{AddedContribution, CollaborationScope, CollaborationService};
pub use store::{InMemoryPolicyStore, PolicyStore};
