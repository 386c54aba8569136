//! Trellis Testing Infrastructure
//!
//! Common fixtures for tests across the workspace: actor builders, content
//! tree fixtures with a ready-made [`NodeLoader`](trellis_authorization::NodeLoader),
//! proptest strategies and assertion macros.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! trellis-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use trellis_testkit::*;
//!
//! let (_tree, _ids) = standard_tree();
//! let _admin = space_admin("user-1", SPACE);
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod actors;
pub mod assertions;
pub mod fixtures;
pub mod logging;
pub mod strategies;

pub use actors::*;
pub use fixtures::*;
pub use logging::init_test_tracing;
