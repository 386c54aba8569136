//! Propagation orchestrator and the node model it walks

mod node;
mod orchestrator;

pub use node::{
    ChildRelation, ContributionType, NodeFacts, NodeLoader, SecurableNode, Visibility,
};
pub use orchestrator::{propagate, PolicyPropagator};
