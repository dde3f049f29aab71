//! Ownership tracing
//!
//! Walks a resource's `ownerReferences` up to its top-level owners and
//! renders the result as an indented tree, e.g. a pod under its ReplicaSet
//! under its Deployment. Owner-reference data comes from the cluster and may
//! be cyclic; every walk terminates regardless.

mod core;
mod models;
mod render;

pub use core::build_ownership_graph;
pub use models::{NodeStatus, OwnershipNode};
pub use render::render_tree;
