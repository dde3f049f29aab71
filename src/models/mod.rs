//! Resource model layer
//!
//! This module provides the kind vocabulary and the generic object shape the
//! resolvers, the ownership graph and the listers exchange.
//!
//! Structure:
//! - `kind.rs` - Shorthand expansion and the pod-producing kind set
//! - `resource.rs` - Generic resource objects and their identity keys

pub mod kind;
pub mod resource;

pub use kind::{PodSourceKind, expand_shortname};
pub use resource::{OwnerRef, ResourceKey, ResourceObject};
