//! Service layer
//!
//! Binds the parser, resolvers and ownership walk to one lister and one
//! selector so commands deal with a single handle.

pub mod resolution_service;

pub use resolution_service::ResolutionService;
