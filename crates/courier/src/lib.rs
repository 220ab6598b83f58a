//! Courier - API collections generated from a route table
//!
//! Turns route descriptors and their validation rules into a collection
//! document with example request bodies, and merges each regeneration with
//! the previously published document so hand-curated fields survive.
//!
//! # Overview
//!
//! - [`interpret`] - validation rule tokens to a field descriptor
//! - [`synthesize`] - field descriptors to a nested example body
//! - [`assemble`] - routes to a grouped collection document
//! - [`reconcile()`] - fresh document merged with the prior one
//! - [`Generator`] - one full cycle through the local and remote stores

pub mod assembler;
pub mod body;
pub mod config;
pub mod error;
pub mod field_path;
pub mod filter;
pub mod interpreter;
pub mod naming;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod sync;
mod test_helpers;

pub use assembler::{assemble, build_request};
pub use body::{FieldMap, describe_fields, synthesize};
pub use config::{
    CollectionConfig, CourierConfig, ExampleValues, GroupBy, MergeConfig, OutputConfig,
    RemoteConfig, RequestBodyConfig, RoutesConfig,
};
pub use error::{CourierError, CourierResult};
pub use filter::RouteFilter;
pub use interpreter::interpret;
pub use reconcile::{Reconciler, reconcile};
pub use source::{Manifest, NoRules, RouteSource, RuleSource};
pub use store::{FsStore, LocalStore, MemoryRemote, RemoteEntry, RemoteStore};
pub use sync::{CycleReport, Generator};
