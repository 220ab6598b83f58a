//! Courier Core - route, rule and collection structure definitions
//!
//! Provides the route descriptors read from a host application, the validation
//! rule grammar, and structures conforming to the v2.1 collection format.

pub mod collection;
pub mod field;
pub mod route;
pub mod rule;

pub use collection::*;
pub use field::*;
pub use route::*;
pub use rule::*;
