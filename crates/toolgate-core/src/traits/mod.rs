//! Core traits for toolgate.
//!
//! - `provider` - the uniform `(method, path, body) -> result` contract every
//!   backend implements, and the closed route tables providers dispatch on.

mod provider;

pub use provider::{Provider, RouteTable};
