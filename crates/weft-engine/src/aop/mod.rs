//! Aspect-oriented programming support
//!
//! Pointcut filters decide which join points (methods of reflected classes)
//! an aspect's advice applies to. Proxy generation asks every configured
//! filter about every declared method; [`matching_methods`] is that scan for
//! a single filter and class.

mod error;
mod filter;

pub use error::AopError;
pub use filter::{matching_methods, PointcutFilter, PointcutMethodTaggedWithFilter, QueryId};
