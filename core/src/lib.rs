//! ytree Core Types
//!
//! This crate provides the foundational types used throughout ytree:
//! - Scalar values (the Value enum, fixed-point Decimal64)
//! - Structured paths (Path, PathElem) with canonical rendering and joins
//! - Common error types

mod error;
mod path;
mod value;

pub use error::*;
pub use path::*;
pub use value::*;
