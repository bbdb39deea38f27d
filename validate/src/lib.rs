//! ytree Validation
//!
//! Type validators for schema leaf types:
//! - String length and pattern checks (POSIX or YANG dialect, unanchored)
//! - Bit sets, numeric ranges, enumerations, binary length, unions
//! - Slice validators that reject duplicate elements
//! - List schema structure checks
//!
//! `Validator` owns the compiled-pattern cache and also runs the optional
//! whole-schema and whole-tree passes, which collect `Violations` instead of
//! stopping at the first error.

mod error;
mod kinds;
mod list;
mod pattern;
mod validator;
mod violation;

pub use error::{ValidateResult, ValidationError};
pub use kinds::{
    validate_binary, validate_bits, validate_bits_schema, validate_enum, validate_enum_schema,
    validate_range, validate_range_schema, validate_slice, validate_string,
    validate_string_schema,
};
pub use list::validate_list_schema;
pub use pattern::PatternCache;
pub use validator::Validator;
pub use violation::{Violation, Violations};
