//! Schema definition types.

use std::collections::HashMap;
use std::fmt;

/// Identifier of a node within one `Schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub u32);

impl SchemaId {
    /// Create a new SchemaId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Leaf,
    LeafList,
    Container,
    List,
    /// Choice and Case only group their children; they never hold data.
    Choice,
    Case,
}

impl SchemaKind {
    /// Returns true for kinds that hold scalar data.
    pub fn is_leaf_like(&self) -> bool {
        matches!(self, SchemaKind::Leaf | SchemaKind::LeafList)
    }

    /// Returns true for kinds that appear as data nodes.
    pub fn is_data(&self) -> bool {
        !matches!(self, SchemaKind::Choice | SchemaKind::Case)
    }
}

/// Built-in primitive type of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Empty,
    Enumeration,
    Identityref,
    Decimal64,
    Binary,
    Bits,
    Union,
}

impl Kind {
    /// Inclusive bounds of the signed integer kinds.
    pub fn int_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Kind::Int8 => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Kind::Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Kind::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Kind::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Upper bound of the unsigned integer kinds.
    pub fn uint_max(&self) -> Option<u64> {
        match self {
            Kind::Uint8 => Some(u64::from(u8::MAX)),
            Kind::Uint16 => Some(u64::from(u16::MAX)),
            Kind::Uint32 => Some(u64::from(u32::MAX)),
            Kind::Uint64 => Some(u64::MAX),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.int_bounds().is_some() || self.uint_max().is_some() || *self == Kind::Decimal64
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Bool => "boolean",
            Kind::Empty => "empty",
            Kind::Enumeration => "enumeration",
            Kind::Identityref => "identityref",
            Kind::Decimal64 => "decimal64",
            Kind::Binary => "binary",
            Kind::Bits => "bits",
            Kind::Union => "union",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Regex dialect a pattern restriction is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternDialect {
    /// YANG / XSD patterns (Unicode classes such as `\p{L}`).
    #[default]
    Yang,
    /// POSIX extended patterns (ASCII bracket classes such as `[[:alpha:]]`).
    Posix,
}

/// One length restriction. `None` is the open `min`/`max` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LengthRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl LengthRange {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: u64) -> bool {
        self.min.map_or(true, |m| len >= m) && self.max.map_or(true, |m| len <= m)
    }
}

impl fmt::Display for LengthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(a), Some(b)) => write!(f, "{}..{}", a, b),
            (Some(a), None) => write!(f, "{}..max", a),
            (None, Some(b)) => write!(f, "min..{}", b),
            (None, None) => write!(f, "min..max"),
        }
    }
}

/// One numeric range restriction.
///
/// Bounds are compared against `Value::as_i128`, so decimal bounds are raw
/// digits at the leaf's fraction-digit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumRange {
    pub min: Option<i128>,
    pub max: Option<i128>,
}

impl NumRange {
    pub fn new(min: Option<i128>, max: Option<i128>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: i128) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }
}

impl fmt::Display for NumRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(a), Some(b)) => write!(f, "{}..{}", a, b),
            (Some(a), None) => write!(f, "{}..max", a),
            (None, Some(b)) => write!(f, "min..{}", b),
            (None, None) => write!(f, "min..max"),
        }
    }
}

/// Declared type of a leaf or leaf-list, with its restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafType {
    /// Primitive kind.
    pub kind: Kind,
    /// Length restrictions (string, binary); any one must hold.
    pub lengths: Vec<LengthRange>,
    /// Pattern restrictions (string); all must match.
    pub patterns: Vec<String>,
    /// Dialect of `patterns`.
    pub dialect: PatternDialect,
    /// Numeric range restrictions; any one must hold.
    pub ranges: Vec<NumRange>,
    /// Enumeration or identity names.
    pub enum_names: Vec<String>,
    /// Bit name -> position table.
    pub bits: HashMap<String, u32>,
    /// Scale of decimal64 values.
    pub fraction_digits: u8,
    /// Member types of a union, tried in declaration order.
    pub members: Vec<LeafType>,
}

impl LeafType {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            lengths: Vec::new(),
            patterns: Vec::new(),
            dialect: PatternDialect::default(),
            ranges: Vec::new(),
            enum_names: Vec::new(),
            bits: HashMap::new(),
            fraction_digits: 0,
            members: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ty = Self::new(Kind::Enumeration);
        ty.enum_names = names.into_iter().map(Into::into).collect();
        ty
    }

    pub fn decimal64(fraction_digits: u8) -> Self {
        let mut ty = Self::new(Kind::Decimal64);
        ty.fraction_digits = fraction_digits;
        ty
    }

    pub fn union(members: Vec<LeafType>) -> Self {
        let mut ty = Self::new(Kind::Union);
        ty.members = members;
        ty
    }

    pub fn with_length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.lengths.push(LengthRange::new(min, max));
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Interpret the patterns as POSIX expressions.
    pub fn posix(mut self) -> Self {
        self.dialect = PatternDialect::Posix;
        self
    }

    pub fn with_range(mut self, min: Option<i128>, max: Option<i128>) -> Self {
        self.ranges.push(NumRange::new(min, max));
        self
    }

    pub fn with_bit(mut self, name: impl Into<String>, position: u32) -> Self {
        self.bits.insert(name.into(), position);
        self
    }
}
