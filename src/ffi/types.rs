//! Package Type System
//!
//! Runtime tags carried by engine packages and the host-side values they
//! decode into.

use std::fmt;

use libc::{c_int, c_long, c_uint, c_ulong};
use serde::Serialize;

use super::error::{MarshalError, MarshalResult};

/// Width and signedness of a flat scalar run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// C `int`
    Int,
    /// C `unsigned int`
    UInt,
    /// C `float`
    Float,
    /// C `double`
    Double,
    /// C `long` (platform width)
    Long,
    /// C `unsigned long` (platform width)
    ULong,
}

impl ScalarKind {
    /// Size in bytes of one element as the engine lays it out
    pub fn size(&self) -> usize {
        match self {
            ScalarKind::Int => std::mem::size_of::<c_int>(),
            ScalarKind::UInt => std::mem::size_of::<c_uint>(),
            ScalarKind::Float => std::mem::size_of::<f32>(),
            ScalarKind::Double => std::mem::size_of::<f64>(),
            ScalarKind::Long => std::mem::size_of::<c_long>(),
            ScalarKind::ULong => std::mem::size_of::<c_ulong>(),
        }
    }

    /// Check if this kind is an integer kind
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Check if this kind is a floating point kind
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::UInt => write!(f, "unsigned int"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Double => write!(f, "double"),
            ScalarKind::Long => write!(f, "long"),
            ScalarKind::ULong => write!(f, "unsigned long"),
        }
    }
}

/// Discriminator stored in every package header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `size` contiguous scalars of one kind
    Scalar(ScalarKind),
    /// `size` pointers to sub-packages
    List,
}

impl TypeTag {
    pub const INT: u32 = 0;
    pub const UNSIGNED_INT: u32 = 1;
    pub const FLOAT: u32 = 2;
    pub const DOUBLE: u32 = 3;
    pub const LONG: u32 = 4;
    pub const UNSIGNED_LONG: u32 = 5;
    pub const LIST: u32 = 6;

    /// Decode the raw header value. Unknown codes are a protocol error.
    pub fn from_code(code: u32) -> MarshalResult<Self> {
        match code {
            Self::INT => Ok(TypeTag::Scalar(ScalarKind::Int)),
            Self::UNSIGNED_INT => Ok(TypeTag::Scalar(ScalarKind::UInt)),
            Self::FLOAT => Ok(TypeTag::Scalar(ScalarKind::Float)),
            Self::DOUBLE => Ok(TypeTag::Scalar(ScalarKind::Double)),
            Self::LONG => Ok(TypeTag::Scalar(ScalarKind::Long)),
            Self::UNSIGNED_LONG => Ok(TypeTag::Scalar(ScalarKind::ULong)),
            Self::LIST => Ok(TypeTag::List),
            other => Err(MarshalError::UnknownTypeTag(other)),
        }
    }

    /// Raw header value for this tag
    pub fn code(&self) -> u32 {
        match self {
            TypeTag::Scalar(ScalarKind::Int) => Self::INT,
            TypeTag::Scalar(ScalarKind::UInt) => Self::UNSIGNED_INT,
            TypeTag::Scalar(ScalarKind::Float) => Self::FLOAT,
            TypeTag::Scalar(ScalarKind::Double) => Self::DOUBLE,
            TypeTag::Scalar(ScalarKind::Long) => Self::LONG,
            TypeTag::Scalar(ScalarKind::ULong) => Self::UNSIGNED_LONG,
            TypeTag::List => Self::LIST,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Scalar(kind) => write!(f, "{}", kind),
            TypeTag::List => write!(f, "list"),
        }
    }
}

/// A single decoded scalar, kept at the width the engine wrote it with
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
    Long(i64),
    ULong(u64),
}

impl Scalar {
    /// Kind this scalar was read as
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::UInt(_) => ScalarKind::UInt,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::ULong(_) => ScalarKind::ULong,
        }
    }

    /// Numeric value as a double
    pub fn to_f64(&self) -> f64 {
        match *self {
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v as f64,
            Scalar::Double(v) => v,
            Scalar::Long(v) => v as f64,
            Scalar::ULong(v) => v as f64,
        }
    }

    /// Non-negative integer value, `None` for floats and negatives
    pub fn to_u64(&self) -> Option<u64> {
        match *self {
            Scalar::Int(v) => u64::try_from(v).ok(),
            Scalar::UInt(v) => Some(v as u64),
            Scalar::Long(v) => u64::try_from(v).ok(),
            Scalar::ULong(v) => Some(v),
            Scalar::Float(_) | Scalar::Double(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::ULong(v) => write!(f, "{}", v),
        }
    }
}

/// Host-side value of a decoded package
///
/// A package always decodes to a `List`; `Scalar` only appears as an
/// element of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestedValue {
    Scalar(Scalar),
    List(Vec<NestedValue>),
}

impl NestedValue {
    /// The empty list a null package decodes to
    pub fn empty() -> Self {
        NestedValue::List(Vec::new())
    }

    pub fn as_list(&self) -> Option<&[NestedValue]> {
        match self {
            NestedValue::List(items) => Some(items),
            NestedValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            NestedValue::Scalar(s) => Some(*s),
            NestedValue::List(_) => None,
        }
    }

    /// True for an empty list
    pub fn is_empty(&self) -> bool {
        matches!(self, NestedValue::List(items) if items.is_empty())
    }

    /// Maximum list nesting below this value (a flat run has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            NestedValue::Scalar(_) => 0,
            NestedValue::List(items) => 1 + items.iter().map(|v| v.depth()).max().unwrap_or(0),
        }
    }

    fn into_items(self, what: &str) -> MarshalResult<Vec<NestedValue>> {
        match self {
            NestedValue::List(items) => Ok(items),
            NestedValue::Scalar(s) => Err(MarshalError::MalformedPackage(format!(
                "expected {}, found scalar {}",
                what, s
            ))),
        }
    }

    fn into_scalar(self, what: &str) -> MarshalResult<Scalar> {
        match self {
            NestedValue::Scalar(s) => Ok(s),
            NestedValue::List(_) => Err(MarshalError::MalformedPackage(format!(
                "expected {}, found list",
                what
            ))),
        }
    }

    /// Flat run of numbers, e.g. one neuron's weight vector
    pub fn into_f64_vec(self) -> MarshalResult<Vec<f64>> {
        self.into_items("flat numeric list")?
            .into_iter()
            .map(|item| item.into_scalar("number").map(|s| s.to_f64()))
            .collect()
    }

    /// List of flat numeric runs
    pub fn into_f64_matrix(self) -> MarshalResult<Vec<Vec<f64>>> {
        self.into_items("list of numeric lists")?
            .into_iter()
            .map(NestedValue::into_f64_vec)
            .collect()
    }

    /// Flat run of object or neuron indices
    pub fn into_index_vec(self) -> MarshalResult<Vec<u32>> {
        self.into_items("flat index list")?
            .into_iter()
            .map(|item| {
                let scalar = item.into_scalar("index")?;
                scalar
                    .to_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| {
                        MarshalError::MalformedPackage(format!("{} is not a valid index", scalar))
                    })
            })
            .collect()
    }

    /// List of index runs
    pub fn into_index_lists(self) -> MarshalResult<Vec<Vec<u32>>> {
        self.into_items("list of index lists")?
            .into_iter()
            .map(NestedValue::into_index_vec)
            .collect()
    }
}

impl From<Scalar> for NestedValue {
    fn from(s: Scalar) -> Self {
        NestedValue::Scalar(s)
    }
}

impl From<Vec<NestedValue>> for NestedValue {
    fn from(items: Vec<NestedValue>) -> Self {
        NestedValue::List(items)
    }
}
