/*
 * Declarations
 *
 * A declaration names a storage location and describes its shape. Array
 * dimensions are resolved by the front end (literal or `#define` constant);
 * struct members are inlined so member capacities are available without a
 * separate type table.
 */

use serde::{Deserialize, Serialize};

use crate::shared::models::Location;

/// Size of a data pointer on the analyzed target
pub const POINTER_SIZE: u64 = 8;

/// Shape of a declared object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    /// Scalar of `size` bytes (`None` for `void` or unknown typedefs)
    Scalar { size: Option<u64> },

    /// Pointer to `pointee`
    Pointer { pointee: Box<DeclKind> },

    /// Array of `dimension` elements (`None` when the dimension is absent)
    Array {
        dimension: Option<u64>,
        element: Box<DeclKind>,
    },

    /// Struct with inlined members
    Struct { fields: Vec<Declaration> },
}

impl DeclKind {
    /// One-byte scalar (`char`)
    pub fn char() -> Self {
        DeclKind::Scalar { size: Some(1) }
    }

    /// Four-byte scalar (`int`)
    pub fn int() -> Self {
        DeclKind::Scalar { size: Some(4) }
    }

    /// Pointer to `pointee`
    pub fn pointer_to(pointee: DeclKind) -> Self {
        DeclKind::Pointer {
            pointee: Box::new(pointee),
        }
    }

    /// Array of `dimension` elements of `element`
    pub fn array_of(element: DeclKind, dimension: u64) -> Self {
        DeclKind::Array {
            dimension: Some(dimension),
            element: Box::new(element),
        }
    }

    /// Size in bytes, when statically known.
    ///
    /// Struct sizes are never computed: member padding is target-specific.
    pub fn size_of(&self) -> Option<u64> {
        match self {
            DeclKind::Scalar { size } => *size,
            DeclKind::Pointer { .. } => Some(POINTER_SIZE),
            DeclKind::Array { dimension, element } => {
                let dim = (*dimension)?;
                dim.checked_mul(element.size_of()?)
            }
            DeclKind::Struct { .. } => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, DeclKind::Pointer { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DeclKind::Array { .. })
    }

    /// Member lookup on a struct kind
    pub fn field(&self, name: &str) -> Option<&Declaration> {
        match self {
            DeclKind::Struct { fields } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Kind obtained by indexing or dereferencing once
    pub fn element(&self) -> Option<&DeclKind> {
        match self {
            DeclKind::Array { element, .. } => Some(element),
            DeclKind::Pointer { pointee } => Some(pointee),
            _ => None,
        }
    }
}

/// Named declaration (local, parameter or struct member)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub location: Location,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind, location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
        }
    }

    /// `int name;`
    pub fn scalar(name: impl Into<String>, location: Location) -> Self {
        Self::new(name, DeclKind::int(), location)
    }

    /// `char name[dimension];`
    pub fn char_array(name: impl Into<String>, dimension: u64, location: Location) -> Self {
        Self::new(name, DeclKind::array_of(DeclKind::char(), dimension), location)
    }

    /// `int name[dimension];`
    pub fn int_array(name: impl Into<String>, dimension: u64, location: Location) -> Self {
        Self::new(name, DeclKind::array_of(DeclKind::int(), dimension), location)
    }

    /// `char *name;`
    pub fn char_pointer(name: impl Into<String>, location: Location) -> Self {
        Self::new(name, DeclKind::pointer_to(DeclKind::char()), location)
    }

    /// `int *name;`
    pub fn int_pointer(name: impl Into<String>, location: Location) -> Self {
        Self::new(name, DeclKind::pointer_to(DeclKind::int()), location)
    }

    /// Struct-typed object with the given members
    pub fn structure(
        name: impl Into<String>,
        fields: Vec<Declaration>,
        location: Location,
    ) -> Self {
        Self::new(name, DeclKind::Struct { fields }, location)
    }
}
