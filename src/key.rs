//! Key descriptors for grouping and pairing operators.
//!
//! A [`KeyDescriptor`] names an ordered set of record field positions together
//! with the comparable type stored at those positions. Grouping operators
//! declare the key they group on; dual-input operators declare one key per
//! side. The optimizer compares descriptors positionally: two descriptors are
//! the same key only if they name the same fields in the same order with the
//! same type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The comparable type of a key field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Int,
    Long,
    Text,
    Bytes,
}

/// An ordered set of field positions plus the key's comparable type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyDescriptor {
    fields: Vec<usize>,
    key_type: KeyType,
}

impl KeyDescriptor {
    pub fn new(fields: Vec<usize>, key_type: KeyType) -> Self {
        Self { fields, key_type }
    }

    /// The record field positions making up the key, in declaration order.
    pub fn fields(&self) -> &[usize] {
        &self.fields
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// A key with no fields cannot be grouped or partitioned on.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "]:{:?}", self.key_type)
    }
}
