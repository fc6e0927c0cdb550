//! Error types for big-endian marshaling
//!
//! Every failure is terminal for the call that produced it: errors are raised
//! where they are detected and propagate with `?` through the whole traversal.
//! Prefer the constructor functions over building variants by hand.

use std::borrow::Cow;

use thiserror::Error;

/// Marshaling error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The type is not a fixed-width integer, an array, or a composite.
    #[error("unsupported type `{0}`")]
    UnsupportedType(&'static str),

    /// A read or write would touch bytes past the end of the buffer.
    #[error("out of range: {offset} + {width} > {len}")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A composite field could not be resolved.
    #[error("cannot access field `{field}` of `{ty}`")]
    FieldAccess {
        ty: Cow<'static, str>,
        field: Cow<'static, str>,
    },

    /// An array holds a different number of elements than declared.
    #[error("length mismatch: expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// The serialized size of a type does not fit in `usize`.
    #[error("serialized size overflows usize")]
    SizeOverflow,

    /// A dynamic value does not have the shape its descriptor requires.
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },
}

impl Error {
    #[cold]
    pub fn unsupported_type(name: &'static str) -> Self {
        Error::UnsupportedType(name)
    }

    #[cold]
    pub fn out_of_range(offset: usize, width: usize, len: usize) -> Self {
        Error::OutOfRange { offset, width, len }
    }

    #[cold]
    pub fn field_access<T, F>(ty: T, field: F) -> Self
    where
        T: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        Error::FieldAccess {
            ty: ty.into(),
            field: field.into(),
        }
    }

    #[cold]
    pub fn length_mismatch(expected: usize, found: usize) -> Self {
        Error::LengthMismatch { expected, found }
    }

    #[cold]
    pub fn size_overflow() -> Self {
        Error::SizeOverflow
    }

    #[cold]
    pub fn shape_mismatch<E, F>(expected: E, found: F) -> Self
    where
        E: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        Error::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::out_of_range(0, 4, 2).to_string(),
            "out of range: 0 + 4 > 2"
        );
        assert_eq!(
            Error::unsupported_type("f64").to_string(),
            "unsupported type `f64`"
        );
        assert_eq!(
            Error::field_access("Point", "z").to_string(),
            "cannot access field `z` of `Point`"
        );
        assert_eq!(
            Error::length_mismatch(3, 2).to_string(),
            "length mismatch: expected 3 elements, found 2"
        );
        assert_eq!(
            Error::size_overflow().to_string(),
            "serialized size overflows usize"
        );
    }
}
