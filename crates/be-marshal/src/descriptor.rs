//! Run-time type descriptors
//!
//! A [`TypeDescriptor`] is the schema of a marshalable type: which shape it
//! has and, recursively, the shapes it is built from. Descriptors are derived
//! on demand from [`Marshal::descriptor`](crate::Marshal::descriptor) and are
//! the single source of truth for a type's size and field order.

use core::fmt;

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};

/// Fixed-width integer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl PrimitiveKind {
    /// Width in bytes
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::I8 => 1,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::U32 | PrimitiveKind::I32 => 4,
            PrimitiveKind::U64 | PrimitiveKind::I64 => 8,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    /// Rust name of the kind
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I64 => "i64",
        }
    }

    /// Mask selecting the low `width` bytes of a bit pattern
    #[inline]
    pub const fn mask(self) -> u64 {
        match self.width() {
            8 => u64::MAX,
            w => (1u64 << (w * 8)) - 1,
        }
    }

    /// Read one value of this kind as its unsigned bit pattern
    #[inline]
    pub fn read_bits(self, reader: &mut Reader<'_>) -> Result<u64> {
        reader.read_uint(self.width())
    }

    /// Write the low bytes of `bits` as one value of this kind
    #[inline]
    pub fn write_bits(self, bits: u64, writer: &mut Writer<'_>) -> Result<()> {
        writer.write_uint(bits, self.width())
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three shapes a supported type can take, plus the unsupported leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Primitive,
    Array,
    Composite,
    Unsupported,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive => write!(f, "primitive"),
            Shape::Array => write!(f, "array"),
            Shape::Composite => write!(f, "composite"),
            Shape::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A named field of a composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ty: TypeDescriptor) -> Self {
        Self { name, ty }
    }
}

/// Shape of a marshalable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Fixed-width integer
    Primitive(PrimitiveKind),
    /// `len` consecutive elements of one type
    Array {
        element: Box<TypeDescriptor>,
        len: usize,
    },
    /// Named fields in declaration order
    Composite {
        name: &'static str,
        fields: Vec<FieldDescriptor>,
    },
    /// A leaf type outside the primitive set
    Unsupported { name: &'static str },
}

impl TypeDescriptor {
    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            len,
        }
    }

    pub fn composite(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        TypeDescriptor::Composite { name, fields }
    }

    pub fn shape(&self) -> Shape {
        match self {
            TypeDescriptor::Primitive(_) => Shape::Primitive,
            TypeDescriptor::Array { .. } => Shape::Array,
            TypeDescriptor::Composite { .. } => Shape::Composite,
            TypeDescriptor::Unsupported { .. } => Shape::Unsupported,
        }
    }

    /// Human-readable name, used in error messages
    pub fn name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(kind) => kind.name().to_owned(),
            TypeDescriptor::Array { element, len } => format!("[{}; {}]", element.name(), len),
            TypeDescriptor::Composite { name, .. } => (*name).to_owned(),
            TypeDescriptor::Unsupported { name } => (*name).to_owned(),
        }
    }

    /// Fields of a composite, empty for every other shape
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            TypeDescriptor::Composite { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Serialized size in bytes
    ///
    /// Fails with [`Error::UnsupportedType`] if any reachable leaf is unsupported,
    /// and with [`Error::SizeOverflow`] if the total does not fit in `usize`.
    pub fn size(&self) -> Result<usize> {
        match self {
            TypeDescriptor::Primitive(kind) => Ok(kind.width()),
            TypeDescriptor::Array { element, len } => element
                .size()?
                .checked_mul(*len)
                .ok_or_else(Error::size_overflow),
            TypeDescriptor::Composite { fields, .. } => {
                let mut total = 0usize;
                for field in fields {
                    total = total
                        .checked_add(field.ty.size()?)
                        .ok_or_else(Error::size_overflow)?;
                }
                Ok(total)
            }
            TypeDescriptor::Unsupported { name } => Err(Error::unsupported_type(*name)),
        }
    }

    /// Byte offset of a composite field relative to the start of the composite
    pub fn field_offset(&self, field: &str) -> Result<usize> {
        let mut offset = 0;
        for f in self.fields() {
            if f.name == field {
                return Ok(offset);
            }
            offset = offset
                .checked_add(f.ty.size()?)
                .ok_or_else(Error::size_overflow)?;
        }
        Err(Error::field_access(self.name(), field.to_owned()))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Composite { name, fields } => {
                write!(f, "{} {{", name)?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            TypeDescriptor::Array { element, len } => write!(f, "[{}; {}]", element, len),
            other => f.write_str(&other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TypeDescriptor {
        TypeDescriptor::composite(
            "Header",
            vec![
                FieldDescriptor::new("a", TypeDescriptor::Primitive(PrimitiveKind::U16)),
                FieldDescriptor::new(
                    "b",
                    TypeDescriptor::array(TypeDescriptor::Primitive(PrimitiveKind::U8), 2),
                ),
                FieldDescriptor::new("c", TypeDescriptor::Primitive(PrimitiveKind::I64)),
            ],
        )
    }

    #[test]
    fn test_widths() {
        assert_eq!(PrimitiveKind::I8.width(), 1);
        assert_eq!(PrimitiveKind::U16.width(), 2);
        assert_eq!(PrimitiveKind::I32.width(), 4);
        assert_eq!(PrimitiveKind::U64.width(), 8);
        assert_eq!(PrimitiveKind::U16.mask(), 0xFFFF);
        assert_eq!(PrimitiveKind::I64.mask(), u64::MAX);
    }

    #[test]
    fn test_composite_size() {
        assert_eq!(header().size().unwrap(), 12);
        assert_eq!(header().shape(), Shape::Composite);
    }

    #[test]
    fn test_field_offset() {
        let desc = header();
        assert_eq!(desc.field_offset("a").unwrap(), 0);
        assert_eq!(desc.field_offset("b").unwrap(), 2);
        assert_eq!(desc.field_offset("c").unwrap(), 4);
        assert_eq!(
            desc.field_offset("d"),
            Err(Error::field_access("Header", "d"))
        );
    }

    #[test]
    fn test_unsupported_leaf_poisons_size() {
        let desc = TypeDescriptor::composite(
            "Sample",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::Primitive(PrimitiveKind::U8)),
                FieldDescriptor::new("value", TypeDescriptor::Unsupported { name: "f64" }),
            ],
        );
        assert_eq!(desc.size(), Err(Error::unsupported_type("f64")));
    }

    #[test]
    fn test_size_overflow() {
        let huge = TypeDescriptor::array(
            TypeDescriptor::Primitive(PrimitiveKind::U64),
            usize::MAX / 4,
        );
        assert_eq!(huge.size(), Err(Error::size_overflow()));

        // each field fits on its own, the sum does not
        let half = TypeDescriptor::array(
            TypeDescriptor::Primitive(PrimitiveKind::U8),
            usize::MAX / 2 + 1,
        );
        let desc = TypeDescriptor::composite(
            "Wide",
            vec![
                FieldDescriptor::new("lo", half.clone()),
                FieldDescriptor::new("hi", half),
                FieldDescriptor::new("tail", TypeDescriptor::Primitive(PrimitiveKind::U8)),
            ],
        );
        assert_eq!(desc.size(), Err(Error::size_overflow()));
        assert_eq!(desc.field_offset("hi").unwrap(), usize::MAX / 2 + 1);
        assert_eq!(desc.field_offset("tail"), Err(Error::size_overflow()));
    }

    #[test]
    fn test_display() {
        assert_eq!(header().to_string(), "Header { a: u16, b: [u8; 2], c: i64 }");
    }
}
