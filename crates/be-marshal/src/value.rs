//! Dynamically typed values driven by a [`TypeDescriptor`]
//!
//! When a type is only known at run time, its descriptor serves as an
//! explicit schema: [`TypeDescriptor::read_value`] and
//! [`TypeDescriptor::write_value`] walk it with the same shape dispatch and
//! byte layout as the typed [`Marshal`](crate::Marshal) implementations.

use std::borrow::Cow;

use crate::cursor::{Reader, Writer};
use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::{Error, Result};

/// A fixed-width integer stored as its bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    kind: PrimitiveKind,
    bits: u64,
}

impl Primitive {
    /// Bits above the kind's width are discarded.
    pub fn new(kind: PrimitiveKind, bits: u64) -> Self {
        Self {
            kind,
            bits: bits & kind.mask(),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Unsigned bit pattern, zero-extended
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Value as a signed integer, sign-extended for signed kinds
    pub fn as_i64(&self) -> i64 {
        if self.kind.is_signed() {
            let shift = 64 - self.kind.width() * 8;
            ((self.bits << shift) as i64) >> shift
        } else {
            self.bits as i64
        }
    }
}

/// A value shaped like some [`TypeDescriptor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Primitive(Primitive),
    Array(Vec<Value>),
    Composite(Vec<(Cow<'static, str>, Value)>),
}

macro_rules! impl_from_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Primitive(Primitive::new(PrimitiveKind::$kind, value as u64))
                }
            }
        )*
    };
}

impl_from_integer! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
}

impl Value {
    /// Build a composite from `(name, value)` pairs in declaration order
    pub fn composite<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<Cow<'static, str>>,
    {
        Value::Composite(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Value::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Look up a composite field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Composite(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    fn shape_name(&self) -> Cow<'static, str> {
        match self {
            Value::Primitive(p) => Cow::Borrowed(p.kind().name()),
            Value::Array(items) => Cow::Owned(format!("array of {}", items.len())),
            Value::Composite(_) => Cow::Borrowed("composite"),
        }
    }
}

impl TypeDescriptor {
    /// The value a default-constructed instance would hold: all zeros
    pub fn default_value(&self) -> Result<Value> {
        match self {
            TypeDescriptor::Primitive(kind) => Ok(Value::Primitive(Primitive::new(*kind, 0))),
            TypeDescriptor::Array { element, len } => {
                let item = element.default_value()?;
                Ok(Value::Array(vec![item; *len]))
            }
            TypeDescriptor::Composite { fields, .. } => fields
                .iter()
                .map(|f| -> Result<(Cow<'static, str>, Value)> {
                    Ok((Cow::Borrowed(f.name), f.ty.default_value()?))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Composite),
            TypeDescriptor::Unsupported { name } => Err(Error::unsupported_type(*name)),
        }
    }

    /// Read one value of this shape at the reader's position
    pub fn read_value(&self, reader: &mut Reader<'_>) -> Result<Value> {
        match self {
            TypeDescriptor::Primitive(kind) => {
                let bits = kind.read_bits(reader)?;
                Ok(Value::Primitive(Primitive::new(*kind, bits)))
            }
            TypeDescriptor::Array { element, len } => {
                let mut items = Vec::with_capacity((*len).min(reader.remaining()));
                for _ in 0..*len {
                    items.push(element.read_value(reader)?);
                }
                Ok(Value::Array(items))
            }
            TypeDescriptor::Composite { fields, .. } => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((Cow::Borrowed(field.name), field.ty.read_value(reader)?));
                }
                Ok(Value::Composite(values))
            }
            TypeDescriptor::Unsupported { name } => Err(Error::unsupported_type(*name)),
        }
    }

    /// Write `value` at the writer's position
    ///
    /// The value must match this descriptor exactly: same primitive kinds,
    /// same array lengths, same field names in the same order.
    pub fn write_value(&self, value: &Value, writer: &mut Writer<'_>) -> Result<()> {
        match (self, value) {
            (TypeDescriptor::Primitive(kind), Value::Primitive(p)) => {
                if p.kind() != *kind {
                    return Err(Error::shape_mismatch(kind.name(), p.kind().name()));
                }
                kind.write_bits(p.bits(), writer)
            }
            (TypeDescriptor::Array { element, len }, Value::Array(items)) => {
                if items.len() != *len {
                    return Err(Error::length_mismatch(*len, items.len()));
                }
                for item in items {
                    element.write_value(item, writer)?;
                }
                Ok(())
            }
            (TypeDescriptor::Composite { name, fields }, Value::Composite(values)) => {
                for (i, field) in fields.iter().enumerate() {
                    match values.get(i) {
                        Some((value_name, value)) if value_name == field.name => {
                            field.ty.write_value(value, writer)?
                        }
                        _ => return Err(Error::field_access(*name, field.name)),
                    }
                }
                if let Some((extra, _)) = values.get(fields.len()) {
                    return Err(Error::field_access(*name, extra.clone()));
                }
                Ok(())
            }
            (TypeDescriptor::Unsupported { name }, _) => Err(Error::unsupported_type(*name)),
            (desc, value) => Err(Error::shape_mismatch(desc.shape().to_string(), value.shape_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    fn record() -> TypeDescriptor {
        TypeDescriptor::composite(
            "Record",
            vec![
                FieldDescriptor::new("a", TypeDescriptor::Primitive(PrimitiveKind::U16)),
                FieldDescriptor::new(
                    "b",
                    TypeDescriptor::array(TypeDescriptor::Primitive(PrimitiveKind::U8), 2),
                ),
            ],
        )
    }

    #[test]
    fn test_primitive_sign_extension() {
        let p = Primitive::new(PrimitiveKind::I16, 0xFFFE);
        assert_eq!(p.as_i64(), -2);
        let p = Primitive::new(PrimitiveKind::U16, 0xFFFE);
        assert_eq!(p.as_i64(), 0xFFFE);
        // high bits are dropped
        assert_eq!(Primitive::new(PrimitiveKind::U8, 0x1FF).bits(), 0xFF);
        assert_eq!(Value::from(-1i8), Value::Primitive(Primitive::new(PrimitiveKind::I8, 0xFF)));
    }

    #[test]
    fn test_read_write_value() {
        let value = Value::composite([
            ("a", Value::from(0x0102u16)),
            ("b", Value::Array(vec![Value::from(3u8), Value::from(4u8)])),
        ]);

        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);
        record().write_value(&value, &mut writer).unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);

        let mut reader = Reader::new(&buf);
        assert_eq!(record().read_value(&mut reader).unwrap(), value);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_default_value_size() {
        let value = record().default_value().unwrap();
        let mut buf = vec![0xAA; record().size().unwrap()];
        let mut writer = Writer::new(&mut buf);
        record().write_value(&value, &mut writer).unwrap();
        assert_eq!(buf, vec![0u8; 4]);
    }

    #[test]
    fn test_missing_field() {
        let value = Value::composite([("a", Value::from(1u16))]);
        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);
        assert_eq!(
            record().write_value(&value, &mut writer),
            Err(Error::field_access("Record", "b"))
        );
    }

    #[test]
    fn test_extra_field() {
        let mut value = record().default_value().unwrap();
        if let Value::Composite(fields) = &mut value {
            fields.push((Cow::Borrowed("c"), Value::from(0u8)));
        }
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        assert_eq!(
            record().write_value(&value, &mut writer),
            Err(Error::field_access("Record", "c"))
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let desc = TypeDescriptor::Primitive(PrimitiveKind::U32);
        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);
        assert_eq!(
            desc.write_value(&Value::from(1i32), &mut writer),
            Err(Error::shape_mismatch("u32", "i32"))
        );
        assert_eq!(
            desc.write_value(&Value::Array(vec![]), &mut writer),
            Err(Error::shape_mismatch("primitive", "array of 0"))
        );
    }

    #[test]
    fn test_array_length_mismatch() {
        let desc = TypeDescriptor::array(TypeDescriptor::Primitive(PrimitiveKind::U8), 2);
        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);
        assert_eq!(
            desc.write_value(&Value::Array(vec![Value::from(1u8)]), &mut writer),
            Err(Error::length_mismatch(2, 1))
        );
    }
}
