//! Primitive type implementations

use crate::cursor::{Reader, Writer};
use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::Result;
use crate::traits::Marshal;

// === Fixed-width integers ===

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Marshal for $ty {
                #[inline]
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Primitive(PrimitiveKind::$kind)
                }

                #[inline]
                fn read(reader: &mut Reader<'_>) -> Result<Self> {
                    Ok(PrimitiveKind::$kind.read_bits(reader)? as $ty)
                }

                #[inline]
                fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
                    // sign-extended for signed kinds; write_bits keeps the low bytes
                    PrimitiveKind::$kind.write_bits(*self as u64, writer)
                }

                #[inline]
                fn size() -> Result<usize> {
                    Ok(PrimitiveKind::$kind.width())
                }
            }
        )*
    };
}

impl_integer! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
}

// === Floating point ===

#[cfg(not(feature = "float"))]
mod float_impl {
    use super::*;
    use crate::error::Error;

    macro_rules! impl_unsupported {
        ($($ty:ty),*) => {
            $(
                impl Marshal for $ty {
                    fn descriptor() -> TypeDescriptor {
                        TypeDescriptor::Unsupported { name: stringify!($ty) }
                    }

                    fn read(_reader: &mut Reader<'_>) -> Result<Self> {
                        Err(Error::unsupported_type(stringify!($ty)))
                    }

                    fn write(&self, _writer: &mut Writer<'_>) -> Result<()> {
                        Err(Error::unsupported_type(stringify!($ty)))
                    }
                }
            )*
        };
    }

    impl_unsupported!(f32, f64);
}

// IEEE-754 bit patterns through the unsigned kind of the same width
#[cfg(feature = "float")]
mod float_impl {
    use super::*;

    impl Marshal for f32 {
        #[inline]
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::Primitive(PrimitiveKind::U32)
        }

        #[inline]
        fn read(reader: &mut Reader<'_>) -> Result<Self> {
            Ok(f32::from_bits(reader.read_u32()?))
        }

        #[inline]
        fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
            writer.write_u32(self.to_bits())
        }
    }

    impl Marshal for f64 {
        #[inline]
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::Primitive(PrimitiveKind::U64)
        }

        #[inline]
        fn read(reader: &mut Reader<'_>) -> Result<Self> {
            Ok(f64::from_bits(reader.read_u64()?))
        }

        #[inline]
        fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
            writer.write_u64(self.to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_round_trip() {
        let mut buf = [0u8; 30];
        let mut writer = Writer::new(&mut buf);

        42u8.write(&mut writer).unwrap();
        (-42i8).write(&mut writer).unwrap();
        1000u16.write(&mut writer).unwrap();
        (-1000i16).write(&mut writer).unwrap();
        100000u32.write(&mut writer).unwrap();
        (-100000i32).write(&mut writer).unwrap();
        10000000000u64.write(&mut writer).unwrap();
        assert_eq!(writer.position(), 22);

        let mut reader = Reader::new(&buf);
        assert_eq!(u8::read(&mut reader).unwrap(), 42);
        assert_eq!(i8::read(&mut reader).unwrap(), -42);
        assert_eq!(u16::read(&mut reader).unwrap(), 1000);
        assert_eq!(i16::read(&mut reader).unwrap(), -1000);
        assert_eq!(u32::read(&mut reader).unwrap(), 100000);
        assert_eq!(i32::read(&mut reader).unwrap(), -100000);
        assert_eq!(u64::read(&mut reader).unwrap(), 10000000000);
    }

    #[test]
    fn test_i64_extremes() {
        let mut buf = [0u8; 16];
        let mut writer = Writer::new(&mut buf);
        i64::MIN.write(&mut writer).unwrap();
        i64::MAX.write(&mut writer).unwrap();
        assert_eq!(&buf[..8], &[0x80, 0, 0, 0, 0, 0, 0, 0]);

        let mut reader = Reader::new(&buf);
        assert_eq!(i64::read(&mut reader).unwrap(), i64::MIN);
        assert_eq!(i64::read(&mut reader).unwrap(), i64::MAX);
    }

    #[test]
    fn test_negative_i8_is_one_byte() {
        let mut buf = [0u8; 2];
        let mut writer = Writer::new(&mut buf);
        (-1i8).write(&mut writer).unwrap();
        assert_eq!(writer.position(), 1);
        assert_eq!(buf, [0xFF, 0x00]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(u8::size().unwrap(), 1);
        assert_eq!(i16::size().unwrap(), 2);
        assert_eq!(u32::size().unwrap(), 4);
        assert_eq!(i64::size().unwrap(), 8);
    }

    #[cfg(not(feature = "float"))]
    #[test]
    fn test_float_unsupported() {
        use crate::error::Error;

        assert_eq!(f64::size(), Err(Error::unsupported_type("f64")));
        assert_eq!(f32::size(), Err(Error::unsupported_type("f32")));

        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        assert_eq!(
            1.5f64.write(&mut writer),
            Err(Error::unsupported_type("f64"))
        );
        let mut reader = Reader::new(&buf);
        assert_eq!(f32::read(&mut reader), Err(Error::unsupported_type("f32")));
    }

    #[cfg(feature = "float")]
    #[test]
    fn test_float_bit_patterns() {
        let mut buf = [0u8; 12];
        let mut writer = Writer::new(&mut buf);
        1.0f32.write(&mut writer).unwrap();
        (-2.5f64).write(&mut writer).unwrap();
        assert_eq!(&buf[..4], &[0x3F, 0x80, 0x00, 0x00]);

        let mut reader = Reader::new(&buf);
        assert_eq!(f32::read(&mut reader).unwrap(), 1.0);
        assert_eq!(f64::read(&mut reader).unwrap(), -2.5);
        assert!(matches!(f64::size(), Ok(8)));
    }
}
