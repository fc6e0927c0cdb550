//! Marshaling trait

use crate::cursor::{Reader, Writer};
use crate::descriptor::TypeDescriptor;
use crate::error::Result;

/// Types with a fixed big-endian layout
///
/// Implemented by the library for fixed-width integers and `[T; N]`, and by
/// `#[derive(Marshal)]` for composites. `descriptor`, `read` and `write` must
/// agree on field order and byte count: `Self::size()` bytes are consumed by
/// `read` and produced by `write`.
pub trait Marshal: Sized {
    /// Describe the shape of this type
    fn descriptor() -> TypeDescriptor;

    /// Read one value at the reader's position, advancing it
    fn read(reader: &mut Reader<'_>) -> Result<Self>;

    /// Write this value at the writer's position, advancing it
    fn write(&self, writer: &mut Writer<'_>) -> Result<()>;

    /// Serialized size in bytes, computed without an instance
    fn size() -> Result<usize> {
        Self::descriptor().size()
    }
}
