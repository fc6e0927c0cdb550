//! Array traversal
//!
//! Arrays are `len` elements laid out back to back in index order, with no
//! length prefix: the length has to be known before reading, either from the
//! type (`[T; N]`), from the caller, or from a `#[marshal(len = N)]` field.

use crate::cursor::{Reader, Writer};
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::traits::Marshal;

/// Read `len` consecutive elements in index order
pub fn read_seq<T: Marshal>(reader: &mut Reader<'_>, len: usize) -> Result<Vec<T>> {
    let mut items = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        items.push(T::read(reader)?);
    }
    Ok(items)
}

/// Fill a pre-sized slice in index order
pub fn read_seq_into<T: Marshal>(reader: &mut Reader<'_>, out: &mut [T]) -> Result<()> {
    for item in out.iter_mut() {
        *item = T::read(reader)?;
    }
    Ok(())
}

/// Write every element in index order, checking the declared length first
pub fn write_seq<T: Marshal>(writer: &mut Writer<'_>, items: &[T], len: usize) -> Result<()> {
    if items.len() != len {
        return Err(Error::length_mismatch(len, items.len()));
    }
    for item in items {
        item.write(writer)?;
    }
    Ok(())
}

// === Fixed-size arrays ===

impl<T: Marshal, const N: usize> Marshal for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor(), N)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let items = read_seq::<T>(reader, N)?;
        items
            .try_into()
            .map_err(|items: Vec<T>| Error::length_mismatch(N, items.len()))
    }

    fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
        write_seq(writer, self, N)
    }
}

/// Heap sequences whose length is declared by the containing composite
///
/// Backs `#[marshal(len = N)]` fields: the sequence itself carries no length
/// on the wire, so every operation takes the declared length.
pub trait FixedSeq: Sized {
    type Item: Marshal;

    fn descriptor(len: usize) -> TypeDescriptor {
        TypeDescriptor::array(Self::Item::descriptor(), len)
    }

    fn read_fixed(reader: &mut Reader<'_>, len: usize) -> Result<Self>;

    fn write_fixed(&self, writer: &mut Writer<'_>, len: usize) -> Result<()>;
}

impl<T: Marshal> FixedSeq for Vec<T> {
    type Item = T;

    fn read_fixed(reader: &mut Reader<'_>, len: usize) -> Result<Self> {
        read_seq(reader, len)
    }

    fn write_fixed(&self, writer: &mut Writer<'_>, len: usize) -> Result<()> {
        write_seq(writer, self, len)
    }
}

impl<T: Marshal> FixedSeq for Box<[T]> {
    type Item = T;

    fn read_fixed(reader: &mut Reader<'_>, len: usize) -> Result<Self> {
        Ok(read_seq(reader, len)?.into_boxed_slice())
    }

    fn write_fixed(&self, writer: &mut Writer<'_>, len: usize) -> Result<()> {
        write_seq(writer, self, len)
    }
}
