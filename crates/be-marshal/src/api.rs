//! Top-level marshaling entry points
//!
//! Each function runs one complete read or write on its own cursor; nothing
//! is retained between calls.

use core::any::type_name;

use crate::cursor::{Reader, Writer};
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::traits::Marshal;
use crate::value::Value;

fn traced<T>(op: &str, ty: &str, offset: usize, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::debug!("{} `{}` at offset {} failed: {}", op, ty, offset, e);
    }
    result
}

/// Fail before touching `buf` if `size` bytes do not fit at `offset`
fn ensure_fits(buf_len: usize, offset: usize, size: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= buf_len => Ok(()),
        _ => Err(Error::out_of_range(offset, size, buf_len)),
    }
}

/// Serialized size of `T` in bytes
pub fn size_of<T: Marshal>() -> Result<usize> {
    T::size()
}

/// Deserialize one `T` starting at `offset`
pub fn read<T: Marshal>(buf: &[u8], offset: usize) -> Result<T> {
    read_at(buf, offset).map(|(value, _)| value)
}

/// Deserialize one `T` starting at `offset`, returning it with the advanced offset
pub fn read_at<T: Marshal>(buf: &[u8], offset: usize) -> Result<(T, usize)> {
    let mut reader = Reader::at(buf, offset);
    let value = traced("read", type_name::<T>(), offset, T::read(&mut reader))?;
    log::trace!(
        "read `{}` from offset {} to {}",
        type_name::<T>(),
        offset,
        reader.position()
    );
    Ok((value, reader.position()))
}

/// Deserialize `len` consecutive `T`s starting at `offset`
pub fn read_array<T: Marshal>(buf: &[u8], len: usize, offset: usize) -> Result<Vec<T>> {
    let mut reader = Reader::at(buf, offset);
    let items = traced(
        "read_array",
        type_name::<T>(),
        offset,
        crate::array::read_seq(&mut reader, len),
    )?;
    log::trace!(
        "read {} x `{}` from offset {} to {}",
        len,
        type_name::<T>(),
        offset,
        reader.position()
    );
    Ok(items)
}

/// Fill the caller's pre-sized slice with consecutive `T`s starting at `offset`
///
/// Returns the advanced offset.
pub fn read_array_into<T: Marshal>(buf: &[u8], out: &mut [T], offset: usize) -> Result<usize> {
    let mut reader = Reader::at(buf, offset);
    traced(
        "read_array",
        type_name::<T>(),
        offset,
        crate::array::read_seq_into(&mut reader, out),
    )?;
    Ok(reader.position())
}

/// Size of `len` consecutive `T`s
fn array_size<T: Marshal>(len: usize) -> Result<usize> {
    T::size()?.checked_mul(len).ok_or_else(Error::size_overflow)
}

/// Encode `value` into a scratch buffer of exactly `size` bytes
fn encode<T: Marshal>(value: &T, size: usize) -> Result<Vec<u8>> {
    let mut scratch = vec![0u8; size];
    value.write(&mut Writer::new(&mut scratch))?;
    Ok(scratch)
}

fn encode_seq<T: Marshal>(values: &[T], size: usize) -> Result<Vec<u8>> {
    let mut scratch = vec![0u8; size];
    crate::array::write_seq(&mut Writer::new(&mut scratch), values, values.len())?;
    Ok(scratch)
}

/// Serialize `value` into a freshly allocated buffer of exactly `size_of::<T>()` bytes
pub fn write<T: Marshal>(value: &T) -> Result<Vec<u8>> {
    let ty = type_name::<T>();
    let size = traced("write", ty, 0, T::size())?;
    let bytes = traced("write", ty, 0, encode(value, size))?;
    log::trace!("wrote `{}` ({} bytes)", ty, size);
    Ok(bytes)
}

/// Serialize `value` into `buf` at `offset`, returning the advanced offset
///
/// `buf` is only modified if the whole value encodes successfully.
pub fn write_into<T: Marshal>(value: &T, buf: &mut [u8], offset: usize) -> Result<usize> {
    let ty = type_name::<T>();
    let size = traced("write", ty, offset, T::size())?;
    traced("write", ty, offset, ensure_fits(buf.len(), offset, size))?;

    let bytes = traced("write", ty, offset, encode(value, size))?;
    let end = offset + size;
    buf[offset..end].copy_from_slice(&bytes);
    log::trace!("wrote `{}` from offset {} to {}", ty, offset, end);
    Ok(end)
}

/// Serialize every element of `values` into a freshly allocated buffer
pub fn write_array<T: Marshal>(values: &[T]) -> Result<Vec<u8>> {
    let ty = type_name::<T>();
    let size = traced("write_array", ty, 0, array_size::<T>(values.len()))?;
    let bytes = traced("write_array", ty, 0, encode_seq(values, size))?;
    log::trace!("wrote {} x `{}` ({} bytes)", values.len(), ty, size);
    Ok(bytes)
}

/// Serialize every element of `values` into `buf` at `offset`
///
/// Returns the advanced offset. `buf` is only modified if every element
/// encodes successfully.
pub fn write_array_into<T: Marshal>(values: &[T], buf: &mut [u8], offset: usize) -> Result<usize> {
    let ty = type_name::<T>();
    let size = traced("write_array", ty, offset, array_size::<T>(values.len()))?;
    traced("write_array", ty, offset, ensure_fits(buf.len(), offset, size))?;

    let bytes = traced("write_array", ty, offset, encode_seq(values, size))?;
    let end = offset + size;
    buf[offset..end].copy_from_slice(&bytes);
    log::trace!(
        "wrote {} x `{}` from offset {} to {}",
        values.len(),
        ty,
        offset,
        end
    );
    Ok(end)
}

/// Deserialize a dynamically typed value described by `desc`
pub fn read_value(desc: &TypeDescriptor, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
    let mut reader = Reader::at(buf, offset);
    let value = traced("read_value", &desc.name(), offset, desc.read_value(&mut reader))?;
    Ok((value, reader.position()))
}

/// Serialize a dynamically typed value described by `desc` into a fresh buffer
pub fn write_value(desc: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
    let name = desc.name();
    let mut buf = vec![0u8; traced("write_value", &name, 0, desc.size())?];
    let mut writer = Writer::new(&mut buf);
    traced("write_value", &name, 0, desc.write_value(value, &mut writer))?;
    Ok(buf)
}
