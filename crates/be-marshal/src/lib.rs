//! Type-directed big-endian binary marshaling
//!
//! Converts fixed-width integers, fixed-length arrays, and composites built
//! from them to and from a flat big-endian byte layout. There are no length
//! prefixes, alignment padding, or type tags: a value occupies exactly
//! [`size_of::<T>()`](size_of) bytes.
//!
//! Every type dispatches on one of three shapes:
//!
//! - primitive: `u8`, `i8`, `u16`, `i16`, `u32`, `i32`, `u64`, `i64`
//! - array: `[T; N]`, caller-sized slices, and `#[marshal(len = N)]` fields
//! - composite: structs deriving [`Marshal`], fields in declaration order
//!
//! # Features
//!
//! - `derive` (default) - Re-export `#[derive(Marshal)]`
//! - `float` - Marshal `f32`/`f64` as their IEEE-754 bit patterns instead of
//!   rejecting them with [`Error::UnsupportedType`]
//!
//! # Example
//!
//! ```
//! use be_marshal::Marshal;
//!
//! #[derive(Debug, Default, PartialEq, Marshal)]
//! struct Frame {
//!     id: u16,
//!     payload: [u8; 2],
//! }
//!
//! let frame = Frame { id: 0x0102, payload: [3, 4] };
//! let bytes = be_marshal::write(&frame).unwrap();
//! assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04]);
//! assert_eq!(be_marshal::size_of::<Frame>().unwrap(), 4);
//! assert_eq!(be_marshal::read::<Frame>(&bytes, 0).unwrap(), frame);
//! ```
//!
//! # Rejected types
//!
//! A composite cannot contain itself, even through a `len` field:
//!
//! ```compile_fail
//! #[derive(be_marshal::Marshal)]
//! struct Node {
//!     value: u8,
//!     #[marshal(len = 1)]
//!     next: Vec<Self>,
//! }
//! ```
//!
//! Enums have no fixed layout and cannot derive `Marshal`:
//!
//! ```compile_fail
//! #[derive(be_marshal::Marshal)]
//! enum E {
//!     A,
//! }
//! ```

// Lets derive output name `::be_marshal` from inside this crate's own tests.
extern crate self as be_marshal;

pub mod api;
pub mod array;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod primitives;
pub mod traits;
pub mod value;

pub use api::{
    read, read_array, read_array_into, read_at, read_value, size_of, write, write_array,
    write_array_into, write_into, write_value,
};
pub use cursor::{Reader, Writer};
pub use descriptor::{FieldDescriptor, PrimitiveKind, Shape, TypeDescriptor};
pub use error::{Error, Result};
pub use traits::Marshal;
pub use value::{Primitive, Value};

#[cfg(feature = "derive")]
pub use be_marshal_macros::Marshal;
