//! # Types
//!
//! Value types shared by the session, the buffers and the allocator.

pub mod address;
pub mod value;

pub use address::Address;
pub use value::PokeValue;
