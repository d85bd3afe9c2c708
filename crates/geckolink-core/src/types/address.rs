//! Device memory address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed device address
///
/// The console is a 32-bit machine, so every address on the wire is a `u32`.
/// Wrapping it keeps addresses from being mixed up with sizes, counts or RPC
/// arguments, which are `u32`s too.
///
/// ## Example
///
/// ```rust
/// use geckolink_core::types::Address;
///
/// let addr = Address::from(0x1000_0000);
/// let next = addr + 0x400;
/// assert_eq!(next.value(), 0x1000_0400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u32);

impl Address
{
    /// The null address. Remote allocators return it on failure.
    pub const ZERO: Self = Address(0);

    /// Create an address in const contexts.
    ///
    /// ```rust
    /// use geckolink_core::types::Address;
    ///
    /// const HEAP_BASE: Address = Address::new(0x1000_0000);
    /// ```
    pub const fn new(value: u32) -> Self
    {
        Address(value)
    }

    /// Raw `u32` value.
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// True for the null address.
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset, returning `None` on overflow.
    ///
    /// ```rust
    /// use geckolink_core::types::Address;
    ///
    /// assert_eq!(Address::new(0x10).checked_add(0x10), Some(Address::new(0x20)));
    /// assert_eq!(Address::new(u32::MAX).checked_add(1), None);
    /// ```
    pub fn checked_add(self, offset: u32) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Add a byte offset given as `usize`, returning `None` when the result
    /// does not fit the 32-bit address space.
    pub fn checked_offset(self, offset: usize) -> Option<Self>
    {
        u32::try_from(offset).ok().and_then(|offset| self.checked_add(offset))
    }

    /// Exclusive end of `[self, self + length)` in 64-bit arithmetic.
    ///
    /// Never overflows, which keeps range checks honest near the top of the
    /// address space.
    pub fn end(self, length: usize) -> u64
    {
        u64::from(self.0).saturating_add(length as u64)
    }
}

impl From<u32> for Address
{
    fn from(value: u32) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u32
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        u64::from(address.0)
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u32> for Address
{
    type Output = Address;

    fn add(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u32> for Address
{
    type Output = Address;

    fn sub(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
