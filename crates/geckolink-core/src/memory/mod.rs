//! # Address Validator
//!
//! Static map of the console's address space and the checks every memory
//! operation runs before it sends anything.
//!
//! The handler on the console dereferences whatever address it is given, so a
//! bad address crashes the device rather than failing a request. Every range
//! the session touches therefore has to sit entirely inside one of the windows
//! below, and writes are only allowed in the two read/write windows.
//!
//! | start        | end (excl.)  | permission |
//! |--------------|--------------|------------|
//! | `0x01000000` | `0x01800000` | read       |
//! | `0x0E000000` | `0x10000000` | read       |
//! | `0x10000000` | `0x50000000` | read/write |
//! | `0xE0000000` | `0xE4000000` | read       |
//! | `0xE8000000` | `0xEA000000` | read       |
//! | `0xF4000000` | `0xF6000000` | read       |
//! | `0xF6000000` | `0xF6800000` | read       |
//! | `0xF8000000` | `0xFB000000` | read       |
//! | `0xFB000000` | `0xFB800000` | read       |
//! | `0xFFFE0000` | `0xFFFFFFFF` | read/write |

use std::fmt;

use crate::error::{GeckoError, Result};
use crate::types::Address;

/// What a caller wants to do with a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryAccess
{
    /// Read only
    Read,
    /// Write (reads are implied)
    Write,
}

impl fmt::Display for MemoryAccess
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            MemoryAccess::Read => write!(f, "Read"),
            MemoryAccess::Write => write!(f, "Write"),
        }
    }
}

/// What a range permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission
{
    /// Reads only
    Read,
    /// Reads and writes
    ReadWrite,
}

impl Permission
{
    /// Whether this permission covers `access`.
    #[must_use]
    pub fn allows(self, access: MemoryAccess) -> bool
    {
        match self {
            Permission::ReadWrite => true,
            Permission::Read => access == MemoryAccess::Read,
        }
    }
}

/// One window of the address map: `[start, end)` with a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange
{
    /// First valid address
    pub start: u32,
    /// One past the last valid address
    pub end: u32,
    /// Allowed access
    pub permission: Permission,
}

impl AddressRange
{
    const fn new(start: u32, end: u32, permission: Permission) -> Self
    {
        Self { start, end, permission }
    }

    /// Whether `[address, address + length)` lies entirely inside this range.
    #[must_use]
    pub fn contains(&self, address: Address, length: usize) -> bool
    {
        self.start <= address.value() && address.end(length) <= u64::from(self.end)
    }

    /// Size of the range in bytes.
    #[must_use]
    pub fn size(&self) -> u32
    {
        self.end - self.start
    }
}

/// The console's valid address windows, in ascending order.
pub const ADDRESS_RANGES: [AddressRange; 10] = [
    AddressRange::new(0x0100_0000, 0x0180_0000, Permission::Read),
    AddressRange::new(0x0E00_0000, 0x1000_0000, Permission::Read),
    AddressRange::new(0x1000_0000, 0x5000_0000, Permission::ReadWrite),
    AddressRange::new(0xE000_0000, 0xE400_0000, Permission::Read),
    AddressRange::new(0xE800_0000, 0xEA00_0000, Permission::Read),
    AddressRange::new(0xF400_0000, 0xF600_0000, Permission::Read),
    AddressRange::new(0xF600_0000, 0xF680_0000, Permission::Read),
    AddressRange::new(0xF800_0000, 0xFB00_0000, Permission::Read),
    AddressRange::new(0xFB00_0000, 0xFB80_0000, Permission::Read),
    AddressRange::new(0xFFFE_0000, 0xFFFF_FFFF, Permission::ReadWrite),
];

/// The table entry that fully contains `[address, address + length)`.
#[must_use]
pub fn find_range(address: Address, length: usize) -> Option<&'static AddressRange>
{
    ADDRESS_RANGES.iter().find(|range| range.contains(address, length))
}

/// Whether `[address, address + length)` is inside one known range,
/// regardless of permission.
#[must_use]
pub fn is_range_valid(address: Address, length: usize) -> bool
{
    find_range(address, length).is_some()
}

/// Whether `[address, address + length)` is inside one known range that
/// permits `access`.
#[must_use]
pub fn is_access_allowed(address: Address, length: usize, access: MemoryAccess) -> bool
{
    find_range(address, length).is_some_and(|range| range.permission.allows(access))
}

/// Turn the two predicates into an error, range first.
///
/// ## Errors
///
/// - `InvalidAddressRange` when no range contains the span
/// - `AccessDenied` when the containing range does not permit `access`
pub fn check_access(address: Address, length: usize, access: MemoryAccess) -> Result<()>
{
    if !is_range_valid(address, length) {
        return Err(GeckoError::InvalidAddressRange { address, length });
    }
    if !is_access_allowed(address, length, access) {
        return Err(GeckoError::AccessDenied {
            address,
            length,
            access,
        });
    }
    Ok(())
}

/// Reject empty transfers, then run [`check_access`].
///
/// ## Errors
///
/// `InvalidArgument` for a zero length, otherwise see [`check_access`].
pub fn check_transfer(address: Address, length: usize, access: MemoryAccess) -> Result<()>
{
    if length == 0 {
        return Err(GeckoError::InvalidArgument("length must be greater than 0".to_string()));
    }
    check_access(address, length, access)
}

/// Like [`check_transfer`], additionally requiring whole 32-bit words.
///
/// ## Errors
///
/// `InvalidArgument` when the length is not a multiple of 4, otherwise see
/// [`check_transfer`].
pub fn check_kernel_transfer(address: Address, length: usize, access: MemoryAccess) -> Result<()>
{
    if length % 4 != 0 {
        return Err(GeckoError::InvalidArgument(format!(
            "kernel transfers must be a multiple of 4 bytes, got {length}"
        )));
    }
    check_transfer(address, length, access)
}
