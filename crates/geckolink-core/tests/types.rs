//! Tests for addresses, poke values and the address map

use geckolink_core::memory::{self, MemoryAccess, Permission, ADDRESS_RANGES};
use geckolink_core::types::{Address, PokeValue};

#[test]
fn test_address_conversions()
{
    let address = Address::from(0x1000_0000);
    assert_eq!(u32::from(address), 0x1000_0000);
    assert_eq!(u64::from(address), 0x1000_0000);
    assert_eq!(address.to_string(), "0x10000000");
    assert_eq!(format!("{address:x}"), "10000000");
}

#[test]
fn test_address_arithmetic()
{
    let address = Address::new(0x1000_0010);
    assert_eq!(address + 0x10, Address::new(0x1000_0020));
    assert_eq!(address - 0x10, Address::new(0x1000_0000));
    assert_eq!(address.checked_offset(0x10), Some(Address::new(0x1000_0020)));
    assert_eq!(Address::new(u32::MAX).checked_offset(1), None);
    assert_eq!(Address::new(u32::MAX).end(1), 0x1_0000_0000);
    assert!(Address::ZERO.is_null());
}

#[test]
fn test_poke_value_widths()
{
    assert_eq!(PokeValue::from(1u8).width(), 1);
    assert_eq!(PokeValue::from(1u16).width(), 2);
    assert_eq!(PokeValue::from(1u32).width(), 4);
    assert_eq!(PokeValue::from(1.0f32).width(), 4);
    assert_eq!(PokeValue::from(1u64).width(), 8);
    assert_eq!(PokeValue::from(1.0f64).width(), 8);
}

#[test]
fn test_range_boundaries()
{
    for range in &ADDRESS_RANGES {
        let start = Address::new(range.start);
        assert!(memory::is_range_valid(start, 1));
        assert!(memory::is_range_valid(start, range.size() as usize));
        assert!(!memory::is_range_valid(start, range.size() as usize + 1));
        assert!(memory::is_range_valid(Address::new(range.end - 1), 1));
    }
}

#[test]
fn test_span_across_adjacent_windows_is_invalid()
{
    // [0x0E000000, 0x10000000) R is followed directly by [0x10000000, 0x50000000) RW.
    assert!(!memory::is_range_valid(Address::new(0x0FFF_FFFC), 8));
    assert!(memory::is_range_valid(Address::new(0x0FFF_FFFC), 4));
}

#[test]
fn test_gaps_and_top_of_memory()
{
    assert!(!memory::is_range_valid(Address::new(0x0000_0000), 4));
    assert!(!memory::is_range_valid(Address::new(0x5000_0000), 4));
    assert!(!memory::is_range_valid(Address::new(0xFFFF_FFFC), 4));
    assert!(memory::is_range_valid(Address::new(0xFFFF_FFFB), 4));
}

#[test]
fn test_write_permission()
{
    assert!(memory::is_access_allowed(Address::new(0x1000_0000), 4, MemoryAccess::Write));
    assert!(memory::is_access_allowed(Address::new(0xFFFE_0000), 4, MemoryAccess::Write));
    assert!(!memory::is_access_allowed(Address::new(0xE000_0000), 4, MemoryAccess::Write));
    assert!(memory::is_access_allowed(Address::new(0xE000_0000), 4, MemoryAccess::Read));

    let writable: Vec<_> = ADDRESS_RANGES
        .iter()
        .filter(|range| range.permission == Permission::ReadWrite)
        .map(|range| (range.start, range.end))
        .collect();
    assert_eq!(writable, vec![(0x1000_0000, 0x5000_0000), (0xFFFE_0000, 0xFFFF_FFFF)]);
}

#[test]
fn test_kernel_transfer_requires_whole_words()
{
    let base = Address::new(0x1000_0000);
    assert!(memory::check_kernel_transfer(base, 8, MemoryAccess::Write).is_ok());
    assert!(memory::check_kernel_transfer(base, 6, MemoryAccess::Write).is_err());
    assert!(memory::check_kernel_transfer(base, 0, MemoryAccess::Write).is_err());
}
