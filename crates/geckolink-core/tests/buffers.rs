//! Tests for remote buffers, allocated buffers and the coreinit allocator

mod common;

use common::{FakeDevice, ALLOCATION_BASE, HEAP_ALLOC_FN, HEAP_FREE_FN, MEMSET_FN, SYSTEM_ALLOC_FN, SYSTEM_FREE_FN};
use geckolink_core::{AllocatorKind, GeckoError, RemoteBuffer, Session};

const RW_BASE: u32 = 0x1000_0000;

fn session() -> (FakeDevice, Session<FakeDevice>)
{
    let device = FakeDevice::new();
    let session = Session::new(device.clone());
    (device, session)
}

#[test]
fn test_flush_sends_whole_mirror()
{
    let (device, mut session) = session();
    let mut buffer = RemoteBuffer::new(RW_BASE, 0x500);

    buffer.set_data(0x4FE, &[0xAA, 0xBB]).unwrap();
    buffer.flush(&mut session).unwrap();

    assert!(!buffer.is_dirty());
    assert_eq!(device.count(0x41), 2);
    assert_eq!(device.read_memory(RW_BASE + 0x4FE, 2), vec![0xAA, 0xBB]);
}

#[test]
fn test_update_discards_local_edits()
{
    let (device, mut session) = session();
    device.write_memory(RW_BASE, &[1, 2, 3, 4]);
    let mut buffer = RemoteBuffer::new(RW_BASE, 4);

    buffer.set_data(0, &[9]).unwrap();
    buffer.update(&mut session).unwrap();

    assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4]);
    assert!(!buffer.is_dirty());
}

#[test]
fn test_update_range_reads_at_offset_and_keeps_flag()
{
    let (device, mut session) = session();
    device.write_memory(RW_BASE, &[1, 2, 3, 4, 5, 6, 7, 8]);
    let mut buffer = RemoteBuffer::new(RW_BASE, 8);
    buffer.mark_dirty();

    buffer.update_range(&mut session, 4, 2).unwrap();

    assert_eq!(buffer.as_bytes(), &[0, 0, 0, 0, 5, 6, 0, 0]);
    assert!(buffer.is_dirty());

    let read = device.requests().into_iter().find(|r| r.opcode == 0x04).unwrap();
    assert_eq!((read.word(0), read.word(1)), (RW_BASE + 4, RW_BASE + 6));
}

#[test]
fn test_update_range_out_of_bounds()
{
    let (device, mut session) = session();
    let mut buffer = RemoteBuffer::new(RW_BASE, 8);

    let err = buffer.update_range(&mut session, 6, 4).unwrap_err();
    assert!(matches!(err, GeckoError::BufferOutOfBounds { .. }));
    assert!(device.requests().is_empty());
}

#[test]
fn test_malloc_without_fetch_is_dirty()
{
    let (device, mut session) = session();

    let buffer = session.core_init().malloc(0x40, 0x20, false).unwrap().unwrap();
    assert_eq!(buffer.kind(), AllocatorKind::System);
    assert_eq!(buffer.address().value(), ALLOCATION_BASE);
    assert_eq!(buffer.size(), 0x40);
    assert!(buffer.is_dirty());
    assert_eq!(device.count(0x04), 0);

    let call = device.calls_to(SYSTEM_ALLOC_FN).remove(0);
    assert_eq!(&call.slots[..2], &[0x40, 0x20]);

    buffer.free(&mut session).unwrap();
}

#[test]
fn test_malloc_heap_with_fetch_is_clean()
{
    let (device, mut session) = session();
    device.write_memory(ALLOCATION_BASE, &[7, 7, 7]);

    let buffer = session.core_init().malloc_heap(3, 4, true).unwrap().unwrap();
    assert_eq!(buffer.kind(), AllocatorKind::Heap);
    assert!(!buffer.is_dirty());
    assert_eq!(buffer.as_bytes(), &[7, 7, 7]);
    assert_eq!(device.calls_to(HEAP_ALLOC_FN).len(), 1);

    buffer.free(&mut session).unwrap();
    assert_eq!(device.calls_to(HEAP_FREE_FN)[0].slots[0], ALLOCATION_BASE);
}

#[test]
fn test_null_allocation_is_none()
{
    let (device, mut session) = session();
    device.fail_allocations();

    assert!(session.core_init().malloc(0x40, 0x20, true).unwrap().is_none());
    assert!(session.core_init().malloc_heap(0x40, 0x20, true).unwrap().is_none());
    // Only the heap pointer lookup reads memory.
    assert_eq!(device.count(0x04), 1);
}

#[test]
fn test_allocation_return_is_masked_to_32_bits()
{
    let (device, mut session) = session();
    device.write_memory(0x1000_2000, &[0x42]);
    device.script_rpc_return(0xFFFF_FFFF_1000_2000);

    let buffer = session.core_init().malloc(1, 4, true).unwrap().unwrap();
    assert_eq!(buffer.address().value(), 0x1000_2000);
    assert_eq!(buffer.as_bytes(), &[0x42]);
    drop(buffer.leak());
}

#[test]
fn test_zero_size_allocation_is_rejected()
{
    let (device, mut session) = session();

    assert!(matches!(
        session.core_init().malloc(0, 0x20, false),
        Err(GeckoError::InvalidArgument(_))
    ));
    assert!(device.requests().is_empty());
}

#[test]
fn test_free_goes_to_matching_allocator_once()
{
    let (device, mut session) = session();

    let system = session.core_init().malloc(0x10, 4, false).unwrap().unwrap();
    let heap = session.core_init().malloc_heap(0x10, 4, false).unwrap().unwrap();
    let system_address = system.address().value();

    system.free(&mut session).unwrap();
    heap.free(&mut session).unwrap();

    let frees = device.calls_to(SYSTEM_FREE_FN);
    assert_eq!(frees.len(), 1);
    assert_eq!(frees[0].slots[0], system_address);
    assert_eq!(device.calls_to(HEAP_FREE_FN).len(), 1);
}

#[test]
fn test_memset_buffer_updates_both_sides()
{
    let (device, mut session) = session();
    let mut buffer = RemoteBuffer::new(RW_BASE, 8);

    session.core_init().memset_buffer(&mut buffer, 2, 0xEE, 4).unwrap();

    assert_eq!(buffer.as_bytes(), &[0, 0, 0xEE, 0xEE, 0xEE, 0xEE, 0, 0]);
    assert!(!buffer.is_dirty());
    assert_eq!(device.read_memory(RW_BASE, 8), vec![0, 0, 0xEE, 0xEE, 0xEE, 0xEE, 0, 0]);

    let call = device.calls_to(MEMSET_FN).remove(0);
    assert_eq!(&call.slots[..3], &[RW_BASE + 2, 0xEE, 4]);
}

#[test]
fn test_memset_validates_range()
{
    let (device, mut session) = session();

    let err = session.core_init().memset(0x0100_0000u32, 0, 4).unwrap_err();
    assert!(matches!(err, GeckoError::AccessDenied { .. }));

    let mut buffer = RemoteBuffer::new(RW_BASE, 4);
    let err = session.core_init().memset_buffer(&mut buffer, 2, 0, 4).unwrap_err();
    assert!(matches!(err, GeckoError::BufferOutOfBounds { .. }));
    assert!(device.requests().is_empty());
}

#[test]
fn test_create_string()
{
    let (device, mut session) = session();

    let buffer = session.core_init().create_string("/vol/content", true).unwrap().unwrap();

    // 12 bytes + NUL aligned past the next 0x20 boundary.
    assert_eq!(buffer.size(), 0x20);
    assert!(!buffer.is_dirty());
    assert_eq!(&buffer.as_bytes()[..13], b"/vol/content\0");

    let alloc = device.calls_to(SYSTEM_ALLOC_FN).remove(0);
    assert_eq!(&alloc.slots[..2], &[0x20, 0x20]);
    let memset = device.calls_to(MEMSET_FN).remove(0);
    assert_eq!(&memset.slots[..3], &[buffer.address().value(), 0, 0x20]);
    assert_eq!(device.read_memory(buffer.address().value(), 13), b"/vol/content\0".to_vec());

    buffer.free(&mut session).unwrap();
}

#[test]
fn test_create_string_without_flush_stays_dirty()
{
    let (device, mut session) = session();

    let buffer = session.core_init().create_string("abc", false).unwrap().unwrap();
    assert!(buffer.is_dirty());
    assert_eq!(device.count(0x41), 0);
    buffer.free(&mut session).unwrap();
}

#[test]
fn test_create_string_frees_on_failure()
{
    let (device, mut session) = session();
    device.script_status(0xBD);

    let err = session.core_init().create_string("abc", true).unwrap_err();
    assert!(err.is_protocol_violation());
    assert_eq!(device.calls_to(SYSTEM_FREE_FN).len(), 1);
}
