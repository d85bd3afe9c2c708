//! Tests for error handling

use std::io;

use geckolink_core::error::{GeckoError, Result};
use geckolink_core::memory::MemoryAccess;
use geckolink_core::types::Address;
use geckolink_protocol::{ProtocolError, Status};

#[test]
fn test_gecko_error_display()
{
    let error = GeckoError::InvalidArgument("alignment must be greater than 0".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid argument"));
    assert!(message.contains("alignment"));
}

#[test]
fn test_address_errors_name_the_range()
{
    let error = GeckoError::InvalidAddressRange {
        address: Address::new(0x0000_1000),
        length: 0x20,
    };
    assert_eq!(error.to_string(), "Address range 0x00001000 + 0x20 is not valid");

    let error = GeckoError::AccessDenied {
        address: Address::new(0x0100_0000),
        length: 4,
        access: MemoryAccess::Write,
    };
    let message = error.to_string();
    assert!(message.contains("Write"));
    assert!(message.contains("0x01000000"));
}

#[test]
fn test_protocol_error_conversion()
{
    let error: GeckoError = ProtocolError::UnknownStatus(0x42).into();
    assert!(error.is_protocol_violation());
    assert!(!error.is_local());
    assert!(error.to_string().contains("0x42"));

    let error: GeckoError = ProtocolError::UnexpectedStatus {
        operation: "memory write",
        expected: Status::GcAck,
        actual: Status::Ok,
    }
    .into();
    assert!(error.is_protocol_violation());
}

#[test]
fn test_local_protocol_errors_become_local()
{
    let error: GeckoError = ProtocolError::TooManyParameters(17).into();
    assert!(matches!(error, GeckoError::TooManyParameters(17)));
    assert!(error.is_local());

    let error: GeckoError = ProtocolError::SymbolRequestTooLong(300).into();
    assert!(matches!(error, GeckoError::InvalidArgument(_)));
    assert!(error.is_local());
}

#[test]
fn test_io_error_conversion()
{
    let io_error = io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed");
    let error: GeckoError = io_error.into();

    match error {
        GeckoError::Connection(ref inner) => assert_eq!(inner.kind(), io::ErrorKind::UnexpectedEof),
        _ => panic!("Expected Connection variant"),
    }
    assert!(!error.is_local());
    assert!(!error.is_protocol_violation());
}

#[test]
fn test_result_type_alias()
{
    fn returns_result() -> Result<u32>
    {
        Ok(42)
    }

    assert_eq!(returns_result().unwrap(), 42);
}
