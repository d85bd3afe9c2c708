//! # Symbol lookup payload
//!
//! Layout after the `GetSymbol` opcode:
//!
//! ```text
//! u8   total length of the block below
//! u32  0x00000008            offset of the module name
//! u32  module.len() + 9      offset of the symbol name
//! [u8] module name, UTF-8, NUL terminated
//! [u8] symbol name, UTF-8, NUL terminated
//! u8   1 for a data symbol, 0 for code
//! ```
//!
//! The handler answers with the symbol's 32-bit address.

use crate::codec::WireCodec;
use crate::command::Command;
use crate::error::ProtocolError;

const MODULE_NAME_OFFSET: u32 = 8;

/// A (module, symbol) lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRequest<'a>
{
    /// Owning module, e.g. `coreinit.rpl`
    pub module: &'a str,
    /// Exported symbol name
    pub name: &'a str,
    /// Resolve as a data export rather than a function
    pub is_data: bool,
}

impl<'a> SymbolRequest<'a>
{
    /// Describe a lookup.
    #[must_use]
    pub fn new(module: &'a str, name: &'a str, is_data: bool) -> Self
    {
        Self { module, name, is_data }
    }

    /// The length-prefixed block, without the opcode and data flag.
    ///
    /// ## Errors
    ///
    /// [`ProtocolError::SymbolRequestTooLong`] when the block does not fit the
    /// one-byte length prefix.
    pub fn body(&self) -> Result<Vec<u8>, ProtocolError>
    {
        let module = self.module.as_bytes();
        let name = self.name.as_bytes();
        let len = 8 + module.len() + 1 + name.len() + 1;
        if len > usize::from(u8::MAX) {
            return Err(ProtocolError::SymbolRequestTooLong(len));
        }

        let name_offset =
            u32::try_from(module.len() + 9).map_err(|_| ProtocolError::SymbolRequestTooLong(len))?;

        let mut body = Vec::with_capacity(len);
        body.extend_from_slice(&MODULE_NAME_OFFSET.to_be_bytes());
        body.extend_from_slice(&name_offset.to_be_bytes());
        body.extend_from_slice(module);
        body.push(0);
        body.extend_from_slice(name);
        body.push(0);
        Ok(body)
    }

    /// Stage opcode, length prefix, block and data flag on a codec.
    ///
    /// ## Errors
    ///
    /// See [`SymbolRequest::body`]. Nothing is staged on error.
    pub fn encode<S>(&self, codec: &mut WireCodec<S>) -> Result<(), ProtocolError>
    {
        let body = self.body()?;
        let prefix = u8::try_from(body.len()).map_err(|_| ProtocolError::SymbolRequestTooLong(body.len()))?;
        codec.write_command(Command::GetSymbol);
        codec.write_u8(prefix);
        codec.write_bytes(&body);
        codec.write_u8(u8::from(self.is_data));
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_body_layout()
    {
        let body = SymbolRequest::new("coreinit.rpl", "memset", false).body().unwrap();

        assert_eq!(&body[..4], &[0, 0, 0, 8]);
        assert_eq!(&body[4..8], &21u32.to_be_bytes());
        assert_eq!(&body[8..20], b"coreinit.rpl");
        assert_eq!(body[20], 0);
        assert_eq!(&body[21..27], b"memset");
        assert_eq!(body[27], 0);
        assert_eq!(body.len(), 28);
    }

    #[test]
    fn test_encode_frames_body()
    {
        let mut codec = WireCodec::new(Vec::<u8>::new());
        SymbolRequest::new("a.rpl", "f", true).encode(&mut codec).unwrap();
        codec.flush().unwrap();

        let bytes = codec.into_inner();
        assert_eq!(bytes[0], 0x71);
        assert_eq!(usize::from(bytes[1]), bytes.len() - 3);
        assert_eq!(*bytes.last().unwrap(), 1);
    }

    #[test]
    fn test_oversized_request_is_rejected()
    {
        let long = "x".repeat(250);
        let mut codec = WireCodec::new(Vec::<u8>::new());
        let err = SymbolRequest::new("coreinit.rpl", &long, false).encode(&mut codec).unwrap_err();
        assert!(matches!(err, ProtocolError::SymbolRequestTooLong(_)));
        assert_eq!(codec.pending_len(), 0);
    }
}
