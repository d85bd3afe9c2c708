//! # Wire Codec
//!
//! Big-endian integer and block transfer over a duplex byte stream.
//!
//! Outgoing bytes are staged until the request is complete and then written in
//! one piece. Any read first pushes out whatever is still staged, so the codec
//! can never sit waiting for a reply to a request it has not fully sent.
//!
//! Floating-point values never travel as floats. An `f32` goes out as the raw
//! bit pattern of an IEEE-754 single, an `f64` as the bit pattern of a double,
//! which keeps NaN payloads intact.

use std::io::{self, Read, Write};

use tracing::trace;

use crate::command::Command;

/// Framing layer over a duplex stream.
#[derive(Debug)]
pub struct WireCodec<S>
{
    stream: S,
    pending: Vec<u8>,
}

impl<S> WireCodec<S>
{
    /// Wrap a connected stream.
    pub fn new(stream: S) -> Self
    {
        Self {
            stream,
            pending: Vec::with_capacity(64),
        }
    }

    /// Shared access to the underlying stream.
    pub fn get_ref(&self) -> &S
    {
        &self.stream
    }

    /// Mutable access to the underlying stream.
    ///
    /// Bytes staged with the `write_*` methods are not visible to the stream
    /// until [`WireCodec::flush`] runs.
    pub fn get_mut(&mut self) -> &mut S
    {
        &mut self.stream
    }

    /// Unwrap the stream, discarding any staged bytes.
    pub fn into_inner(self) -> S
    {
        self.stream
    }

    /// Number of staged bytes not yet written to the stream.
    #[must_use]
    pub fn pending_len(&self) -> usize
    {
        self.pending.len()
    }

    /// Drop staged bytes without sending them.
    pub fn discard_pending(&mut self)
    {
        self.pending.clear();
    }

    /// Stage a command opcode.
    pub fn write_command(&mut self, command: Command)
    {
        trace!(%command, "staging command");
        self.pending.push(command.opcode());
    }

    /// Stage one byte.
    pub fn write_u8(&mut self, value: u8)
    {
        self.pending.push(value);
    }

    /// Stage a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16)
    {
        self.pending.extend_from_slice(&value.to_be_bytes());
    }

    /// Stage a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32)
    {
        self.pending.extend_from_slice(&value.to_be_bytes());
    }

    /// Stage a big-endian `u64`.
    pub fn write_u64(&mut self, value: u64)
    {
        self.pending.extend_from_slice(&value.to_be_bytes());
    }

    /// Stage the bit pattern of an `f32`.
    pub fn write_f32(&mut self, value: f32)
    {
        self.write_u32(value.to_bits());
    }

    /// Stage the bit pattern of an `f64`.
    pub fn write_f64(&mut self, value: f64)
    {
        self.write_u64(value.to_bits());
    }

    /// Stage a sequence of big-endian `u32`s.
    pub fn write_u32s(&mut self, values: &[u32])
    {
        for value in values {
            self.write_u32(*value);
        }
    }

    /// Stage a raw byte block.
    pub fn write_bytes(&mut self, bytes: &[u8])
    {
        self.pending.extend_from_slice(bytes);
    }
}

impl<S: Write> WireCodec<S>
{
    /// Write every staged byte to the stream and flush it.
    ///
    /// ## Errors
    ///
    /// Any I/O error from the stream. Staged bytes are dropped either way so a
    /// failed request is never re-sent as the prefix of the next one.
    pub fn flush(&mut self) -> io::Result<()>
    {
        if !self.pending.is_empty() {
            trace!(len = self.pending.len(), "sending request bytes");
            let result = self.stream.write_all(&self.pending);
            self.pending.clear();
            result?;
        }
        self.stream.flush()
    }
}

impl<S: Read + Write> WireCodec<S>
{
    /// Fill `buf` completely from the stream.
    ///
    /// Partial reads are retried until the buffer is full. Running out of
    /// stream first yields [`io::ErrorKind::UnexpectedEof`].
    ///
    /// ## Errors
    ///
    /// Any I/O error from flushing staged bytes or from the read itself.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>
    {
        self.flush()?;
        self.stream.read_exact(buf)?;
        trace!(len = buf.len(), "received response bytes");
        Ok(())
    }

    /// Read `len` bytes into a new vector.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_vec(&mut self, len: usize) -> io::Result<Vec<u8>>
    {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read one byte.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_u8(&mut self) -> io::Result<u8>
    {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian `u16`.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_u16(&mut self) -> io::Result<u16>
    {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_u32(&mut self) -> io::Result<u32>
    {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `u64`.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_u64(&mut self) -> io::Result<u64>
    {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Read an `f32` sent as its bit pattern.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_f32(&mut self) -> io::Result<f32>
    {
        self.read_u32().map(f32::from_bits)
    }

    /// Read an `f64` sent as its bit pattern.
    ///
    /// ## Errors
    ///
    /// See [`WireCodec::read_exact`].
    pub fn read_f64(&mut self) -> io::Result<f64>
    {
        self.read_u64().map(f64::from_bits)
    }
}
