//! Streaming encoder: byte symbols in, packed code units out.

use std::io::{ErrorKind, Read, Write};

use crate::bits::BitBuf;
use crate::error::ArborError;
use crate::stats::LiveStats;
use crate::symbol::Symbol;
use crate::tree::{CodeTable, Tree};

/// Turns a byte stream into the compressed bitstream for one coding tree.
///
/// Feed input bytes one at a time and drain full 8-bit code units as they
/// become available; [`flush`](Self::flush) terminates the stream with the
/// EOF code and zero-pads the last unit. The caller owns all I/O.
#[derive(Debug, Clone)]
pub struct Encoder {
    table: CodeTable,
    buf: BitBuf,
}

impl Encoder {
    pub fn new(tree: &Tree) -> Self {
        Encoder {
            table: tree.code_table(),
            buf: BitBuf::new(),
        }
    }

    /// Append the code for one input byte to the bit buffer.
    ///
    /// A byte the tree has no leaf for encodes as the default leaf's code,
    /// which decodes to a different byte. That only happens when encoding
    /// against a tree built from other data, and is lossy on purpose.
    pub fn feed(&mut self, byte: u8) {
        self.buf.push_bits(self.table.code(Symbol::Byte(byte)));
    }

    /// Whether a full 8-bit unit is ready to take.
    pub fn has_next_unit(&self) -> bool {
        self.buf.len() >= 8
    }

    /// Take the next full 8-bit unit, if one is buffered.
    pub fn next_unit(&mut self) -> Option<u8> {
        self.buf.pop_byte()
    }

    /// Terminate the stream: append the EOF code, then return every
    /// remaining unit with the last one zero-padded to a byte boundary.
    /// The buffer is empty afterwards.
    pub fn flush(&mut self) -> Vec<u8> {
        let eof = self.table.eof_code().to_vec();
        self.buf.push_bits(&eof);
        self.buf.pad_to_byte();
        let mut out = Vec::with_capacity(self.buf.len() / 8);
        while let Some(unit) = self.buf.pop_byte() {
            out.push(unit);
        }
        out
    }
}

/// Encode a whole buffer, terminator and padding included.
pub fn encode_bytes(tree: &Tree, data: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::new(tree);
    let mut out = Vec::new();
    for &byte in data {
        encoder.feed(byte);
        while let Some(unit) = encoder.next_unit() {
            out.push(unit);
        }
    }
    out.extend(encoder.flush());
    out
}

/// Pump `reader` through an [`Encoder`] into `writer`, returning the number
/// of compressed bytes written. `live` reports progress at its configured
/// interval; pass a silent instance to disable that.
pub fn encode_stream<R: Read, W: Write>(
    tree: &Tree,
    mut reader: R,
    mut writer: W,
    live: &mut LiveStats,
) -> Result<u64, ArborError> {
    let mut encoder = Encoder::new(tree);
    let mut written = 0u64;
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        let mut chunk = Vec::with_capacity(n);
        for &byte in &buf[..n] {
            encoder.feed(byte);
            while let Some(unit) = encoder.next_unit() {
                chunk.push(unit);
            }
            live.tick(chunk.len() as u64 + written);
        }
        writer.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    let tail = encoder.flush();
    writer.write_all(&tail)?;
    written += tail.len() as u64;
    Ok(written)
}
