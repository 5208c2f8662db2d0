//! Streaming decoder: packed code units in, byte symbols out.

use std::io::{ErrorKind, Read, Write};

use crate::bits::BitBuf;
use crate::error::ArborError;
use crate::symbol::Symbol;
use crate::tree::{NodeId, NodeView, Tree};

/// Walks the coding tree bit by bit, emitting a symbol at every leaf.
///
/// Feed compressed 8-bit units in order; each call returns the symbols that
/// completed, possibly none. Emitting [`Symbol::Eof`] ends the stream: the
/// decoder goes quiet and any further input is padding to discard.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    tree: &'a Tree,
    position: NodeId,
    buf: BitBuf,
    finished: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Decoder {
            tree,
            position: tree.root(),
            buf: BitBuf::new(),
            finished: false,
        }
    }

    /// True once the EOF symbol has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume one compressed unit and return the symbols it completed.
    pub fn decode(&mut self, unit: u8) -> Vec<Symbol> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        self.buf.push_byte(unit);

        // A lone-leaf tree codes one symbol per bit; there is no walk.
        if let NodeView::Leaf(symbol) = self.tree.node(self.tree.root()) {
            while self.buf.pop_bit().is_some() {
                out.push(symbol);
                if symbol.is_eof() {
                    self.finished = true;
                    break;
                }
            }
            return out;
        }

        loop {
            match self.tree.node(self.position) {
                NodeView::Leaf(symbol) => {
                    self.position = self.tree.root();
                    out.push(symbol);
                    if symbol.is_eof() {
                        self.finished = true;
                        break;
                    }
                }
                NodeView::Internal(first, second) => match self.buf.pop_bit() {
                    Some(bit) => {
                        self.position = if bit { second } else { first };
                    }
                    None => break,
                },
            }
        }
        out
    }
}

/// Decode a whole compressed buffer.
///
/// Stops at the EOF symbol; input that ends before the terminator yields
/// whatever decoded up to that point.
pub fn decode_bytes(tree: &Tree, data: &[u8]) -> Vec<u8> {
    let mut decoder = Decoder::new(tree);
    let mut out = Vec::new();
    'units: for &unit in data {
        for symbol in decoder.decode(unit) {
            match symbol {
                Symbol::Byte(value) => out.push(value),
                Symbol::Eof => break 'units,
            }
        }
    }
    out
}

/// Pump `reader` through a [`Decoder`] into `writer`, stopping at the EOF
/// symbol. Returns the number of decoded bytes written.
pub fn decode_stream<R: Read, W: Write>(
    tree: &Tree,
    mut reader: R,
    mut writer: W,
) -> Result<u64, ArborError> {
    let mut decoder = Decoder::new(tree);
    let mut written = 0u64;
    let mut buf = [0u8; 8192];
    'units: loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        let mut chunk = Vec::with_capacity(n);
        for &unit in &buf[..n] {
            for symbol in decoder.decode(unit) {
                match symbol {
                    Symbol::Byte(value) => chunk.push(value),
                    Symbol::Eof => {
                        writer.write_all(&chunk)?;
                        written += chunk.len() as u64;
                        break 'units;
                    }
                }
            }
        }
        writer.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_bytes;
    use crate::tree::Tree;

    #[test]
    fn walks_codes_back_to_symbols() {
        let tree = Tree::from_bytes(&[0x41, 0x41, 0x42]);
        // A A B EOF packed as 0 0 10 11 00
        let mut decoder = Decoder::new(&tree);
        let symbols = decoder.decode(0b0010_1100);
        assert_eq!(
            symbols,
            vec![
                Symbol::Byte(0x41),
                Symbol::Byte(0x41),
                Symbol::Byte(0x42),
                Symbol::Eof,
            ],
        );
        assert!(decoder.is_finished());
    }

    #[test]
    fn symbols_span_unit_boundaries() {
        let data = b"abracadabra".to_vec();
        let tree = Tree::from_bytes(&data);
        let encoded = encode_bytes(&tree, &data);
        let mut decoder = Decoder::new(&tree);
        let mut out = Vec::new();
        for &unit in &encoded {
            for symbol in decoder.decode(unit) {
                if let Symbol::Byte(value) = symbol {
                    out.push(value);
                }
            }
        }
        assert_eq!(out, data);
    }

    #[test]
    fn lone_eof_tree_finishes_on_the_first_pad_bit() {
        let tree = Tree::from_bytes(&[]);
        let mut decoder = Decoder::new(&tree);
        assert_eq!(decoder.decode(0x00), vec![Symbol::Eof]);
        assert!(decoder.is_finished());
    }

    #[test]
    fn input_after_eof_is_ignored() {
        let tree = Tree::from_bytes(&[0x41, 0x41, 0x42]);
        let mut decoder = Decoder::new(&tree);
        decoder.decode(0b0010_1100);
        assert!(decoder.is_finished());
        assert_eq!(decoder.decode(0xFF), Vec::new());
    }

    #[test]
    fn truncated_input_yields_the_prefix() {
        let data = b"hello huffman".to_vec();
        let tree = Tree::from_bytes(&data);
        let encoded = encode_bytes(&tree, &data);
        let decoded = decode_bytes(&tree, &encoded[..encoded.len() - 1]);
        assert!(decoded.len() <= data.len());
        assert_eq!(&data[..decoded.len()], &decoded[..]);
    }

    #[test]
    fn stream_and_buffer_decodings_agree() {
        let data: Vec<u8> = (0..=255u8).collect();
        let tree = Tree::from_bytes(&data);
        let encoded = encode_bytes(&tree, &data);
        let mut streamed = Vec::new();
        let written = decode_stream(&tree, &encoded[..], &mut streamed).unwrap();
        assert_eq!(streamed, data);
        assert_eq!(written, data.len() as u64);
    }
}
