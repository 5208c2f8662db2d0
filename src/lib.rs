//! Core logic for the Arbor Huffman codec.
//!
//! A coding tree is built from the byte frequencies of an input stream,
//! persisted as a compact `.tree` artifact, and drives a bit-level
//! encode/decode protocol over `.hf` payloads terminated by a sentinel
//! end-of-stream code. Encoder and decoder only need to share the `.tree`
//! bytes; neither ever sees the original statistics.

pub mod bits;
pub mod decode;
pub mod encode;
pub mod error;
pub mod io_utils;
pub mod stats;
pub mod symbol;
pub mod tree;
pub mod treefile;

pub use decode::{decode_bytes, decode_stream, Decoder};
pub use encode::{encode_bytes, encode_stream, Encoder};
pub use error::ArborError;
pub use stats::{CodecStats, LiveStats, StatsSummary};
pub use symbol::Symbol;
pub use tree::{CodeTable, NodeId, NodeView, Tree};

/// A compressed payload together with the serialized tree that decodes it.
#[derive(Debug, Clone)]
pub struct Compressed {
    /// The `.tree` artifact bytes.
    pub tree: Vec<u8>,
    /// The `.hf` payload bytes.
    pub data: Vec<u8>,
}

/// Build a coding tree for `data` and compress it in one call.
pub fn compress(data: &[u8]) -> Compressed {
    let tree = Tree::from_bytes(data);
    Compressed {
        tree: treefile::serialize(&tree),
        data: encode_bytes(&tree, data),
    }
}

/// Reconstruct the original bytes from a `.tree` artifact and its payload.
pub fn decompress(tree: &[u8], data: &[u8]) -> Result<Vec<u8>, ArborError> {
    let tree = treefile::parse(tree)?;
    Ok(decode_bytes(&tree, data))
}
