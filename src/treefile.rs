//! The `.tree` artifact: a self-delimiting byte encoding of the coding tree
//! that lets an encoder and a decoder agree on a code without re-deriving
//! it from data.
//!
//! Grammar, with all markers in-band (no length prefixes):
//!
//! ```text
//! tree := '{' tree tree '}'     internal node, children in order
//!       | '-' byte              leaf holding a literal byte value
//!       | '-' '-' '-' '-'       leaf holding the EOF sentinel
//! ```
//!
//! The EOF sentinel has no byte value of its own, so it is escaped as four
//! consecutive `-` bytes. A literal `-` leaf (value 0x2D) is the two-byte
//! sequence `--`; the parser tells the two apart by counting consecutive
//! hyphens, resolving a run eagerly once it reaches four. The degenerate
//! tree holding only the EOF leaf serializes as the bare escape, with no
//! surrounding braces.

use crate::error::ArborError;
use crate::symbol::Symbol;
use crate::tree::{Node, NodeId, NodeKind, NodeView, Tree};

/// Opens an internal node.
pub const NODE_OPEN: u8 = b'{';
/// Closes an internal node.
pub const NODE_CLOSE: u8 = b'}';
/// Starts a leaf; four in a row are the EOF escape.
pub const LEAF_MARKER: u8 = b'-';

const EOF_ESCAPE_LEN: usize = 4;

/// Serialize a tree into the `.tree` byte form.
pub fn serialize(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::with_capacity(tree.len() * 2);
    write_node(tree, tree.root(), &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, out: &mut Vec<u8>) {
    match tree.node(id) {
        NodeView::Internal(first, second) => {
            out.push(NODE_OPEN);
            write_node(tree, first, out);
            write_node(tree, second, out);
            out.push(NODE_CLOSE);
        }
        NodeView::Leaf(Symbol::Byte(value)) => {
            out.push(LEAF_MARKER);
            out.push(value);
        }
        NodeView::Leaf(Symbol::Eof) => {
            out.extend_from_slice(&[LEAF_MARKER; EOF_ESCAPE_LEN]);
        }
    }
}

/// Parse a complete `.tree` byte sequence.
pub fn parse(data: &[u8]) -> Result<Tree, ArborError> {
    let mut parser = TreeParser::new();
    for &byte in data {
        parser.push(byte)?;
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Leaf(Symbol),
    Internal {
        first: Option<usize>,
        second: Option<usize>,
    },
}

/// Byte-at-a-time `.tree` parser.
///
/// Feed every byte through [`push`](Self::push) and call
/// [`finish`](Self::finish) at end of input; any structural violation fails
/// immediately with [`ArborError::CorruptTree`] and no partial tree is ever
/// handed out.
#[derive(Debug, Default)]
pub struct TreeParser {
    nodes: Vec<Pending>,
    parents: Vec<Option<usize>>,
    root: Option<usize>,
    /// Innermost internal node still open; `None` once the root closed.
    current: Option<usize>,
    /// Consecutive `-` bytes not yet resolved (0..=3).
    hyphens: usize,
    closed: bool,
}

impl TreeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one byte of the serialized tree.
    pub fn push(&mut self, byte: u8) -> Result<(), ArborError> {
        if self.closed {
            return Err(ArborError::CorruptTree(
                "trailing data after the tree closed".into(),
            ));
        }
        if byte == LEAF_MARKER {
            self.hyphens += 1;
            if self.hyphens == EOF_ESCAPE_LEN {
                self.hyphens = 0;
                self.attach_leaf(Symbol::Eof)?;
            }
            return Ok(());
        }
        match std::mem::take(&mut self.hyphens) {
            0 => self.structural(byte),
            // one pending hyphen is a leaf marker; this byte is its value
            1 => self.attach_leaf(Symbol::Byte(byte)),
            // two: the run itself was a literal `-` leaf
            2 => {
                self.attach_leaf(Symbol::Byte(LEAF_MARKER))?;
                self.structural(byte)
            }
            // three: a literal `-` leaf, then a marker awaiting this value
            3 => {
                self.attach_leaf(Symbol::Byte(LEAF_MARKER))?;
                self.attach_leaf(Symbol::Byte(byte))
            }
            n => Err(ArborError::Internal(format!(
                "unresolved hyphen run of {n}"
            ))),
        }
    }

    fn structural(&mut self, byte: u8) -> Result<(), ArborError> {
        match byte {
            NODE_OPEN => self.open_node(),
            NODE_CLOSE => self.close_node(),
            other => Err(ArborError::CorruptTree(format!(
                "unexpected byte 0x{other:02X} outside a leaf"
            ))),
        }
    }

    fn open_node(&mut self) -> Result<(), ArborError> {
        let id = self.nodes.len();
        self.nodes.push(Pending::Internal {
            first: None,
            second: None,
        });
        self.parents.push(self.current);
        match self.current {
            None => self.root = Some(id),
            Some(parent) => self.fill_slot(parent, id)?,
        }
        self.current = Some(id);
        Ok(())
    }

    fn close_node(&mut self) -> Result<(), ArborError> {
        match self.current {
            None => Err(ArborError::CorruptTree("unmatched '}'".into())),
            Some(id) => {
                self.current = self.parents[id];
                if self.current.is_none() {
                    self.closed = true;
                }
                Ok(())
            }
        }
    }

    fn attach_leaf(&mut self, symbol: Symbol) -> Result<(), ArborError> {
        let id = self.nodes.len();
        match self.current {
            Some(parent) => {
                self.nodes.push(Pending::Leaf(symbol));
                self.parents.push(Some(parent));
                self.fill_slot(parent, id)
            }
            // A leaf with nothing open is only valid as the entire tree.
            None => {
                self.nodes.push(Pending::Leaf(symbol));
                self.parents.push(None);
                self.root = Some(id);
                self.closed = true;
                Ok(())
            }
        }
    }

    fn fill_slot(&mut self, parent: usize, child: usize) -> Result<(), ArborError> {
        match &mut self.nodes[parent] {
            Pending::Internal { first, second } => {
                if first.is_none() {
                    *first = Some(child);
                } else if second.is_none() {
                    *second = Some(child);
                } else {
                    return Err(ArborError::CorruptTree(
                        "node already has two children".into(),
                    ));
                }
                Ok(())
            }
            Pending::Leaf(_) => Err(ArborError::Internal(
                "attachment target is a leaf".into(),
            )),
        }
    }

    /// Validate the finished structure, label it and hand the tree out.
    pub fn finish(mut self) -> Result<Tree, ArborError> {
        // a trailing two-hyphen run is a complete literal `-` leaf
        if self.hyphens == 2 {
            self.hyphens = 0;
            self.attach_leaf(Symbol::Byte(LEAF_MARKER))?;
        }
        if self.hyphens != 0 {
            return Err(ArborError::CorruptTree(
                "input ends inside a leaf marker".into(),
            ));
        }
        if self.current.is_some() {
            return Err(ArborError::CorruptTree(
                "input ends before the tree closed".into(),
            ));
        }
        let root = match self.root {
            Some(root) => root,
            None => return Err(ArborError::CorruptTree("empty tree data".into())),
        };

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (id, pending) in self.nodes.iter().enumerate() {
            let kind = match *pending {
                Pending::Leaf(symbol) => NodeKind::Leaf(symbol),
                Pending::Internal {
                    first: Some(first),
                    second: Some(second),
                } => NodeKind::Internal {
                    first: NodeId(first),
                    second: NodeId(second),
                },
                Pending::Internal { .. } => {
                    return Err(ArborError::CorruptTree(
                        "internal node is missing a child".into(),
                    ))
                }
            };
            nodes.push(Node {
                frequency: 0,
                parent: self.parents[id].map(NodeId),
                kind,
                code: Vec::new(),
            });
        }
        Ok(Tree::from_arena(nodes, NodeId(root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use crate::tree::Tree;

    fn sorted_codes(tree: &Tree) -> Vec<(Symbol, Vec<bool>)> {
        let mut codes = tree.leaf_codes();
        codes.sort();
        codes
    }

    #[test]
    fn serializes_the_expected_byte_layout() {
        // A twice, B once: A pairs against the {B, EOF} subtree
        let tree = Tree::from_bytes(&[0x41, 0x41, 0x42]);
        assert_eq!(
            serialize(&tree),
            vec![b'{', b'-', 0x41, b'{', b'-', 0x42, b'-', b'-', b'-', b'-', b'}', b'}'],
        );
    }

    #[test]
    fn reparsing_preserves_every_code() {
        let tree = Tree::from_bytes(&[0x41, 0x41, 0x42]);
        let parsed = parse(&serialize(&tree)).unwrap();
        assert_eq!(sorted_codes(&tree), sorted_codes(&parsed));
    }

    #[test]
    fn lone_eof_tree_is_the_bare_escape() {
        let tree = Tree::from_bytes(&[]);
        let bytes = serialize(&tree);
        assert_eq!(bytes, vec![b'-'; 4]);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.code(parsed.root()), &[false]);
    }

    #[test]
    fn hyphen_valued_leaf_survives_the_escape_convention() {
        // two 0x2D bytes and two 'A's; the tree holds a literal '-' leaf
        let tree = Tree::from_bytes(&[0x2D, 0x2D, 0x41, 0x41]);
        let bytes = serialize(&tree);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(sorted_codes(&tree), sorted_codes(&parsed));
    }

    #[test]
    fn hyphen_leaf_just_before_the_close_brace() {
        // shape: { { -A ---- } -- }  with the literal '-' leaf last
        let tree = Tree::from_bytes(&[0x2D, 0x2D, 0x41, 0x41]);
        let bytes = serialize(&tree);
        assert!(bytes.ends_with(&[b'-', b'-', b'}']));
        assert!(parse(&bytes).is_ok());
    }

    #[test]
    fn adjacent_hyphen_leaf_and_eof_escape_resolve_eagerly() {
        // One 0x2D byte in the input puts the literal '-' leaf and the EOF
        // leaf side by side: six hyphens in a row. The run cannot encode
        // which of the two came first, and the parser always takes the
        // first four as the EOF escape.
        let tree = Tree::from_bytes(&[0x2D]);
        let bytes = serialize(&tree);
        assert_eq!(bytes, vec![b'{', b'-', b'-', b'-', b'-', b'-', b'-', b'}']);
        let parsed = parse(&bytes).unwrap();
        let codes = sorted_codes(&parsed);
        assert_eq!(codes[0], (Symbol::Byte(0x2D), vec![true]));
        assert_eq!(codes[1], (Symbol::Eof, vec![false]));
    }

    #[test]
    fn literal_leaves_can_hold_the_marker_bytes() {
        // values 0x7B and 0x7D are plain bytes after a single marker
        let tree = Tree::from_bytes(&[0x7B, 0x7B, 0x7D]);
        let parsed = parse(&serialize(&tree)).unwrap();
        assert_eq!(sorted_codes(&tree), sorted_codes(&parsed));
    }

    #[test]
    fn rejects_unbalanced_open() {
        let err = parse(b"{-A-B").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_unmatched_close() {
        let err = parse(b"{-A-B}}").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_a_third_child() {
        let err = parse(b"{-A-B-C}").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_childless_internal_nodes() {
        let err = parse(b"{{}-A}").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse(b"{-A----}X").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_a_dangling_leaf_marker() {
        let err = parse(b"{-A-").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse(b"").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }

    #[test]
    fn rejects_bytes_outside_any_leaf() {
        let err = parse(b"{A").unwrap_err();
        assert!(matches!(err, ArborError::CorruptTree(_)));
    }
}
