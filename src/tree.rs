//! The Huffman coding tree: frequency counting, bottom-up construction and
//! the labeling pass that assigns every node its bit-code.
//!
//! Nodes live in an arena indexed by [`NodeId`]; internal nodes store child
//! indices and every node stores an optional parent index. A tree is built
//! once, labeled once and read-only afterwards.

use std::collections::HashMap;
use std::io::{ErrorKind, Read};

use crate::error::ArborError;
use crate::symbol::Symbol;

/// Stable index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Leaf(Symbol),
    Internal { first: NodeId, second: NodeId },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) frequency: u64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    /// Path from the root: `false` per first-child edge, `true` per second.
    /// Assigned by the labeling pass.
    pub(crate) code: Vec<bool>,
}

/// Borrowed view of one node, for total matches during tree walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeView {
    Leaf(Symbol),
    Internal(NodeId, NodeId),
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Count byte frequencies across `reader` in one streaming pass and
    /// build the coding tree. Only the 256-entry table is held in memory.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArborError> {
        Ok(Self::from_frequencies(&count_frequencies(reader)?))
    }

    /// Build the coding tree for an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self::from_frequencies(&counts)
    }

    /// Build the coding tree from a per-byte frequency table. The EOF leaf
    /// is always added with count 1, so even an all-zero table produces a
    /// (single-leaf) tree.
    pub fn from_frequencies(counts: &[u64; 256]) -> Self {
        let mut leaves: Vec<(Symbol, u64)> = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(value, &count)| (Symbol::Byte(value as u8), count))
            .collect();
        leaves.push((Symbol::Eof, 1));
        Self::from_leaves(leaves)
    }

    /// Merge candidates until one root remains.
    ///
    /// The candidate list starts in symbol order and is re-sorted
    /// (descending by frequency, stable) before every merge; the two tail
    /// candidates are replaced by their parent, whose first child is the
    /// second-smallest and second child the smallest. The stable re-sort
    /// keeps equal frequencies in insertion order, which pins the tree
    /// shape for a given input. A full re-sort per merge is fine at this
    /// alphabet size (at most 257 leaves).
    fn from_leaves(leaves: Vec<(Symbol, u64)>) -> Self {
        let mut nodes: Vec<Node> = Vec::with_capacity(leaves.len() * 2);
        let mut candidates: Vec<NodeId> = leaves
            .into_iter()
            .map(|(symbol, frequency)| {
                nodes.push(Node {
                    frequency,
                    parent: None,
                    kind: NodeKind::Leaf(symbol),
                    code: Vec::new(),
                });
                NodeId(nodes.len() - 1)
            })
            .collect();

        while candidates.len() > 1 {
            candidates.sort_by(|a, b| nodes[b.0].frequency.cmp(&nodes[a.0].frequency));
            if let (Some(second), Some(first)) = (candidates.pop(), candidates.pop()) {
                let frequency = nodes[first.0].frequency + nodes[second.0].frequency;
                let parent = NodeId(nodes.len());
                nodes.push(Node {
                    frequency,
                    parent: None,
                    kind: NodeKind::Internal { first, second },
                    code: Vec::new(),
                });
                nodes[first.0].parent = Some(parent);
                nodes[second.0].parent = Some(parent);
                candidates.push(parent);
            }
        }

        let root = candidates
            .pop()
            .expect("candidate list always contains the EOF leaf");
        let mut tree = Tree { nodes, root };
        tree.assign_codes();
        tree
    }

    /// Assemble a tree from an already-built arena (the `.tree` parser's
    /// path) and run the labeling pass over it.
    pub(crate) fn from_arena(nodes: Vec<Node>, root: NodeId) -> Self {
        let mut tree = Tree { nodes, root };
        tree.assign_codes();
        tree
    }

    /// Label every node with its path from the root. A root that is itself
    /// a leaf gets the single bit `0`; an internal root the empty code.
    fn assign_codes(&mut self) {
        let root = self.root;
        self.nodes[root.0].code = match self.nodes[root.0].kind {
            NodeKind::Leaf(_) => vec![false],
            NodeKind::Internal { .. } => Vec::new(),
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let NodeKind::Internal { first, second } = self.nodes[id.0].kind {
                let prefix = self.nodes[id.0].code.clone();
                let mut code = prefix.clone();
                code.push(false);
                self.nodes[first.0].code = code;
                let mut code = prefix;
                code.push(true);
                self.nodes[second.0].code = code;
                stack.push(first);
                stack.push(second);
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> NodeView {
        match self.nodes[id.0].kind {
            NodeKind::Leaf(symbol) => NodeView::Leaf(symbol),
            NodeKind::Internal { first, second } => NodeView::Internal(first, second),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Sum of descendant leaf frequencies. Zero throughout a tree parsed
    /// from a `.tree` artifact, which carries no statistics.
    pub fn frequency(&self, id: NodeId) -> u64 {
        self.nodes[id.0].frequency
    }

    /// The node's bit-code as assigned by the labeling pass.
    pub fn code(&self, id: NodeId) -> &[bool] {
        &self.nodes[id.0].code
    }

    /// The leaf reached by walking only first-child edges from the root.
    /// Encoding falls back to this leaf for symbols the tree lacks.
    pub fn default_leaf(&self) -> NodeId {
        let mut id = self.root;
        while let NodeKind::Internal { first, .. } = self.nodes[id.0].kind {
            id = first;
        }
        id
    }

    /// Every `(symbol, code)` pair in the tree, in arena order.
    pub fn leaf_codes(&self) -> Vec<(Symbol, Vec<bool>)> {
        self.nodes
            .iter()
            .filter_map(|node| match node.kind {
                NodeKind::Leaf(symbol) => Some((symbol, node.code.clone())),
                NodeKind::Internal { .. } => None,
            })
            .collect()
    }

    /// Derive the symbol-to-code lookup table the encoder works from.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = HashMap::new();
        for node in &self.nodes {
            if let NodeKind::Leaf(symbol) = node.kind {
                codes.insert(symbol, node.code.clone());
            }
        }
        let default_code = self.code(self.default_leaf()).to_vec();
        CodeTable {
            codes,
            default_code,
        }
    }
}

/// Symbol-to-code lookup derived once from a labeled tree.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: HashMap<Symbol, Vec<bool>>,
    default_code: Vec<bool>,
}

impl CodeTable {
    /// The code for `symbol`, falling back to the tree's default leaf for
    /// symbols without one. The fallback decodes to a different byte, so
    /// encoding against a foreign tree is lossy rather than an error.
    pub fn code(&self, symbol: Symbol) -> &[bool] {
        self.codes
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_code)
    }

    /// The terminator code appended by the encoder's flush.
    pub fn eof_code(&self) -> &[bool] {
        self.code(Symbol::Eof)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.codes.contains_key(&symbol)
    }

    /// Number of symbols with a code of their own.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[bool])> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_slice()))
    }
}

/// One streaming pass of per-byte frequency counting.
pub fn count_frequencies<R: Read>(mut reader: R) -> Result<[u64; 256], ArborError> {
    let mut counts = [0u64; 256];
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &b in &buf[..n] {
            counts[b as usize] += 1;
        }
    }
    Ok(counts)
}
