use crate::frequency::FrequencyTable;
use std::cmp::Reverse;
use std::collections::binary_heap::BinaryHeap;
use tracing::{debug, instrument};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// A Huffman tree stored as an arena.
///
/// Leaves occupy the first `num_leaves` slots in first-appearance order of
/// their symbols, internal nodes follow in the order they were merged, and
/// the root is the last node. An empty tree has no nodes and no root.
#[derive(Debug, Default, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    num_leaves: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(char),
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    number: usize,
    freq: u64,
    kind: NodeKind,
}

/// Decoder cursor, see [`HuffmanTree::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkIterator {
    idx: NodeId,
    depth: usize,
    leaf: bool,
}

// Ordered by weight first, then by arena index. Arena indices grow with
// creation, so equal weights pop in creation order once the heap is reversed.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct HeapEntry {
    freq: u64,
    idx: NodeId,
}

impl Node {
    /// Diagnostic identifier, starting at 1 in creation order.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn weight(&self) -> u64 {
        self.freq
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn symbol(&self) -> Option<char> {
        match self.kind {
            NodeKind::Leaf(symbol) => Some(symbol),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

impl WalkIterator {
    pub fn idx(&self) -> NodeId {
        self.idx
    }

    /// Edges walked since the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }
}

impl HuffmanTree {
    #[instrument(level = "debug", skip_all, fields(symbols = freqs.len()))]
    pub fn build(freqs: &FrequencyTable) -> HuffmanTree {
        let num_leaves = freqs.len();
        if num_leaves == 0 {
            return HuffmanTree::default();
        }

        let mut nodes = Vec::<Node>::with_capacity(2 * num_leaves - 1);
        let mut heap = BinaryHeap::<Reverse<HeapEntry>>::with_capacity(num_leaves);

        for (symbol, freq) in freqs.iter() {
            let idx = nodes.len();
            nodes.push(Node {
                number: idx + 1,
                freq,
                kind: NodeKind::Leaf(symbol),
            });
            debug!(node = idx + 1, ?symbol, weight = freq, "leaf");

            heap.push(Reverse(HeapEntry { freq, idx }));
        }

        // Pop the two lightest nodes and hang them under a new internal node until
        // only the root is left queued.
        while heap.len() > 1 {
            let Some(Reverse(left)) = heap.pop() else { break };
            let Some(Reverse(right)) = heap.pop() else { break };

            let idx = nodes.len();
            let freq = left.freq + right.freq;
            nodes.push(Node {
                number: idx + 1,
                freq,
                kind: NodeKind::Internal {
                    left: left.idx,
                    right: right.idx,
                },
            });
            debug!(
                node = idx + 1,
                left = nodes[left.idx].number,
                left_weight = left.freq,
                right = nodes[right.idx].number,
                right_weight = right.freq,
                weight = freq,
                "internal"
            );

            heap.push(Reverse(HeapEntry { freq, idx }));
        }

        HuffmanTree { nodes, num_leaves }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn node(&self, idx: NodeId) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// A single-symbol alphabet: the root is the only leaf and nothing was merged.
    pub fn is_degenerate(&self) -> bool {
        self.num_leaves == 1
    }

    /// Root weight, which equals the length of the input the tree was built from.
    pub fn weight(&self) -> u64 {
        self.root().map_or(0, Node::weight)
    }

    pub fn create_walk_iter(&self) -> Option<WalkIterator> {
        let idx = self.root_id()?;

        Some(WalkIterator {
            idx,
            depth: 0,
            leaf: self.is_degenerate(),
        })
    }

    /// Moves the cursor one edge down: left on `false`, right on `true`.
    ///
    /// A cursor on a leaf does not move. In the degenerate tree this means every
    /// bit lands on the sole symbol. Returns `None` for a cursor that does not
    /// point into this tree.
    pub fn walk(&self, iter: WalkIterator, bit: bool) -> Option<WalkIterator> {
        match self.nodes.get(iter.idx)?.kind {
            NodeKind::Leaf(_) => Some(WalkIterator { leaf: true, ..iter }),
            NodeKind::Internal { left, right } => {
                let idx = if bit { right } else { left };

                Some(WalkIterator {
                    idx,
                    depth: iter.depth + 1,
                    leaf: self.nodes.get(idx)?.is_leaf(),
                })
            }
        }
    }
}

impl From<&FrequencyTable> for HuffmanTree {
    fn from(freqs: &FrequencyTable) -> Self {
        HuffmanTree::build(freqs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::from_text(text))
    }

    #[test]
    fn builds_abracadabra_deterministically() {
        let tree = tree("abracadabra");

        assert_eq!(tree.num_leaves(), 5);
        assert_eq!(tree.nodes().len(), 9);
        assert_eq!(tree.weight(), 11);

        let root = tree.root().unwrap();
        assert_eq!(root.number(), 9);

        // c and d (weight 1) merge first, then b and r (weight 2, in creation order).
        let expected = [
            (6, 2, NodeKind::Internal { left: 3, right: 4 }),
            (7, 4, NodeKind::Internal { left: 1, right: 2 }),
            (8, 6, NodeKind::Internal { left: 5, right: 6 }),
            (9, 11, NodeKind::Internal { left: 0, right: 7 }),
        ];
        for (number, weight, kind) in expected {
            let node = tree.node(number - 1).unwrap();
            assert_eq!(node.number(), number);
            assert_eq!(node.weight(), weight);
            assert_eq!(node.kind(), kind);
        }
    }

    #[test]
    fn every_symbol_is_exactly_one_leaf() {
        let tree = tree("mississippi river");
        let mut leaves: Vec<char> = tree.nodes().iter().filter_map(Node::symbol).collect();
        leaves.sort_unstable();

        let mut expected: Vec<char> = "mississippi river".chars().collect();
        expected.sort_unstable();
        expected.dedup();

        assert_eq!(leaves, expected);
    }

    #[test]
    fn single_symbol_tree_is_a_lone_leaf() {
        let tree = tree("aaaa");

        assert!(tree.is_degenerate());
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.root().unwrap().symbol(), Some('a'));
        assert_eq!(tree.weight(), 4);
    }

    #[test]
    fn empty_table_builds_empty_tree() {
        let tree = tree("");

        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.create_walk_iter().is_none());
        assert_eq!(tree.weight(), 0);
    }

    #[test]
    fn walk_follows_bits_to_a_leaf() {
        let tree = tree("abracadabra");
        let mut iter = tree.create_walk_iter().unwrap();
        assert!(!iter.is_leaf());

        // "110" is the path to 'b'.
        for bit in [true, true, false] {
            iter = tree.walk(iter, bit).unwrap();
        }

        assert!(iter.is_leaf());
        assert_eq!(iter.depth(), 3);
        assert_eq!(tree.node(iter.idx()).unwrap().symbol(), Some('b'));
    }

    #[test]
    fn walk_stays_on_degenerate_root() {
        let tree = tree("zz");
        let start = tree.create_walk_iter().unwrap();

        let iter = tree.walk(start, true).unwrap();

        assert!(iter.is_leaf());
        assert_eq!(iter, start);
    }

    #[test]
    fn walk_rejects_cursor_from_a_larger_tree() {
        let large = tree("abracadabra");
        let small = tree("ab");
        let cursor = large.create_walk_iter().unwrap();

        assert_eq!(cursor.idx(), 8);
        assert!(small.walk(cursor, false).is_none());
    }

    #[test]
    fn builds_from_frequency_table_conversion() {
        let freqs = FrequencyTable::from_text("abracadabra");
        let tree = HuffmanTree::from(&freqs);

        assert_eq!(tree.weight(), freqs.total());
        assert_eq!(tree.num_leaves(), freqs.len());
    }
}
