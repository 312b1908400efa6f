use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::huffman::{HuffmanTree, NodeId, NodeKind};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A code word. Bit `i` of the path from the root is stored at bit `i` of `code`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefixCode {
    code: u64,
    length: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: HashMap<char, PrefixCode>,
}

impl PrefixCode {
    pub const MAX_LENGTH: usize = u64::BITS as usize;

    /// Code given to the only symbol of a single-symbol alphabet.
    pub const DEGENERATE: PrefixCode = PrefixCode { code: 0, length: 1 };

    fn update(prefix_code: PrefixCode, bit: bool) -> PrefixCode {
        PrefixCode {
            code: prefix_code.code | ((bit as u64) << prefix_code.length),
            length: prefix_code.length + 1,
        }
    }

    pub fn bits(&self) -> u64 {
        self.code
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn bit(&self, idx: usize) -> Option<bool> {
        (idx < self.len()).then(|| (self.code >> idx) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(|idx| (self.code >> idx) & 1 == 1)
    }

    pub fn is_prefix_of(&self, other: &PrefixCode) -> bool {
        let mask = u64::MAX
            .checked_shr(u64::BITS - self.length as u32)
            .unwrap_or(0);

        self.length <= other.length && (other.code & mask) == self.code
    }
}

impl std::fmt::Display for PrefixCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PrefixCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrefixCode {{ code: {}, length: {} }}", self, self.length)
    }
}

impl CodeTable {
    /// Walks the tree depth-first, appending `0` on every left edge and `1` on
    /// every right edge, and records the path of each leaf.
    #[instrument(level = "debug", skip_all, fields(leaves = tree.num_leaves()))]
    pub fn build(tree: &HuffmanTree) -> Result<CodeTable> {
        let mut table = CodeTable::default();

        let Some(root) = tree.root_id() else {
            return Ok(table);
        };

        let mut stack: Vec<(NodeId, PrefixCode)> = vec![(root, PrefixCode::default())];

        while let Some((idx, code)) = stack.pop() {
            match tree.nodes()[idx].kind() {
                NodeKind::Leaf(symbol) => {
                    let code = if tree.is_degenerate() {
                        PrefixCode::DEGENERATE
                    } else {
                        code
                    };
                    debug!(?symbol, %code, "code");
                    table.codes.insert(symbol, code);
                }
                NodeKind::Internal { left, right } => {
                    if code.len() == PrefixCode::MAX_LENGTH {
                        return Err(HuffmanError::CodeTooLong {
                            symbol: leftmost_symbol(tree, idx),
                            length: PrefixCode::MAX_LENGTH + 1,
                        });
                    }

                    // Right goes first so the left subtree is popped first.
                    stack.push((right, PrefixCode::update(code, true)));
                    stack.push((left, PrefixCode::update(code, false)));
                }
            }
        }

        Ok(table)
    }

    pub fn code(&self, symbol: char) -> Option<&PrefixCode> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates `(symbol, code)` pairs sorted by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (char, &PrefixCode)> + '_ {
        let mut entries: Vec<_> = self.codes.iter().map(|(&symbol, code)| (symbol, code)).collect();
        entries.sort_unstable_by_key(|&(symbol, _)| symbol);
        entries.into_iter()
    }

    /// Number of bits needed to encode an input with the given frequencies.
    pub fn encoded_len(&self, freqs: &FrequencyTable) -> Result<u64> {
        freqs.iter().try_fold(0, |acc, (symbol, count)| {
            let code = self.code(symbol).ok_or(HuffmanError::UnknownSymbol(symbol))?;
            Ok::<u64, HuffmanError>(acc + count * code.len() as u64)
        })
    }

    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&PrefixCode> = self.codes.values().collect();

        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }
}

impl TryFrom<&HuffmanTree> for CodeTable {
    type Error = HuffmanError;

    fn try_from(tree: &HuffmanTree) -> Result<Self> {
        CodeTable::build(tree)
    }
}

fn leftmost_symbol(tree: &HuffmanTree, mut idx: NodeId) -> char {
    loop {
        match tree.nodes()[idx].kind() {
            NodeKind::Leaf(symbol) => return symbol,
            NodeKind::Internal { left, .. } => idx = left,
        }
    }
}
