use crate::bitstream::BitStream;
use crate::code::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::huffman::HuffmanTree;
use tracing::{instrument, trace};

/// Counts the symbols of `text` and builds its tree and code table.
#[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
pub fn build(text: &str) -> Result<(HuffmanTree, CodeTable)> {
    let freqs = FrequencyTable::from(text);
    let tree = HuffmanTree::from(&freqs);
    let codes = CodeTable::try_from(&tree)?;

    Ok((tree, codes))
}

#[instrument(level = "debug", skip_all, fields(codes = codes.len()))]
pub fn encode(text: &str, codes: &CodeTable) -> Result<BitStream> {
    let mut stream = BitStream::new();

    for symbol in text.chars() {
        let code = codes
            .code(symbol)
            .ok_or(HuffmanError::UnknownSymbol(symbol))?;
        stream.push_code(code);
    }

    Ok(stream)
}

/// Walks the tree bit by bit, emitting a symbol and restarting at the root
/// whenever the cursor lands on a leaf.
#[instrument(level = "debug", skip_all, fields(bits = bits.len()))]
pub fn decode(bits: &BitStream, tree: &HuffmanTree) -> Result<String> {
    let mut decoded = String::new();

    if bits.is_empty() {
        return Ok(decoded);
    }

    let start = tree.create_walk_iter().ok_or(HuffmanError::EmptyInput)?;
    let mut iter = start;
    let mut code_start = 0;

    for (position, bit) in bits.iter().enumerate() {
        if iter.depth() == 0 {
            code_start = position;
        }

        // Cursors handed out by this tree always point into it.
        let Some(next) = tree.walk(iter, bit) else {
            break;
        };
        iter = next;

        if iter.is_leaf() {
            if let Some(symbol) = tree.node(iter.idx()).and_then(|node| node.symbol()) {
                trace!(?symbol, depth = iter.depth(), "decoded");
                decoded.push(symbol);
            }
            iter = start;
        }
    }

    if iter.depth() != 0 {
        return Err(HuffmanError::TruncatedStream { offset: code_start });
    }

    Ok(decoded)
}

/// Sizes reported after encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Size of the UTF-8 input in bits.
    pub input_bits: u64,
    pub encoded_bits: u64,
}

impl CompressionStats {
    pub fn ratio(&self) -> f64 {
        if self.input_bits == 0 {
            return 0.0;
        }
        self.encoded_bits as f64 / self.input_bits as f64
    }
}

/// A coder bound to one input string.
///
/// Construction counts the symbols and builds the tree and code table once;
/// both are read-only afterwards.
#[derive(Debug, Clone)]
pub struct Huffman {
    text: String,
    freqs: FrequencyTable,
    tree: HuffmanTree,
    codes: CodeTable,
}

impl Huffman {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let freqs = FrequencyTable::from(text.as_str());
        let tree = HuffmanTree::from(&freqs);
        let codes = CodeTable::try_from(&tree)?;

        Ok(Huffman {
            text,
            freqs,
            tree,
            codes,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freqs
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    pub fn encode(&self) -> Result<BitStream> {
        encode(&self.text, &self.codes)
    }

    pub fn decode(&self, bits: &BitStream) -> Result<String> {
        decode(bits, &self.tree)
    }

    /// Encodes the input and decodes it again.
    pub fn round_trip(&self) -> Result<(BitStream, String)> {
        let bits = self.encode()?;
        let recovered = self.decode(&bits)?;
        Ok((bits, recovered))
    }

    pub fn stats(&self) -> Result<CompressionStats> {
        Ok(CompressionStats {
            input_bits: self.text.len() as u64 * 8,
            encoded_bits: self.codes.encoded_len(&self.freqs)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABRACADABRA_BITS: &str = "01101110100010101101110";

    #[test]
    fn encodes_abracadabra() {
        let (_, codes) = build("abracadabra").unwrap();
        let bits = encode("abracadabra", &codes).unwrap();

        assert_eq!(bits.to_string(), ABRACADABRA_BITS);
    }

    #[test]
    fn decodes_abracadabra() {
        let (tree, _) = build("abracadabra").unwrap();
        let bits: BitStream = ABRACADABRA_BITS.parse().unwrap();

        assert_eq!(decode(&bits, &tree).unwrap(), "abracadabra");
    }

    #[test]
    fn single_symbol_round_trip() {
        let (tree, codes) = build("aaaa").unwrap();
        let bits = encode("aaaa", &codes).unwrap();

        assert_eq!(bits.to_string(), "0000");
        assert_eq!(decode(&bits, &tree).unwrap(), "aaaa");
    }

    #[test]
    fn single_symbol_decode_ignores_bit_values() {
        let (tree, _) = build("q").unwrap();
        let bits: BitStream = "101".parse().unwrap();

        assert_eq!(decode(&bits, &tree).unwrap(), "qqq");
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let (tree, codes) = build("").unwrap();
        let bits = encode("", &codes).unwrap();

        assert!(bits.is_empty());
        assert_eq!(decode(&bits, &tree).unwrap(), "");
    }

    #[test]
    fn bits_against_empty_tree_fail() {
        let (tree, _) = build("").unwrap();
        let bits: BitStream = "0".parse().unwrap();

        assert_eq!(decode(&bits, &tree), Err(HuffmanError::EmptyInput));
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let (_, codes) = build("abc").unwrap();

        assert_eq!(
            encode("abcd", &codes),
            Err(HuffmanError::UnknownSymbol('d'))
        );
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let (tree, _) = build("abracadabra").unwrap();
        // "0" decodes 'a', "11" stops inside the b/r subtree.
        let bits: BitStream = "011".parse().unwrap();

        assert_eq!(
            decode(&bits, &tree),
            Err(HuffmanError::TruncatedStream { offset: 1 })
        );
    }

    #[test]
    fn truncation_reports_where_the_unfinished_code_starts() {
        let (tree, _) = build("abracadabra").unwrap();
        let bits: BitStream = format!("{ABRACADABRA_BITS}11").parse().unwrap();

        assert_eq!(
            decode(&bits, &tree),
            Err(HuffmanError::TruncatedStream { offset: 23 })
        );
    }

    #[test]
    fn session_round_trips_and_reports_sizes() {
        let huffman = Huffman::new("abracadabra").unwrap();
        let (bits, recovered) = huffman.round_trip().unwrap();

        assert_eq!(recovered, huffman.text());
        assert_eq!(bits.len(), 23);

        let stats = huffman.stats().unwrap();
        assert_eq!(stats.input_bits, 88);
        assert_eq!(stats.encoded_bits, 23);
        assert!(stats.ratio() < 0.3);
    }
}
