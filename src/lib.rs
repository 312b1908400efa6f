//! Huffman coding of text with a Graphviz view of the code tree.
//!
//! ```
//! use huffviz::codec::{build, decode, encode};
//!
//! let (tree, codes) = build("abracadabra")?;
//! let bits = encode("abracadabra", &codes)?;
//! assert_eq!(bits.len(), 23);
//! assert_eq!(decode(&bits, &tree)?, "abracadabra");
//! # Ok::<(), huffviz::HuffmanError>(())
//! ```

pub mod bitstream;
pub mod code;
pub mod codec;
pub mod dot;
pub mod error;
pub mod frequency;
pub mod huffman;

pub use bitstream::BitStream;
pub use code::{CodeTable, PrefixCode};
pub use codec::Huffman;
pub use error::HuffmanError;
pub use frequency::FrequencyTable;
pub use huffman::HuffmanTree;
