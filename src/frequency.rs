use std::collections::HashMap;

/// Occurrence count of every distinct symbol of an input string.
///
/// Symbols are kept in the order they first appear in the input. The tree
/// builder creates its leaves in this order, so ties between equal weights
/// are always broken the same way for the same input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(char, u64)>,
    index: HashMap<char, usize>,
}

impl FrequencyTable {
    pub fn from_text(text: &str) -> Self {
        let mut table = FrequencyTable::default();

        for symbol in text.chars() {
            table.add(symbol);
        }

        table
    }

    fn add(&mut self, symbol: char) {
        match self.index.get(&symbol) {
            Some(&idx) => self.entries[idx].1 += 1,
            None => {
                self.index.insert(symbol, self.entries.len());
                self.entries.push((symbol, 1));
            }
        }
    }

    pub fn count(&self, symbol: char) -> Option<u64> {
        self.index.get(&symbol).map(|&idx| self.entries[idx].1)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the number of symbols in the input.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterates `(symbol, count)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.entries.iter().copied()
    }
}

impl From<&str> for FrequencyTable {
    fn from(text: &str) -> Self {
        FrequencyTable::from_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_abracadabra() {
        let table = FrequencyTable::from_text("abracadabra");

        assert_eq!(table.len(), 5);
        assert_eq!(table.total(), 11);
        assert_eq!(table.count('a'), Some(5));
        assert_eq!(table.count('b'), Some(2));
        assert_eq!(table.count('r'), Some(2));
        assert_eq!(table.count('c'), Some(1));
        assert_eq!(table.count('d'), Some(1));
        assert_eq!(table.count('z'), None);
    }

    #[test]
    fn keeps_first_appearance_order() {
        let table = FrequencyTable::from_text("abracadabra");
        let order: Vec<char> = table.iter().map(|(symbol, _)| symbol).collect();

        assert_eq!(order, vec!['a', 'b', 'r', 'c', 'd']);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = FrequencyTable::from_text("");

        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn counts_multibyte_chars_once() {
        let table = FrequencyTable::from("héé🦀");

        assert_eq!(table.count('é'), Some(2));
        assert_eq!(table.count('🦀'), Some(1));
        assert_eq!(table.total(), 4);
    }
}
