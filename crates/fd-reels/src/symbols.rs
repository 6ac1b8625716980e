//! Symbol definitions

use serde::{Deserialize, Serialize};

/// A reel symbol. All four are drawn with equal probability; only equality matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    Cherry = 0,
    Bell = 1,
    Bar = 2,
    Seven = 3,
}

impl Symbol {
    /// Every symbol, in id order
    pub const ALL: [Symbol; 4] = [Symbol::Cherry, Symbol::Bell, Symbol::Bar, Symbol::Seven];

    /// Number of distinct symbols
    pub const COUNT: usize = Self::ALL.len();

    /// Symbol for an id (0..4)
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Bell => "bell",
            Symbol::Bar => "bar",
            Symbol::Seven => "seven",
        }
    }

    /// Single-character glyph for text dumps
    pub fn glyph(self) -> char {
        match self {
            Symbol::Cherry => 'C',
            Symbol::Bell => 'B',
            Symbol::Bar => '=',
            Symbol::Seven => '7',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for symbol in Symbol::ALL {
            assert_eq!(Symbol::from_id(symbol.id()), Some(symbol));
        }
        assert_eq!(Symbol::from_id(4), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Symbol::Seven).unwrap();
        assert_eq!(json, "\"seven\"");
    }
}
