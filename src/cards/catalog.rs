//! Tokens and the catalog they are drawn from.
//!
//! A `Token` is the face value two paired cards share. The engine never looks
//! inside it beyond equality; the default catalog uses colour strings because
//! that is what the reference presentation paints.
//!
//! ```
//! use memory_match::cards::{Catalog, Token};
//!
//! let catalog = Catalog::new(["sun", "moon", "star"]).unwrap();
//! assert_eq!(catalog.len(), 3);
//! assert_eq!(catalog.max_deck_size(), 6);
//! assert_eq!(catalog.get(1), Some(&Token::new("moon")));
//!
//! assert!(Catalog::new(["sun", "sun"]).is_err());
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::GameError;

/// Opaque card face identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token(String);

impl Token {
    /// Create a token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The token's raw value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Default palette: 32 distinct colours.
#[rustfmt::skip]
pub const DEFAULT_PALETTE: [&str; 32] = [
    "#E02AE2", "#FF00FF", "#00FFFF", "#FFA500",
    "#800080", "#008000", "#000080", "#808000",
    "#FFC0CB", "#A52A2A", "#8B4513", "#808080",
    "#000000", "#C71585", "#FF6347", "#ADFF2F",
    "#FFD700", "#32CD32", "#FF1493", "#7FFF00",
    "#FF4500", "#D2691E", "#8A2BE2", "#00BFFF",
    "#20B2AA", "#FF8C00", "#6A5ACD", "#F0E68C",
    "#98FB98", "#D3D3D3", "#4682B4", "#90EE90",
];

/// Ordered set of distinct tokens.
///
/// Order matters: a deck of size `n` always uses the first `n / 2` tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Token>", into = "Vec<Token>")]
pub struct Catalog {
    tokens: Vec<Token>,
}

impl Catalog {
    /// Build a catalog, rejecting empty input and duplicate tokens.
    pub fn new<I, T>(tokens: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let tokens: Vec<Token> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(GameError::InvalidCatalog {
                reason: "catalog is empty".to_string(),
            });
        }

        let mut seen = FxHashSet::default();
        for token in &tokens {
            if !seen.insert(token) {
                return Err(GameError::InvalidCatalog {
                    reason: format!("duplicate token {token}"),
                });
            }
        }

        Ok(Self { tokens })
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a constructed catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Largest deck this catalog can fill.
    #[must_use]
    pub fn max_deck_size(&self) -> usize {
        self.tokens.len() * 2
    }

    /// Token at catalog index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The first `count` tokens, in catalog order.
    #[must_use]
    pub fn take(&self, count: usize) -> &[Token] {
        &self.tokens[..count.min(self.tokens.len())]
    }

    /// Iterate over all tokens in order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_PALETTE.iter().copied().map(Token::new).collect(),
        }
    }
}

impl TryFrom<Vec<Token>> for Catalog {
    type Error = GameError;

    fn try_from(tokens: Vec<Token>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<Catalog> for Vec<Token> {
    fn from(catalog: Catalog) -> Self {
        catalog.tokens
    }
}
