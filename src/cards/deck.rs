//! Deck construction.
//!
//! ## Algorithm
//!
//! 1. Take the first `deck_size / 2` tokens from the catalog, in order.
//! 2. Duplicate the list, numbering the entries `1..=deck_size` as ordinals.
//! 3. Fisher–Yates shuffle the entries and deal them to positions
//!    `0..deck_size` in shuffled order.
//!
//! Token selection is deterministic; only the layout is random.
//!
//! ```
//! use memory_match::cards::{build_deck, Catalog};
//! use memory_match::core::GameRng;
//!
//! let catalog = Catalog::default();
//! let mut rng = GameRng::new(42);
//!
//! let deck = build_deck(16, &catalog, &mut rng).unwrap();
//! assert_eq!(deck.len(), 16);
//! assert!(deck.validate().is_ok());
//!
//! assert!(build_deck(7, &catalog, &mut rng).is_err());
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::card::Card;
use super::catalog::{Catalog, Token};
use crate::core::{GameError, GameRng, Ordinal, Position};

/// An ordered deck: index `i` holds the card at position `i`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Wrap pre-built cards, checking every deck invariant.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, GameError> {
        let deck = Self { cards };
        deck.validate()?;
        Ok(deck)
    }

    /// Lay out tokens in the given order, numbering ordinals `1..=n`.
    ///
    /// Useful for fixed layouts in tests and replays.
    pub fn from_tokens<I, T>(tokens: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let cards = tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| Card::new(Position(i), token.into(), ordinal_for(i)))
            .collect();
        Self::from_cards(cards)
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True only for an unvalidated empty deck; dealt decks are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Card at `position`.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&Card> {
        self.cards.get(position.index())
    }

    /// All cards in position order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Iterate over cards in position order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Position of the other card sharing `position`'s token.
    #[must_use]
    pub fn partner_of(&self, position: Position) -> Option<Position> {
        let card = self.get(position)?;
        self.cards
            .iter()
            .find(|other| card.matches(other))
            .map(|other| other.position)
    }

    /// Check the structural invariants.
    ///
    /// - non-empty, even length
    /// - card `i` sits at position `i`
    /// - ordinals are unique and within `1..=len`
    /// - every token appears exactly twice
    pub fn validate(&self) -> Result<(), GameError> {
        let size = self.cards.len();
        if size == 0 || size % 2 != 0 {
            return Err(invalid(format!("deck size {size} is not a positive even number")));
        }

        let mut ordinals = vec![false; size];
        let mut token_counts: FxHashMap<&Token, usize> = FxHashMap::default();

        for (i, card) in self.cards.iter().enumerate() {
            if card.position.index() != i {
                return Err(invalid(format!(
                    "card at index {i} claims position {}",
                    card.position
                )));
            }

            let ordinal = card.ordinal.value() as usize;
            if ordinal == 0 || ordinal > size || ordinals[ordinal - 1] {
                return Err(invalid(format!("ordinal {} is out of range or repeated", card.ordinal)));
            }
            ordinals[ordinal - 1] = true;

            *token_counts.entry(&card.token).or_insert(0) += 1;
        }

        if let Some((token, count)) = token_counts.into_iter().find(|&(_, count)| count != 2) {
            return Err(invalid(format!("token {token} appears {count} times")));
        }

        Ok(())
    }
}

/// Builds shuffled decks from a catalog.
#[derive(Clone, Copy, Debug)]
pub struct DeckBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> DeckBuilder<'a> {
    /// Create a builder over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Check a requested deck size against the catalog.
    pub fn check_size(&self, deck_size: usize) -> Result<(), GameError> {
        let max = self.catalog.max_deck_size();
        if deck_size == 0 || deck_size % 2 != 0 || deck_size > max {
            return Err(GameError::InvalidDeckSize {
                size: deck_size,
                max,
            });
        }
        Ok(())
    }

    /// Deal a uniformly shuffled deck of `deck_size` cards.
    pub fn build(&self, deck_size: usize, rng: &mut GameRng) -> Result<Deck, GameError> {
        self.check_size(deck_size)?;

        let tokens = self.catalog.take(deck_size / 2);
        let mut entries: Vec<(Token, Ordinal)> = tokens
            .iter()
            .chain(tokens.iter())
            .enumerate()
            .map(|(i, token)| (token.clone(), ordinal_for(i)))
            .collect();

        rng.shuffle(&mut entries);

        let cards = entries
            .into_iter()
            .enumerate()
            .map(|(i, (token, ordinal))| Card::new(Position(i), token, ordinal))
            .collect();

        Ok(Deck { cards })
    }
}

/// Deal a shuffled deck of `deck_size` cards from `catalog`.
pub fn build_deck(deck_size: usize, catalog: &Catalog, rng: &mut GameRng) -> Result<Deck, GameError> {
    DeckBuilder::new(catalog).build(deck_size, rng)
}

fn ordinal_for(index: usize) -> Ordinal {
    Ordinal(u32::try_from(index + 1).unwrap_or(u32::MAX))
}

fn invalid(reason: String) -> GameError {
    GameError::InvalidDeck { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        Catalog::new(["A", "B", "C"]).unwrap()
    }

    #[test]
    fn test_build_every_valid_size() {
        let catalog = Catalog::default();
        let mut rng = GameRng::new(1);

        for size in (2..=catalog.max_deck_size()).step_by(2) {
            let deck = build_deck(size, &catalog, &mut rng).unwrap();
            assert_eq!(deck.len(), size);
            assert_eq!(deck.pair_count(), size / 2);
            deck.validate().unwrap();
        }
    }

    #[test]
    fn test_uses_catalog_prefix() {
        let catalog = small_catalog();
        let mut rng = GameRng::new(3);

        let deck = build_deck(4, &catalog, &mut rng).unwrap();
        let mut tokens: Vec<&str> = deck.iter().map(|c| c.token.as_str()).collect();
        tokens.sort_unstable();

        assert_eq!(tokens, vec!["A", "A", "B", "B"]);
    }

    #[test]
    fn test_invalid_sizes() {
        let catalog = small_catalog();
        let mut rng = GameRng::new(3);

        for size in [0, 1, 3, 8, 100] {
            let err = build_deck(size, &catalog, &mut rng).unwrap_err();
            assert_eq!(err, GameError::InvalidDeckSize { size, max: 6 });
        }
        assert!(build_deck(6, &catalog, &mut rng).is_ok());
    }

    #[test]
    fn test_same_seed_same_deck() {
        let catalog = Catalog::default();

        let a = build_deck(32, &catalog, &mut GameRng::new(77)).unwrap();
        let b = build_deck(32, &catalog, &mut GameRng::new(77)).unwrap();
        let c = build_deck(32, &catalog, &mut GameRng::new(78)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_partner_of() {
        let deck = Deck::from_tokens(["A", "B", "A", "B"]).unwrap();

        assert_eq!(deck.partner_of(Position(0)), Some(Position(2)));
        assert_eq!(deck.partner_of(Position(3)), Some(Position(1)));
        assert_eq!(deck.partner_of(Position(9)), None);
    }

    #[test]
    fn test_from_tokens_rejects_unpaired() {
        assert!(Deck::from_tokens(["A", "B", "A"]).is_err());
        assert!(Deck::from_tokens(["A", "A", "A", "A"]).is_err());
        assert!(Deck::from_tokens(Vec::<Token>::new()).is_err());
    }

    #[test]
    fn test_from_cards_rejects_bad_layout() {
        let cards = vec![
            Card::new(Position(1), Token::new("A"), Ordinal(1)),
            Card::new(Position(0), Token::new("A"), Ordinal(2)),
        ];
        assert!(Deck::from_cards(cards).is_err());

        let cards = vec![
            Card::new(Position(0), Token::new("A"), Ordinal(1)),
            Card::new(Position(1), Token::new("A"), Ordinal(1)),
        ];
        assert!(Deck::from_cards(cards).is_err());
    }
}
