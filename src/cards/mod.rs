//! Card system: tokens, cards, and deck construction.
//!
//! ## Key Types
//!
//! - `Token`: Opaque face value; equal tokens make a pair
//! - `Catalog`: Ordered, duplicate-free token list that bounds deck size
//! - `Card`: A token dealt to a position, with a printed ordinal
//! - `Deck`: Cards in position order, every token exactly twice
//! - `DeckBuilder`: Deals uniformly shuffled decks from a catalog

pub mod catalog;
pub mod card;
pub mod deck;

pub use catalog::{Catalog, Token, DEFAULT_PALETTE};
pub use card::Card;
pub use deck::{build_deck, Deck, DeckBuilder};
