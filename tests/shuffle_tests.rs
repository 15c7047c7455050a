//! Deck shuffle distribution tests.
//!
//! Every card must be equally likely to land in every position. These tests
//! deal many decks from a fixed seed and check the per-position occupancy
//! counts with a chi-square statistic.

use memory_match::cards::{build_deck, Card, Catalog, Deck, Token};
use memory_match::core::{GameRng, Ordinal, Position};

const DECK_SIZE: usize = 8;
const TRIALS: usize = 8000;

/// Chi-square critical value for 7 degrees of freedom at p = 1e-5.
const CHI_SQUARE_LIMIT: f64 = 35.0;

/// `counts[position][ordinal - 1]` over `TRIALS` decks.
fn occupancy(mut deal: impl FnMut() -> Deck) -> Vec<Vec<usize>> {
    let mut counts = vec![vec![0usize; DECK_SIZE]; DECK_SIZE];
    for _ in 0..TRIALS {
        let deck = deal();
        for card in deck.iter() {
            counts[card.position.index()][card.ordinal.value() as usize - 1] += 1;
        }
    }
    counts
}

fn chi_square(observed: &[usize]) -> f64 {
    let expected = TRIALS as f64 / DECK_SIZE as f64;
    observed
        .iter()
        .map(|&o| {
            let diff = o as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

// =============================================================================
// Uniformity
// =============================================================================

/// Each position sees every original card about equally often.
#[test]
fn test_positions_are_uniform() {
    let catalog = Catalog::default();
    let mut rng = GameRng::new(0x5eed);

    let counts = occupancy(|| build_deck(DECK_SIZE, &catalog, &mut rng).unwrap());

    for (position, row) in counts.iter().enumerate() {
        assert_eq!(row.iter().sum::<usize>(), TRIALS);
        let stat = chi_square(row);
        assert!(
            stat < CHI_SQUARE_LIMIT,
            "position {position} chi-square {stat:.2} exceeds {CHI_SQUARE_LIMIT}: {row:?}"
        );
    }
}

/// Each original card lands in every position about equally often.
#[test]
fn test_cards_are_uniform() {
    let catalog = Catalog::default();
    let mut rng = GameRng::new(20_250_314);

    let counts = occupancy(|| build_deck(DECK_SIZE, &catalog, &mut rng).unwrap());

    for ordinal in 0..DECK_SIZE {
        let column: Vec<usize> = counts.iter().map(|row| row[ordinal]).collect();
        let stat = chi_square(&column);
        assert!(
            stat < CHI_SQUARE_LIMIT,
            "ordinal {} chi-square {stat:.2} exceeds {CHI_SQUARE_LIMIT}: {column:?}",
            ordinal + 1
        );
    }
}

/// The statistic is sharp enough to catch the classic off-by-one shuffle.
#[test]
fn test_biased_shuffle_is_detected() {
    let mut rng = GameRng::new(0x5eed);

    // Swapping with `0..i` instead of `0..=i` never leaves a card in place.
    let counts = occupancy(|| {
        let mut ordinals: Vec<usize> = (1..=DECK_SIZE).collect();
        for i in (1..DECK_SIZE).rev() {
            let j = rng.gen_range_usize(0..i);
            ordinals.swap(i, j);
        }
        let cards = ordinals
            .iter()
            .enumerate()
            .map(|(i, &o)| {
                let token = Token::new(format!("T{}", (o - 1) / 2));
                Card::new(Position(i), token, Ordinal::new(o as u32))
            })
            .collect();
        Deck::from_cards(cards).unwrap()
    });

    let worst = counts
        .iter()
        .map(|row| chi_square(row))
        .fold(0.0_f64, f64::max);
    assert!(worst > CHI_SQUARE_LIMIT, "biased shuffle passed with {worst:.2}");
}

// =============================================================================
// Determinism
// =============================================================================

/// The same seed deals the same sequence of decks.
#[test]
fn test_seeded_decks_repeat() {
    let catalog = Catalog::default();
    let mut a = GameRng::new(99);
    let mut b = GameRng::new(99);

    for size in [4, 16, 32, 64] {
        assert_eq!(
            build_deck(size, &catalog, &mut a).unwrap(),
            build_deck(size, &catalog, &mut b).unwrap()
        );
    }
}

/// Every dealt deck is a valid layout of the catalog prefix.
#[test]
fn test_dealt_decks_are_valid() {
    let catalog = Catalog::default();
    let mut rng = GameRng::new(3);

    for size in (2..=catalog.max_deck_size()).step_by(2) {
        let deck = build_deck(size, &catalog, &mut rng).unwrap();
        deck.validate().unwrap();
        assert_eq!(deck.len(), size);
        for card in deck.iter() {
            assert!(catalog.take(size / 2).contains(&card.token));
        }
    }
}
