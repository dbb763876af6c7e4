use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

/// Rank and blackjack value for one suit; aces count high.
const RANK_VALUES: [(&str, u8); 13] = [
    ("A", 11),
    ("2", 2),
    ("3", 3),
    ("4", 4),
    ("5", 5),
    ("6", 6),
    ("7", 7),
    ("8", 8),
    ("9", 9),
    ("10", 10),
    ("J", 10),
    ("Q", 10),
    ("K", 10),
];

const SUITS: usize = 4;

pub const CARDS_PER_DECK: usize = 52;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Card {
    pub rank: String,
    pub value: u8,
}

impl Card {
    /// Unknown ranks get value 0 and count for nothing.
    pub fn new(rank: &str) -> Self {
        let value = RANK_VALUES
            .iter()
            .find(|(name, _)| *name == rank)
            .map_or(0, |(_, value)| *value);
        Card {
            rank: rank.to_string(),
            value,
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == "A"
    }

    /// Hole cards that turn a dealer Ace into blackjack.
    pub fn is_ten_valued(&self) -> bool {
        self.value == 10
    }
}

/// Multi-deck shoe with a cut-card style reshuffle point.
pub struct Deck {
    pub num_decks: u8,
    cards: Vec<Card>,
    dealt: usize,
    penetration_threshold: u8,
    rng: SmallRng,
}

impl Deck {
    pub fn new(num_decks: u8, penetration_threshold: u8, seed: u64) -> Self {
        let mut deck = Deck {
            num_decks: num_decks.max(1),
            cards: Vec::new(),
            dealt: 0,
            penetration_threshold,
            rng: SmallRng::seed_from_u64(seed),
        };
        deck.shuffle();
        deck
    }

    pub fn total_cards(&self) -> usize {
        self.num_decks as usize * CARDS_PER_DECK
    }

    /// Rebuilds the full shoe and shuffles it.
    pub fn shuffle(&mut self) {
        let decks = self.num_decks as usize;
        self.cards = RANK_VALUES
            .iter()
            .flat_map(|(rank, _)| std::iter::repeat(*rank).take(SUITS * decks))
            .map(Card::new)
            .collect();
        self.cards.shuffle(&mut self.rng);
        self.dealt = 0;
    }

    /// Deals the top card. An exhausted shoe is rebuilt first; callers that
    /// track a count must check [`Deck::is_exhausted`] before dealing.
    pub fn deal_card(&mut self) -> Card {
        if self.is_exhausted() {
            self.shuffle();
        }
        let card = self.cards.pop().expect("shoe holds at least one deck after shuffle");
        self.dealt += 1;
        card
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cards.is_empty()
    }

    /// Percentage of the shoe dealt since the last shuffle.
    fn penetration(&self) -> f64 {
        (self.dealt as f64 / self.total_cards() as f64) * 100.0
    }

    pub fn should_reshuffle(&self) -> bool {
        self.penetration() >= self.penetration_threshold as f64
            && self.cards.len() < CARDS_PER_DECK
    }
}
