//! Insurance side-bet math for a dealer Ace upcard.
//!
//! Everything here is a pure function over `f64`. Inputs are not range
//! checked: a negative bet or a probability outside `[0, 1]` produces a
//! well-defined number that simply has no table meaning.


/// Share of ten-valued ranks in a standard deck (10, J, Q, K).
pub const BASE_BLACKJACK_PROBABILITY: f64 = 4.0 / 13.0;

/// Probability shift per unit of true count.
pub const ADJUSTMENT_PER_TRUE_COUNT: f64 = 0.005;

pub const MIN_BLACKJACK_PROBABILITY: f64 = 0.1;
pub const MAX_BLACKJACK_PROBABILITY: f64 = 0.5;

/// Insurance pays 2:1.
pub const INSURANCE_PAYOUT: f64 = 2.0;

/// Maximum insurance stake for an original wager of `bet`.
pub fn insurance_bet(bet: f64) -> f64 {
    bet / 2.0
}

/// Running count normalized per deck. The divisor never drops below one
/// deck, so an empty or nonsensical shoe estimate cannot blow the count up.
pub fn true_count(running_count: f64, decks_remaining: f64) -> f64 {
    running_count / decks_remaining.max(1.0)
}

/// Estimated chance that the dealer's hole card completes a blackjack.
///
/// Starts from 4/13 and moves half a point per unit of true count, then
/// stays inside `[0.1, 0.5]` whatever the count says.
pub fn dealer_blackjack_probability(running_count: f64, decks_remaining: f64) -> f64 {
    let adjustment = ADJUSTMENT_PER_TRUE_COUNT * true_count(running_count, decks_remaining);
    (BASE_BLACKJACK_PROBABILITY - adjustment)
        .clamp(MIN_BLACKJACK_PROBABILITY, MAX_BLACKJACK_PROBABILITY)
}

/// Expected value, in currency units, of placing `insurance_amount`.
pub fn insurance_expected_value(insurance_amount: f64, blackjack_probability: f64) -> f64 {
    let win_amount = insurance_amount * INSURANCE_PAYOUT;
    blackjack_probability * win_amount - (1.0 - blackjack_probability) * insurance_amount
}
