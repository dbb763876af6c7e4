use serde::{Deserialize, Serialize};

use crate::insurance::{
    dealer_blackjack_probability, insurance_bet, insurance_expected_value, true_count,
};

fn default_decks_remaining() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdviceInput {
    pub bet: f64,
    #[serde(default)]
    pub running_count: f64,
    #[serde(default = "default_decks_remaining")]
    pub decks_remaining: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Recommendation {
    Take,
    Decline,
}

impl Recommendation {
    pub fn from_expected_value(expected_value: f64) -> Self {
        if expected_value > 0.0 {
            Recommendation::Take
        } else {
            Recommendation::Decline
        }
    }
}

/// What the table UI shows when the dealer turns up an Ace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceAdvice {
    pub insurance_bet: f64,
    pub true_count: f64,
    pub dealer_blackjack_probability: f64,
    pub expected_value: f64,
    pub recommendation: Recommendation,
}

pub fn advise(input: &AdviceInput) -> InsuranceAdvice {
    let amount = insurance_bet(input.bet);
    let probability = dealer_blackjack_probability(input.running_count, input.decks_remaining);
    let expected_value = insurance_expected_value(amount, probability);

    InsuranceAdvice {
        insurance_bet: amount,
        true_count: true_count(input.running_count, input.decks_remaining),
        dealer_blackjack_probability: probability,
        expected_value,
        recommendation: Recommendation::from_expected_value(expected_value),
    }
}

/// Whether insurance is +EV at this count, judged on a unit stake.
pub fn should_take_insurance(running_count: f64, decks_remaining: f64) -> bool {
    let probability = dealer_blackjack_probability(running_count, decks_remaining);
    Recommendation::from_expected_value(insurance_expected_value(1.0, probability))
        == Recommendation::Take
}
