use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    advice::Recommendation,
    counter::{build_counter, decks_remaining, CardCounter, CountSystem, CountingInput},
    deck::{Card, Deck},
    insurance::{
        dealer_blackjack_probability, insurance_bet, insurance_expected_value, true_count,
        INSURANCE_PAYOUT,
    },
};

fn default_bet_size() -> f64 {
    100.0
}

fn default_progress_interval() -> u32 {
    10_000
}

fn default_penetration_threshold() -> u8 {
    75
}

#[derive(Debug, Deserialize)]
pub struct InsuranceSimInput {
    pub num_decks: u8,
    pub iterations: u32,
    pub seed: u64,
    #[serde(default = "default_penetration_threshold")]
    pub penetration_threshold: u8,
    #[serde(default = "default_bet_size")]
    pub bet_size: f64,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u32,
    #[serde(default)]
    pub counting: Option<CountingInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceSimResult {
    pub total_rounds: u32,
    pub count_system: Option<CountSystem>,
    pub insurance_offers: u32,
    pub dealer_blackjacks: u32,
    pub observed_blackjack_rate: f64,
    pub mean_predicted_probability: f64,
    pub realized_ev_per_offer: f64,
    pub predicted_ev_per_offer: f64,
    pub take_decisions: u32,
    pub take_net: f64,
    pub buckets: HashMap<String, BucketStats>,
}

/// Offers grouped by rounded true count at decision time.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub true_count: i32,
    pub offers: u32,
    pub dealer_blackjacks: u32,
    pub predicted_probability_sum: f64,
    pub predicted_ev_sum: f64,
    pub realized_net: f64,
    pub observed_blackjack_rate: f64,
    pub mean_predicted_probability: f64,
}

/// One insurance decision and how it settled.
#[derive(Debug, Clone, PartialEq)]
pub struct InsuranceOffer {
    pub true_count: f64,
    pub probability: f64,
    pub predicted_ev: f64,
    pub dealer_blackjack: bool,
    pub net: f64,
}

/// Shoe plus optional counter; deals just enough of a round to settle insurance.
pub struct InsuranceTable {
    pub deck: Deck,
    pub counter: Option<CardCounter>,
}

impl InsuranceTable {
    pub fn new(deck: Deck, counter: Option<CardCounter>) -> Self {
        InsuranceTable { deck, counter }
    }

    pub fn deal_card(&mut self) -> Card {
        // The shoe rebuilds itself when it runs dry mid-round.
        if self.deck.is_exhausted() {
            self.reset_count();
        }
        let card = self.deck.deal_card();
        if let Some(counter) = &mut self.counter {
            counter.update(&card);
        }
        card
    }

    fn reset_count(&mut self) {
        if let Some(counter) = &mut self.counter {
            counter.reset();
        }
    }

    pub fn running_count(&self) -> f64 {
        self.counter.as_ref().map_or(0.0, CardCounter::running_count)
    }

    pub fn play_round(&mut self, insurance_amount: f64) -> Option<InsuranceOffer> {
        if self.deck.should_reshuffle() {
            self.deck.shuffle();
            self.reset_count();
        }

        let _player = [self.deal_card(), self.deal_card()];
        let up_card = self.deal_card();

        // Decide before the hole card leaves the shoe: it is still unseen.
        let decision = if up_card.is_ace() {
            let running = self.running_count();
            let decks = decks_remaining(self.deck.remaining_cards());
            let probability = dealer_blackjack_probability(running, decks);
            Some((
                true_count(running, decks),
                probability,
                insurance_expected_value(insurance_amount, probability),
            ))
        } else {
            None
        };

        let hole_card = self.deal_card();

        decision.map(|(true_count, probability, predicted_ev)| {
            let dealer_blackjack = hole_card.is_ten_valued();
            let net = if dealer_blackjack {
                insurance_amount * INSURANCE_PAYOUT
            } else {
                -insurance_amount
            };
            InsuranceOffer {
                true_count,
                probability,
                predicted_ev,
                dealer_blackjack,
                net,
            }
        })
    }
}

pub fn run(input: InsuranceSimInput) -> Result<InsuranceSimResult, String> {
    run_with_progress(input, |_current, _total| Ok(()))
}

pub fn run_with_progress<F>(
    input: InsuranceSimInput,
    mut progress_cb: F,
) -> Result<InsuranceSimResult, String>
where
    F: FnMut(u32, u32) -> Result<(), String>,
{
    if input.num_decks == 0 {
        return Err("num_decks must be at least 1".to_string());
    }
    let counter = build_counter(input.counting)?;
    let deck = Deck::new(input.num_decks, input.penetration_threshold, input.seed);
    let mut table = InsuranceTable::new(deck, counter);
    let count_system = table.counter.as_ref().map(CardCounter::system);

    let insurance_amount = insurance_bet(input.bet_size.max(1.0));
    let progress_interval = input.progress_interval.max(1);

    let mut offers = 0u32;
    let mut blackjacks = 0u32;
    let mut probability_sum = 0.0;
    let mut predicted_ev_sum = 0.0;
    let mut realized_net = 0.0;
    let mut take_decisions = 0u32;
    let mut take_net = 0.0;
    let mut buckets: HashMap<String, BucketStats> = HashMap::new();

    for round in 0..input.iterations {
        if let Some(offer) = table.play_round(insurance_amount) {
            offers += 1;
            if offer.dealer_blackjack {
                blackjacks += 1;
            }
            probability_sum += offer.probability;
            predicted_ev_sum += offer.predicted_ev;
            realized_net += offer.net;

            if Recommendation::from_expected_value(offer.predicted_ev) == Recommendation::Take {
                take_decisions += 1;
                take_net += offer.net;
            }

            track_bucket(&offer, &mut buckets);
        }

        let completed = round + 1;
        if completed % progress_interval == 0 || completed == input.iterations {
            progress_cb(completed, input.iterations)?;
        }
    }

    for bucket in buckets.values_mut() {
        finalize_bucket(bucket);
    }

    Ok(InsuranceSimResult {
        total_rounds: input.iterations,
        count_system,
        insurance_offers: offers,
        dealer_blackjacks: blackjacks,
        observed_blackjack_rate: ratio(blackjacks as f64, offers),
        mean_predicted_probability: ratio(probability_sum, offers),
        realized_ev_per_offer: ratio(realized_net, offers),
        predicted_ev_per_offer: ratio(predicted_ev_sum, offers),
        take_decisions,
        take_net,
        buckets,
    })
}

fn track_bucket(offer: &InsuranceOffer, buckets: &mut HashMap<String, BucketStats>) {
    let bucket = offer.true_count.round() as i32;
    let entry = buckets
        .entry(bucket.to_string())
        .or_insert_with(|| BucketStats {
            true_count: bucket,
            ..Default::default()
        });

    entry.offers += 1;
    if offer.dealer_blackjack {
        entry.dealer_blackjacks += 1;
    }
    entry.predicted_probability_sum += offer.probability;
    entry.predicted_ev_sum += offer.predicted_ev;
    entry.realized_net += offer.net;
}

fn finalize_bucket(bucket: &mut BucketStats) {
    bucket.observed_blackjack_rate = ratio(bucket.dealer_blackjacks as f64, bucket.offers);
    bucket.mean_predicted_probability = ratio(bucket.predicted_probability_sum, bucket.offers);
}

fn ratio(total: f64, count: u32) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}
