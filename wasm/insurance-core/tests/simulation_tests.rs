use std::collections::HashMap;

use insurance_core::counter::{CardCounter, CountSystem};
use insurance_core::deck::Deck;
use insurance_core::insurance::{insurance_expected_value, BASE_BLACKJACK_PROBABILITY};
use insurance_core::sim::{self, InsuranceSimInput, InsuranceTable};

fn input(json: &str) -> InsuranceSimInput {
    serde_json::from_str(json).expect("simulation input should parse")
}

#[test]
fn test_defaults_applied() {
    let input = input(r#"{ "num_decks": 6, "iterations": 10, "seed": 1 }"#);
    assert_eq!(input.penetration_threshold, 75);
    assert_eq!(input.bet_size, 100.0);
    assert_eq!(input.progress_interval, 10_000);
    assert!(input.counting.is_none());
}

#[test]
fn test_zero_decks_rejected() {
    let result = sim::run(input(r#"{ "num_decks": 0, "iterations": 10, "seed": 1 }"#));
    assert!(result.is_err());
}

#[test]
fn test_custom_system_without_values_rejected() {
    let result = sim::run(input(
        r#"{ "num_decks": 1, "iterations": 10, "seed": 1,
             "counting": { "enabled": true, "system": "Custom" } }"#,
    ));
    assert!(result.is_err());
}

#[test]
fn test_unknown_count_system_fails_to_parse() {
    let parsed: Result<InsuranceSimInput, _> = serde_json::from_str(
        r#"{ "num_decks": 1, "iterations": 10, "seed": 1,
             "counting": { "enabled": true, "system": "Zen" } }"#,
    );
    assert!(parsed.is_err());
}

#[test]
fn test_uncounted_shoe_always_predicts_base_probability() {
    let result = sim::run(input(
        r#"{ "num_decks": 6, "iterations": 20000, "seed": 11, "bet_size": 10.0 }"#,
    ))
    .unwrap();

    assert_eq!(result.total_rounds, 20000);
    assert!(result.insurance_offers > 0);
    assert!((result.mean_predicted_probability - BASE_BLACKJACK_PROBABILITY).abs() < 1e-9);
    // Without a count every offer lands in bucket 0 and is declined
    assert_eq!(result.buckets.len(), 1);
    assert_eq!(result.buckets["0"].offers, result.insurance_offers);
    assert_eq!(result.take_decisions, 0);
    assert_eq!(result.take_net, 0.0);
    assert!(result.count_system.is_none());
    let ev = insurance_expected_value(5.0, BASE_BLACKJACK_PROBABILITY);
    assert!((result.predicted_ev_per_offer - ev).abs() < 1e-6);
}

#[test]
fn test_observed_rate_near_four_thirteenths() {
    let result = sim::run(input(
        r#"{ "num_decks": 6, "iterations": 40000, "seed": 2024,
             "counting": { "enabled": true, "system": "Hi-Lo" } }"#,
    ))
    .unwrap();

    assert!(result.insurance_offers > 2000);
    assert!(
        (0.25..0.37).contains(&result.observed_blackjack_rate),
        "observed = {}",
        result.observed_blackjack_rate
    );
    assert!(result.mean_predicted_probability >= 0.1);
    assert!(result.mean_predicted_probability <= 0.5);
}

#[test]
fn test_totals_match_buckets() {
    let result = sim::run(input(
        r#"{ "num_decks": 2, "iterations": 15000, "seed": 9, "bet_size": 20.0,
             "counting": { "enabled": true, "system": "Omega II" } }"#,
    ))
    .unwrap();

    let offers: u32 = result.buckets.values().map(|b| b.offers).sum();
    let blackjacks: u32 = result.buckets.values().map(|b| b.dealer_blackjacks).sum();
    let net: f64 = result.buckets.values().map(|b| b.realized_net).sum();
    assert_eq!(result.count_system, Some(CountSystem::OmegaII));
    assert_eq!(offers, result.insurance_offers);
    assert_eq!(blackjacks, result.dealer_blackjacks);
    assert!((net / offers as f64 - result.realized_ev_per_offer).abs() < 1e-9);

    // Insurance of 10: +20 per blackjack, -10 otherwise
    let expected_net = 20.0 * blackjacks as f64 - 10.0 * (offers - blackjacks) as f64;
    assert!((net - expected_net).abs() < 1e-6);

    for (key, bucket) in &result.buckets {
        assert_eq!(key, &bucket.true_count.to_string());
        assert!(bucket.offers > 0);
        assert!((0.0..=1.0).contains(&bucket.observed_blackjack_rate));
        assert!((0.1..=0.5).contains(&bucket.mean_predicted_probability));
    }
    assert!(result.take_decisions <= result.insurance_offers);
}

#[test]
fn test_same_seed_is_deterministic() {
    let json = r#"{ "num_decks": 4, "iterations": 5000, "seed": 77,
                    "counting": { "enabled": true } }"#;
    let a = sim::run(input(json)).unwrap();
    let b = sim::run(input(json)).unwrap();
    assert_eq!(a.insurance_offers, b.insurance_offers);
    assert_eq!(a.dealer_blackjacks, b.dealer_blackjacks);
    assert_eq!(a.realized_ev_per_offer, b.realized_ev_per_offer);
    assert_eq!(a.take_net, b.take_net);
}

#[test]
fn test_progress_reported_on_interval_and_last_round() {
    let mut calls = Vec::new();
    sim::run_with_progress(
        input(r#"{ "num_decks": 1, "iterations": 250, "seed": 5, "progress_interval": 100 }"#),
        |current, total| {
            calls.push((current, total));
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(calls, vec![(100, 250), (200, 250), (250, 250)]);
}

#[test]
fn test_zero_iterations() {
    let result = sim::run(input(r#"{ "num_decks": 1, "iterations": 0, "seed": 5 }"#)).unwrap();
    assert_eq!(result.total_rounds, 0);
    assert_eq!(result.insurance_offers, 0);
    assert_eq!(result.observed_blackjack_rate, 0.0);
    assert!(result.buckets.is_empty());
}

#[test]
fn test_round_consumes_four_cards_and_counts_them() {
    let counter = CardCounter::new(CountSystem::HiLo, None).unwrap();
    let mut table = InsuranceTable::new(Deck::new(6, 75, 123), Some(counter));
    for round in 1..=10 {
        let offer = table.play_round(5.0);
        assert_eq!(table.deck.remaining_cards(), 312 - 4 * round);
        if let Some(offer) = offer {
            assert!((0.1..=0.5).contains(&offer.probability));
            let expected = if offer.dealer_blackjack { 10.0 } else { -5.0 };
            assert_eq!(offer.net, expected);
        }
    }
}

#[test]
fn test_reshuffle_at_penetration_resets_count() {
    let counter = CardCounter::new(CountSystem::HiLo, None).unwrap();
    let mut table = InsuranceTable::new(Deck::new(1, 50, 8), Some(counter));
    // 7 rounds deal 28 cards, crossing 50% penetration
    for _ in 0..7 {
        table.play_round(5.0);
    }
    assert!(table.deck.should_reshuffle());
    table.play_round(5.0);
    assert_eq!(table.deck.remaining_cards(), 48);
    // Only the four cards of the fresh shoe are counted
    assert!(table.running_count().abs() <= 4.0);
}

#[test]
fn test_bet_size_floored_at_one() {
    for bet in ["0.0", "-50.0"] {
        let result = sim::run(input(&format!(
            r#"{{ "num_decks": 6, "iterations": 5000, "seed": 3, "bet_size": {bet} }}"#
        )))
        .unwrap();
        let offers = result.insurance_offers;
        let blackjacks = result.dealer_blackjacks;
        assert!(offers > 0);
        // Insurance of 0.5: +1.0 on a dealer blackjack, -0.5 otherwise
        let expected_net = 1.0 * blackjacks as f64 - 0.5 * (offers - blackjacks) as f64;
        let net = result.realized_ev_per_offer * offers as f64;
        assert!((net - expected_net).abs() < 1e-6, "bet = {}, net = {}", bet, net);
    }
}

#[test]
fn test_zero_progress_interval_reports_every_round() {
    let mut calls = Vec::new();
    sim::run_with_progress(
        input(r#"{ "num_decks": 1, "iterations": 5, "seed": 5, "progress_interval": 0 }"#),
        |current, total| {
            calls.push((current, total));
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(calls, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
}

#[test]
fn test_progress_error_stops_run() {
    let mut calls = 0;
    let result = sim::run_with_progress(
        input(r#"{ "num_decks": 1, "iterations": 50, "seed": 5, "progress_interval": 10 }"#),
        |_current, _total| {
            calls += 1;
            if calls == 2 {
                Err("cancelled".to_string())
            } else {
                Ok(())
            }
        },
    );
    assert_eq!(result.unwrap_err(), "cancelled");
    assert_eq!(calls, 2);
}

#[test]
fn test_exhausted_shoe_resets_count() {
    // Every card tags +1, so the running count equals cards dealt since the shuffle
    let values: HashMap<String, i32> = ["A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K"]
        .iter()
        .map(|rank| (rank.to_string(), 1))
        .collect();
    let counter = CardCounter::new(CountSystem::Custom, Some(values)).unwrap();
    // Threshold above 100% never triggers the round-start reshuffle
    let mut table = InsuranceTable::new(Deck::new(1, 200, 21), Some(counter));
    for _ in 0..13 {
        table.play_round(5.0);
    }
    assert!(table.deck.is_exhausted());
    assert_eq!(table.running_count(), 52.0);

    table.play_round(5.0);
    assert_eq!(table.deck.remaining_cards(), 48);
    assert_eq!(table.running_count(), 4.0);
}

#[test]
fn test_count_stays_within_one_shoe_past_full_penetration() {
    let result = sim::run(input(
        r#"{ "num_decks": 1, "iterations": 1000, "seed": 1, "penetration_threshold": 250,
             "counting": { "enabled": true, "system": "KO (Knockout)" } }"#,
    ))
    .unwrap();

    // One KO deck holds 24 cards tagged +1 and 20 tagged -1; under a deck
    // left the true count equals the running count
    assert!(result.insurance_offers > 0);
    for bucket in result.buckets.values() {
        assert!(
            (-20..=24).contains(&bucket.true_count),
            "true count {} escaped a single shoe",
            bucket.true_count
        );
    }
}
