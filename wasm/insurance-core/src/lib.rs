use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::console;

pub mod advice;
pub mod counter;
pub mod deck;
pub mod insurance;
pub mod sim;

fn log(message: &str) {
    console::log_1(&JsValue::from_str(message));
}

fn log_simulation(result: &sim::InsuranceSimResult) {
    log(&format!(
        "insurance sim: {} rounds, {} offers, observed {:.4} vs predicted {:.4}",
        result.total_rounds,
        result.insurance_offers,
        result.observed_blackjack_rate,
        result.mean_predicted_probability,
    ));
}

#[wasm_bindgen]
pub fn insurance_bet(bet: f64) -> f64 {
    insurance::insurance_bet(bet)
}

#[wasm_bindgen]
pub fn dealer_blackjack_probability(running_count: f64, decks_remaining: f64) -> f64 {
    insurance::dealer_blackjack_probability(running_count, decks_remaining)
}

#[wasm_bindgen]
pub fn insurance_expected_value(insurance_amount: f64, blackjack_probability: f64) -> f64 {
    insurance::insurance_expected_value(insurance_amount, blackjack_probability)
}

#[wasm_bindgen]
pub fn advise_insurance(params: &JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let input: advice::AdviceInput = serde_wasm_bindgen::from_value(params.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;

    let result = advice::advise(&input);

    serde_wasm_bindgen::to_value(&result)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

#[wasm_bindgen]
pub fn run_insurance_simulation(params: &JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let input: sim::InsuranceSimInput = serde_wasm_bindgen::from_value(params.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;

    let result = sim::run(input)
        .map_err(|err| JsValue::from_str(&format!("Simulation failed: {err}")))?;
    log_simulation(&result);

    serde_wasm_bindgen::to_value(&result)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

#[wasm_bindgen]
pub fn run_insurance_simulation_with_progress(
    params: &JsValue,
    progress_callback: &Function,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let input: sim::InsuranceSimInput = serde_wasm_bindgen::from_value(params.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;

    // A throwing callback stops the run.
    let mut progress_cb = |current: u32, total: u32| {
        progress_callback
            .call2(&JsValue::NULL, &JsValue::from(current), &JsValue::from(total))
            .map(|_| ())
            .map_err(|err| format!("progress callback threw {err:?}"))
    };

    let result = sim::run_with_progress(input, &mut progress_cb)
        .map_err(|err| JsValue::from_str(&format!("Simulation failed: {err}")))?;
    log_simulation(&result);

    serde_wasm_bindgen::to_value(&result)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}
