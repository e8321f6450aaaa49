//! Estimated-GDP computation.

use rand::Rng;

/// Randomized scaling factor range, half-open.
const MULTIPLIER_LOW: f64 = 1000.0;
const MULTIPLIER_HIGH: f64 = 2000.0;

/// Compute the estimated GDP for a country.
///
/// Draws a multiplier uniformly from `[1000, 2000)` and returns
/// `population * multiplier / exchange_rate`. Returns `None` when the
/// population is unknown or the rate is absent or zero.
///
/// The metric is deliberately coarse and non-reproducible; the RNG is a
/// parameter so tests can seed it, and tests assert bounds, never exact
/// values.
pub fn estimate_gdp<R: Rng + ?Sized>(
    population: Option<u64>,
    exchange_rate: Option<f64>,
    rng: &mut R,
) -> Option<f64> {
    let population = population?;
    let rate = exchange_rate?;
    if rate == 0.0 {
        return None;
    }
    let multiplier = rng.gen_range(MULTIPLIER_LOW..MULTIPLIER_HIGH);
    Some((population as f64 * multiplier) / rate)
}

// =============================================================================
// Tests
// =============================================================================
