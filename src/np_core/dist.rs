use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::parameters::LOAD_NORMALIZATION;

/// Time-normalization factor of a load level.
///
/// Loads at or above [`LOAD_NORMALIZATION`] are the densest case and map one
/// exponential unit to one tick; lighter loads stretch the gap proportionally.
pub fn time_scale(load: usize) -> f64 {
    match load {
        0 => LOAD_NORMALIZATION,
        l if l as f64 >= LOAD_NORMALIZATION => 1.0,
        l => LOAD_NORMALIZATION / l as f64,
    }
}

/// Draws an Exp(1) sample by the inversion method.
pub fn sample_exponential(rng: &mut ChaCha8Rng) -> f64 {
    // U(0,1)
    let u: f64 = rng.gen_range(0.0..1.0);
    -(1.0 - u).ln()
}

/// Generates the number of ticks until the next arrival at `load`.
///
/// The continuous Exp(1) sample is scaled by [`time_scale`] and rounded to
/// whole ticks (halves to even); the result is never below one tick.
///
/// # Example
///
/// ```
/// use rand_chacha::ChaCha8Rng;
/// use rand::SeedableRng;
/// use rwa_wdm_sim::np_core::dist::get_arrival_interval;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let interval = get_arrival_interval(&mut rng, 250);
/// assert!(interval >= 1);
/// ```
///
/// # References
///
/// * [Wikipedia: Exponential Distribution](https://en.wikipedia.org/wiki/Exponential_distribution#Random_variate_generation)
pub fn get_arrival_interval(rng: &mut ChaCha8Rng, load: usize) -> usize {
    interval_from_sample(sample_exponential(rng), load)
}

pub fn interval_from_sample(x: f64, load: usize) -> usize {
    // 0.5 は偶数側に丸める
    let ticks = (x * time_scale(load)).round_ties_even();
    if ticks < 1.0 {
        1
    } else {
        ticks as usize
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn scale_saturates_at_normalization_load() {
        assert_eq!(time_scale(250), 1.0);
        assert_eq!(time_scale(400), 1.0);
        assert_eq!(time_scale(125), 2.0);
        assert_eq!(time_scale(1), 250.0);
    }

    #[test]
    fn interval_is_at_least_one_tick() {
        assert_eq!(interval_from_sample(0.0, 250), 1);
        assert_eq!(interval_from_sample(0.4, 250), 1);
        assert_eq!(interval_from_sample(2.6, 250), 3);
        assert_eq!(interval_from_sample(0.8, 1), 200);
    }

    #[test]
    fn halves_round_to_even() {
        // time_scale(125) == 2.0
        assert_eq!(interval_from_sample(1.25, 125), 2);
        assert_eq!(interval_from_sample(1.75, 125), 4);
        assert_eq!(interval_from_sample(2.25, 125), 4);
        assert_eq!(interval_from_sample(0.25, 125), 1);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(get_arrival_interval(&mut rng, 300) >= 1);
        }
    }

    #[test]
    fn same_seed_same_intervals() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        let xs: Vec<usize> = (0..50).map(|_| get_arrival_interval(&mut a, 30)).collect();
        let ys: Vec<usize> = (0..50).map(|_| get_arrival_interval(&mut b, 30)).collect();
        assert_eq!(xs, ys);
    }
}
