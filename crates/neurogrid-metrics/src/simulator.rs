//! Stochastic telemetry step.
//!
//! `step` is total over its inputs: the artificial load is clamped into
//! the accepted range and every output is clamped at the point it is
//! computed, so a sample can never leave its documented bounds.

use neurogrid_state::{SystemMetrics, clamp_artificial_load};

use crate::noise::NoiseSource;

/// Intrinsic load of an empty cluster.
const BASE_LOAD: f64 = 10.0;
/// CPU jitter half-width.
const CPU_JITTER: f64 = 5.0;
const CPU_FLOOR: f64 = 5.0;
/// Smoothing factor of the memory low-pass filter.
const MEMORY_ALPHA: f64 = 0.1;
/// Memory jitter half-width.
const MEMORY_JITTER: f64 = 2.5;
const MEMORY_FLOOR: f64 = 10.0;
const LATENCY_BASE: f64 = 40.0;
const LATENCY_PER_CPU: f64 = 0.5;
const LATENCY_JITTER: f64 = 20.0;
const TEMPERATURE_BASE: f64 = 40.0;
const TEMPERATURE_PER_CPU: f64 = 0.4;
const PERCENT_CEILING: f64 = 100.0;

/// Produce the next telemetry sample.
///
/// `artificial_load` is clamped into `[0, 80]`. Larger clusters carry more
/// intrinsic load (`10 + nodes / 2`).
pub fn step<N: NoiseSource + ?Sized>(
    prev: &SystemMetrics,
    node_count: u32,
    artificial_load: f64,
    noise: &mut N,
) -> SystemMetrics {
    let load = clamp_artificial_load(artificial_load);
    let base_load = BASE_LOAD + f64::from(node_count) / 2.0;

    let cpu = (base_load + load + noise.uniform(-CPU_JITTER, CPU_JITTER))
        .clamp(CPU_FLOOR, PERCENT_CEILING);

    // A corrupted previous reading restarts the filter from the current CPU.
    let prev_mem = if prev.memory_usage.is_finite() {
        prev.memory_usage
    } else {
        cpu
    };
    let memory = (prev_mem
        + (cpu - prev_mem) * MEMORY_ALPHA
        + noise.uniform(-MEMORY_JITTER, MEMORY_JITTER))
    .clamp(MEMORY_FLOOR, PERCENT_CEILING);

    let latency = LATENCY_BASE + cpu * LATENCY_PER_CPU + noise.uniform(0.0, LATENCY_JITTER);
    let temperature = TEMPERATURE_BASE + cpu * TEMPERATURE_PER_CPU;

    SystemMetrics {
        cpu_load: cpu,
        memory_usage: memory,
        network_latency: latency,
        temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SeededNoise;

    /// Always returns the same fraction of the requested range.
    struct FixedNoise(f64);

    impl NoiseSource for FixedNoise {
        fn uniform(&mut self, low: f64, high: f64) -> f64 {
            low + (high - low) * self.0
        }
    }

    fn baseline() -> SystemMetrics {
        SystemMetrics {
            cpu_load: 20.0,
            memory_usage: 30.0,
            network_latency: 45.0,
            temperature: 40.0,
        }
    }

    #[test]
    fn midpoint_noise_gives_exact_values() {
        let next = step(&baseline(), 30, 0.0, &mut FixedNoise(0.5));

        assert_eq!(next.cpu_load, 25.0);
        assert_eq!(next.memory_usage, 29.5);
        assert_eq!(next.network_latency, 62.5);
        assert_eq!(next.temperature, 50.0);
    }

    #[test]
    fn extreme_noise_hits_band_edges() {
        let low = step(&baseline(), 30, 0.0, &mut FixedNoise(0.0));
        assert_eq!(low.cpu_load, 20.0);
        assert_eq!(low.network_latency, 50.0);

        let high = step(&baseline(), 30, 0.0, &mut FixedNoise(1.0));
        assert_eq!(high.cpu_load, 30.0);
        assert_eq!(high.network_latency, 75.0);
    }

    #[test]
    fn cpu_for_thirty_nodes_stays_in_band() {
        let mut noise = SeededNoise::from_seed(0xC0FFEE);
        for _ in 0..500 {
            let next = step(&baseline(), 30, 0.0, &mut noise);
            assert!(
                (15.0..=35.0).contains(&next.cpu_load),
                "cpu {} outside [15, 35]",
                next.cpu_load
            );
        }
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let mut a = SeededNoise::from_seed(1234);
        let mut b = SeededNoise::from_seed(1234);

        let mut prev_a = baseline();
        let mut prev_b = baseline();
        for _ in 0..20 {
            prev_a = step(&prev_a, 30, 12.0, &mut a);
            prev_b = step(&prev_b, 30, 12.0, &mut b);
            assert_eq!(prev_a, prev_b);
        }
    }

    #[test]
    fn outputs_stay_within_bounds() {
        let mut noise = SeededNoise::from_seed(99);
        let mut prev = baseline();
        for i in 0..2_000u32 {
            let nodes = 10 + (i % 91);
            let load = f64::from(i % 100) - 10.0;
            let next = step(&prev, nodes, load, &mut noise);

            assert!((5.0..=100.0).contains(&next.cpu_load));
            assert!((10.0..=100.0).contains(&next.memory_usage));
            assert!(next.network_latency >= 0.0);
            assert!(next.temperature >= 0.0);

            // IIR step bound: smoothing term plus noise half-width.
            let max_jump = (next.cpu_load - prev.memory_usage).abs() * MEMORY_ALPHA + MEMORY_JITTER;
            assert!(
                (next.memory_usage - prev.memory_usage).abs() <= max_jump + 1e-9,
                "memory jumped from {} to {}",
                prev.memory_usage,
                next.memory_usage
            );
            prev = next;
        }
    }

    #[test]
    fn artificial_load_is_clamped_to_range() {
        let capped = step(&baseline(), 10, 500.0, &mut FixedNoise(0.5));
        let at_max = step(&baseline(), 10, 80.0, &mut FixedNoise(0.5));
        assert_eq!(capped, at_max);

        let negative = step(&baseline(), 10, -40.0, &mut FixedNoise(0.5));
        let zero = step(&baseline(), 10, 0.0, &mut FixedNoise(0.5));
        assert_eq!(negative, zero);
    }

    #[test]
    fn cpu_saturates_at_one_hundred() {
        let next = step(&baseline(), 100, 80.0, &mut FixedNoise(1.0));
        assert_eq!(next.cpu_load, 100.0);
        assert_eq!(next.temperature, 80.0);
    }

    #[test]
    fn memory_lags_cpu() {
        let mut prev = baseline();
        let mut noise = FixedNoise(0.5);
        // Sudden jump to heavy load: memory climbs gradually.
        let first = step(&prev, 60, 60.0, &mut noise);
        assert!(first.cpu_load > 90.0);
        assert!(first.memory_usage < 40.0);

        for _ in 0..60 {
            prev = step(&prev, 60, 60.0, &mut noise);
        }
        assert!(prev.memory_usage > 90.0);
    }

    #[test]
    fn non_finite_memory_restarts_filter() {
        let mut prev = baseline();
        prev.memory_usage = f64::NAN;
        let next = step(&prev, 30, 0.0, &mut FixedNoise(0.5));
        assert_eq!(next.memory_usage, 25.0);
    }
}
