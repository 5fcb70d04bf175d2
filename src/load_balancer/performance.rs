//! Performance-weighted load balancing strategy.
//!
//! Most picks go to the healthy endpoint with the lowest smoothed latency; the
//! rest are spread uniformly over the healthy set so that a momentarily slow
//! endpoint keeps receiving samples and can win back traffic.

use rand::Rng;

use crate::health::state::EndpointHealth;
use crate::load_balancer::PoolView;

/// Probability of picking the fastest healthy endpoint.
pub const EXPLOIT_RATIO: f64 = 0.7;

/// Whether any endpoint has a latency sample to rank by.
pub(crate) fn has_latency_data(health: &[EndpointHealth]) -> bool {
    health.iter().any(|h| h.avg_response_time_ms() > 0.0)
}

/// Selection weight: inverse latency, or 1 with no sample yet.
pub(crate) fn weight(health: &EndpointHealth) -> f64 {
    let avg = health.avg_response_time_ms();
    if avg > 0.0 {
        1.0 / avg
    } else {
        1.0
    }
}

/// Index with the highest weight. Ties go to the first candidate.
pub(crate) fn heaviest(candidates: &[usize], health: &[EndpointHealth]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &index in candidates {
        let w = weight(&health[index]);
        match best {
            Some((_, best_w)) if w <= best_w => {}
            _ => best = Some((index, w)),
        }
    }
    best.map(|(index, _)| index)
}

/// Pick among healthy endpoints. Returns `None` when none is healthy.
pub(crate) fn pick<R: Rng + ?Sized>(pool: &PoolView<'_>, rng: &mut R) -> Option<usize> {
    let healthy = pool.healthy_indices();
    if healthy.is_empty() {
        return None;
    }

    if rng.gen_bool(EXPLOIT_RATIO) {
        heaviest(&healthy, pool.health)
    } else {
        Some(healthy[rng.gen_range(0..healthy.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::state::HealthThresholds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    fn with_latency(ms: u64) -> EndpointHealth {
        let mut h = EndpointHealth::new();
        h.update_response_time(Duration::from_millis(ms));
        h
    }

    #[test]
    fn test_heaviest_prefers_lowest_latency() {
        let health = vec![with_latency(120), with_latency(40), with_latency(90)];
        assert_eq!(heaviest(&[0, 1, 2], &health), Some(1));
    }

    #[test]
    fn test_heaviest_tie_goes_to_first() {
        let health = vec![with_latency(50), with_latency(50), with_latency(50)];
        assert_eq!(heaviest(&[0, 1, 2], &health), Some(0));
        assert_eq!(heaviest(&[2, 1], &health), Some(2));
    }

    #[test]
    fn test_no_sample_weighs_one() {
        assert_eq!(weight(&EndpointHealth::new()), 1.0);
        assert!(!has_latency_data(&[EndpointHealth::new()]));
        assert!(has_latency_data(&[EndpointHealth::new(), with_latency(3)]));
    }

    #[test]
    fn test_pick_favours_fastest_but_explores() {
        let health = vec![with_latency(200), with_latency(20), with_latency(300)];
        let t = HealthThresholds::new(3, Duration::from_secs(30));
        let pool = PoolView { health: &health, thresholds: &t, now: Instant::now() };
        let mut rng = StdRng::seed_from_u64(7);

        let mut counts = [0usize; 3];
        for _ in 0..2000 {
            counts[pick(&pool, &mut rng).unwrap()] += 1;
        }

        // Expected share of the fastest endpoint is 0.7 + 0.3 / 3 = 0.8
        assert!(counts[1] > 1400, "fastest picked {} times", counts[1]);
        assert!(counts[0] > 0 && counts[2] > 0, "slow endpoints starved: {:?}", counts);
    }

    #[test]
    fn test_pick_ignores_unhealthy() {
        let mut health = vec![with_latency(5), with_latency(500)];
        for _ in 0..3 {
            health[0].record_failure();
        }
        let t = HealthThresholds::new(3, Duration::from_secs(30));
        let pool = PoolView { health: &health, thresholds: &t, now: Instant::now() };
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            assert_eq!(pick(&pool, &mut rng), Some(1));
        }

        for _ in 0..3 {
            health[1].record_failure();
        }
        let pool = PoolView { health: &health, thresholds: &t, now: Instant::now() };
        assert_eq!(pick(&pool, &mut rng), None);
    }
}
