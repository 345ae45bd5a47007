//! Autoscale policy — hysteresis-banded decisions over CPU load.

use tracing::debug;

use neurogrid_state::{ClusterConfig, ClusterStatus, Complexity, MAX_NODES, MIN_NODES, clamp_nodes};

/// CPU load above which nodes are shed.
pub const SCALE_DOWN_CPU: f64 = 85.0;
/// CPU load below which nodes are added.
pub const SCALE_UP_CPU: f64 = 40.0;
/// Fraction of nodes shed per scale-down.
const SCALE_DOWN_FRACTION: f64 = 0.2;
/// Nodes added per scale-up.
pub const SCALE_UP_STEP: u32 = 5;
/// After a scale-down, clusters smaller than this report `LOW` complexity.
const LOW_COMPLEXITY_BELOW: u32 = 30;
/// After a scale-up, clusters larger than this report `HIGH` complexity.
const HIGH_COMPLEXITY_ABOVE: u32 = 60;

/// Which way the policy moved the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    /// Critical load: nodes were shed.
    Down,
    /// Spare headroom: nodes were added.
    Up,
}

/// A config change produced by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleDecision {
    pub config: ClusterConfig,
    pub reason: String,
    pub direction: ScaleDirection,
}

/// Derive the full config for a node count reached by scaling in
/// `direction`.
///
/// This is the only place `complexity` and `status` are computed.
pub fn classify(node_count: u32, direction: ScaleDirection) -> ClusterConfig {
    let node_count = clamp_nodes(node_count);
    let (complexity, status) = match direction {
        ScaleDirection::Down => {
            let complexity = if node_count < LOW_COMPLEXITY_BELOW {
                Complexity::Low
            } else {
                Complexity::Medium
            };
            (complexity, ClusterStatus::Strained)
        }
        ScaleDirection::Up => {
            let complexity = if node_count > HIGH_COMPLEXITY_ABOVE {
                Complexity::High
            } else {
                Complexity::Medium
            };
            (complexity, ClusterStatus::Optimal)
        }
    };
    ClusterConfig {
        node_count,
        complexity,
        status,
    }
}

/// Decide whether the cluster should change size.
///
/// Returns `None` inside the dead zone (`40 <= cpu <= 85`), for a NaN
/// reading, and whenever clamping leaves the node count where it was.
pub fn evaluate(cpu: f64, config: &ClusterConfig) -> Option<ScaleDecision> {
    let current = config.node_count;

    let (direction, target) = if cpu > SCALE_DOWN_CPU {
        let shed = (f64::from(current) * SCALE_DOWN_FRACTION).floor() as u32;
        let target = current.saturating_sub(shed).max(MIN_NODES);
        if target >= current {
            return None;
        }
        (ScaleDirection::Down, target)
    } else if cpu < SCALE_UP_CPU {
        let target = current.saturating_add(SCALE_UP_STEP).min(MAX_NODES);
        if target <= current {
            return None;
        }
        (ScaleDirection::Up, target)
    } else {
        return None;
    };

    let next = classify(target, direction);
    if next == *config {
        return None;
    }

    let reason = match direction {
        ScaleDirection::Down => {
            format!("Critical load detected. Reducing active nodes to {target}.")
        }
        ScaleDirection::Up => {
            format!("Available headroom. Expanding neural architecture to {target} nodes.")
        }
    };

    debug!(
        cpu,
        from = current,
        to = target,
        ?direction,
        "autoscale decision"
    );

    Some(ScaleDecision {
        config: next,
        reason,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_COMPLEXITY: [Complexity; 4] = [
        Complexity::Low,
        Complexity::Medium,
        Complexity::High,
        Complexity::Critical,
    ];

    fn config(nodes: u32) -> ClusterConfig {
        ClusterConfig::new(nodes, Complexity::Medium, ClusterStatus::Optimal)
    }

    #[test]
    fn critical_load_sheds_twenty_percent() {
        let decision = evaluate(90.0, &config(50)).unwrap();

        assert_eq!(decision.config.node_count, 40);
        assert_eq!(decision.config.status, ClusterStatus::Strained);
        assert_eq!(decision.config.complexity, Complexity::Medium);
        assert_eq!(decision.direction, ScaleDirection::Down);
        assert_eq!(
            decision.reason,
            "Critical load detected. Reducing active nodes to 40."
        );
    }

    #[test]
    fn scale_down_clamps_to_min_nodes() {
        // 12 - floor(2.4) = 10, which is already the floor.
        let decision = evaluate(90.0, &config(12)).unwrap();
        assert_eq!(decision.config.node_count, MIN_NODES);
        assert_eq!(decision.config.complexity, Complexity::Low);

        // 11 - floor(2.2) = 9, clamped up to 10.
        let decision = evaluate(95.0, &config(11)).unwrap();
        assert_eq!(decision.config.node_count, MIN_NODES);
    }

    #[test]
    fn scale_down_at_floor_is_no_op() {
        assert_eq!(evaluate(99.0, &config(MIN_NODES)), None);
    }

    #[test]
    fn headroom_adds_five_nodes() {
        let decision = evaluate(20.0, &config(24)).unwrap();

        assert_eq!(decision.config.node_count, 29);
        assert_eq!(decision.config.status, ClusterStatus::Optimal);
        assert_eq!(decision.config.complexity, Complexity::Medium);
        assert_eq!(decision.direction, ScaleDirection::Up);
        assert_eq!(
            decision.reason,
            "Available headroom. Expanding neural architecture to 29 nodes."
        );
    }

    #[test]
    fn scale_up_reports_high_complexity_above_sixty() {
        let decision = evaluate(10.0, &config(60)).unwrap();
        assert_eq!(decision.config.node_count, 65);
        assert_eq!(decision.config.complexity, Complexity::High);

        let decision = evaluate(10.0, &config(55)).unwrap();
        assert_eq!(decision.config.node_count, 60);
        assert_eq!(decision.config.complexity, Complexity::Medium);
    }

    #[test]
    fn scale_up_clamps_to_max_nodes() {
        let decision = evaluate(5.0, &config(98)).unwrap();
        assert_eq!(decision.config.node_count, MAX_NODES);

        assert_eq!(evaluate(5.0, &config(MAX_NODES)), None);
    }

    #[test]
    fn dead_zone_never_scales() {
        let mut cpu = SCALE_UP_CPU;
        while cpu <= SCALE_DOWN_CPU {
            for nodes in MIN_NODES..=MAX_NODES {
                for complexity in ALL_COMPLEXITY {
                    for status in ClusterStatus::ALL {
                        let cfg = ClusterConfig::new(nodes, complexity, status);
                        assert_eq!(evaluate(cpu, &cfg), None, "cpu {cpu} nodes {nodes}");
                    }
                }
            }
            cpu += 0.5;
        }
        assert_eq!(evaluate(SCALE_DOWN_CPU, &config(50)), None);
        assert_eq!(evaluate(SCALE_UP_CPU, &config(50)), None);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert!(evaluate(85.01, &config(50)).is_some());
        assert!(evaluate(39.99, &config(50)).is_some());
    }

    #[test]
    fn decisions_always_change_the_config() {
        for nodes in MIN_NODES..=MAX_NODES {
            for cpu in [0.0, 25.0, 39.9, 85.1, 92.0, 100.0] {
                let cfg = config(nodes);
                if let Some(decision) = evaluate(cpu, &cfg) {
                    assert_ne!(decision.config, cfg);
                    assert!((MIN_NODES..=MAX_NODES).contains(&decision.config.node_count));
                }
            }
        }
    }

    #[test]
    fn nan_reading_is_no_op() {
        assert_eq!(evaluate(f64::NAN, &config(50)), None);
    }

    #[test]
    fn out_of_range_config_never_grows_on_scale_down() {
        let odd = ClusterConfig {
            node_count: 5,
            complexity: Complexity::Low,
            status: ClusterStatus::Idle,
        };
        assert_eq!(evaluate(99.0, &odd), None);
    }

    #[test]
    fn classify_is_the_single_source_of_derived_fields() {
        assert_eq!(
            classify(29, ScaleDirection::Down),
            ClusterConfig::new(29, Complexity::Low, ClusterStatus::Strained)
        );
        assert_eq!(
            classify(30, ScaleDirection::Down),
            ClusterConfig::new(30, Complexity::Medium, ClusterStatus::Strained)
        );
        assert_eq!(
            classify(61, ScaleDirection::Up),
            ClusterConfig::new(61, Complexity::High, ClusterStatus::Optimal)
        );
        assert_eq!(classify(500, ScaleDirection::Up).node_count, MAX_NODES);
    }
}
