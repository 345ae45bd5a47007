//! Prometheus text exposition format.
//!
//! Renders the current control-loop snapshot as gauges for scraping by a
//! Prometheus server or compatible agent.

use std::fmt::Write;

use neurogrid_state::{ClusterStatus, Snapshot};

/// Render a snapshot into Prometheus text format.
pub fn render_prometheus(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let m = &snapshot.metrics;

    gauge(&mut out, "neurogrid_cpu_load", "Simulated CPU load percentage.", m.cpu_load);
    gauge(
        &mut out,
        "neurogrid_memory_usage",
        "Simulated memory usage percentage.",
        m.memory_usage,
    );
    gauge(
        &mut out,
        "neurogrid_network_latency_ms",
        "Simulated network latency in milliseconds.",
        m.network_latency,
    );
    gauge(
        &mut out,
        "neurogrid_temperature_celsius",
        "Simulated core temperature.",
        m.temperature,
    );
    gauge(
        &mut out,
        "neurogrid_node_count",
        "Active nodes in the cluster.",
        f64::from(snapshot.config.node_count),
    );
    gauge(
        &mut out,
        "neurogrid_artificial_load",
        "User-injected load percentage.",
        snapshot.artificial_load,
    );
    gauge(
        &mut out,
        "neurogrid_stress_load",
        "Extra load from the active stress pulse.",
        snapshot.stress.amount,
    );

    out.push_str("# HELP neurogrid_cluster_status Current cluster status (1 = active).\n");
    out.push_str("# TYPE neurogrid_cluster_status gauge\n");
    for status in ClusterStatus::ALL {
        let value = u8::from(snapshot.config.status == status);
        let _ = writeln!(
            out,
            "neurogrid_cluster_status{{status=\"{}\"}} {value}",
            status.as_str()
        );
    }

    out.push_str("# HELP neurogrid_ticks_total Metric ticks since start.\n");
    out.push_str("# TYPE neurogrid_ticks_total counter\n");
    let _ = writeln!(out, "neurogrid_ticks_total {}", snapshot.tick);

    out
}

fn gauge(out: &mut String, name: &str, help: &str, value: f64) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {value:.2}");
}
