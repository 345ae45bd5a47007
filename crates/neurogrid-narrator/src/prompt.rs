//! Prompt text sent to the text-generation service.

use std::fmt::Write;

use neurogrid_state::{ClusterConfig, SystemMetrics};

/// Log messages included as narration context.
pub const RECENT_LOG_WINDOW: usize = 3;

/// The last [`RECENT_LOG_WINDOW`] entries of `recent`, oldest first.
pub fn recent_window(recent: &[String]) -> &[String] {
    &recent[recent.len().saturating_sub(RECENT_LOG_WINDOW)..]
}

/// Prompt for a one-line status commentary.
pub fn narration_prompt(
    metrics: &SystemMetrics,
    config: &ClusterConfig,
    recent: &[String],
) -> String {
    let mut prompt = String::from(
        "You are the onboard intelligence of NeuroGrid, an adaptive neural compute cluster.\n",
    );
    push_telemetry(&mut prompt, metrics);
    let _ = writeln!(
        prompt,
        "Cluster: {} nodes, complexity {}, status {}.",
        config.node_count,
        config.complexity.as_str(),
        config.status.as_str()
    );

    let window = recent_window(recent);
    if window.is_empty() {
        prompt.push_str("Recent events: none.\n");
    } else {
        prompt.push_str("Recent events:\n");
        for message in window {
            let _ = writeln!(prompt, "- {message}");
        }
    }

    prompt.push_str(
        "Reply with a single short sentence (under 20 words) commenting on the \
         system state in a terse, technical voice.",
    );
    prompt
}

/// Prompt for an on-demand optimization plan.
pub fn plan_prompt(metrics: &SystemMetrics) -> String {
    let mut prompt = String::from(
        "You are the optimization planner of NeuroGrid, an adaptive neural compute cluster.\n",
    );
    push_telemetry(&mut prompt, metrics);
    prompt.push_str(
        "Propose a concise three-step plan to improve throughput and thermal \
         headroom. Use at most 60 words.",
    );
    prompt
}

fn push_telemetry(prompt: &mut String, metrics: &SystemMetrics) {
    let _ = writeln!(
        prompt,
        "Telemetry: CPU {:.1}%, memory {:.1}%, latency {:.0} ms, temperature {:.1} C.",
        metrics.cpu_load, metrics.memory_usage, metrics.network_latency, metrics.temperature
    );
}
