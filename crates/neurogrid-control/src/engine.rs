//! Engine — the single-writer control loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use neurogrid_metrics::NoiseSource;
use neurogrid_narrator::Narrator;
use neurogrid_narrator::prompt::RECENT_LOG_WINDOW;
use neurogrid_state::{LogKind, Snapshot};

use crate::gate::NarrationGate;
use crate::handle::{Command, EngineHandle};
use crate::settings::EngineSettings;
use crate::state::{EngineState, ONLINE_MESSAGE};

/// Owns the cluster state and drives the metrics, autoscale, and narration
/// timers.
pub struct Engine<N: NoiseSource> {
    state: EngineState,
    noise: N,
    narrator: Arc<Narrator>,
    gate: NarrationGate,
    settings: EngineSettings,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Arc<Snapshot>>,
    /// Narration requests in flight.
    narrations: JoinSet<String>,
}

impl<N: NoiseSource + 'static> Engine<N> {
    /// Create an engine and the handle used to talk to it.
    pub fn new(settings: EngineSettings, noise: N, narrator: Arc<Narrator>) -> (Self, EngineHandle) {
        let mut state = EngineState::new(settings.autoscale_enabled);
        state.log.append(LogKind::System, ONLINE_MESSAGE);

        let (command_tx, command_rx) = mpsc::channel(settings.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(state.snapshot(Instant::now())));

        let engine = Self {
            state,
            noise,
            narrator,
            gate: NarrationGate::new(settings.narration_probability),
            settings,
            commands: command_rx,
            snapshots: snapshot_tx,
            narrations: JoinSet::new(),
        };
        let handle = EngineHandle::new(command_tx, snapshot_rx);
        (engine, handle)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Run until `shutdown` flips (or its sender is dropped). Pending
    /// narration requests are aborted on exit.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_ms = self.settings.tick_interval.as_millis() as u64,
            autoscale_ms = self.settings.autoscale_interval.as_millis() as u64,
            narration_ms = self.settings.narration_interval.as_millis() as u64,
            "control loop started"
        );

        let mut metrics_tick = periodic(self.settings.tick_interval);
        let mut autoscale_tick = periodic(self.settings.autoscale_interval);
        let mut narration_tick = periodic(self.settings.narration_interval);

        loop {
            let stress_deadline = self.state.stress.deadline();

            tokio::select! {
                _ = metrics_tick.tick() => {
                    let sample = self.state.tick(&mut self.noise);
                    debug!(
                        tick = self.state.ticks,
                        cpu = sample.cpu_load,
                        mem = sample.memory_usage,
                        "metrics tick"
                    );
                }
                _ = autoscale_tick.tick() => {
                    self.state.evaluate_autoscale();
                }
                _ = narration_tick.tick() => {
                    self.request_narration();
                }
                Some(command) = self.commands.recv() => {
                    self.apply(command);
                }
                Some(joined) = self.narrations.join_next(), if !self.narrations.is_empty() => {
                    match joined {
                        Ok(text) => {
                            self.state.record_narration(text);
                        }
                        Err(e) => warn!(error = %e, "narration task did not complete"),
                    }
                }
                _ = wait_until(stress_deadline) => {
                    self.state.expire_stress(Instant::now());
                }
                _ = shutdown.changed() => {
                    info!("control loop shutting down");
                    break;
                }
            }

            self.publish();
        }

        self.narrations.shutdown().await;
        info!(ticks = self.state.ticks, "control loop stopped");
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "command received");
        match command {
            Command::SetAutoscale(enabled) => self.state.set_autoscale(enabled),
            Command::SetLoad(load) => self.state.set_artificial_load(load),
            Command::Stress { amount, duration } => {
                self.state.trigger_stress(amount, duration, Instant::now());
            }
            Command::Diagnostic => {
                self.state.diagnostic();
            }
        }
    }

    /// Spawn a narration request if the gate admits one. The request works
    /// on copies of the current state; its result comes back through the
    /// join set.
    fn request_narration(&mut self) {
        if !self.gate.admit(self.narrations.len(), &mut self.noise) {
            debug!(in_flight = self.narrations.len(), "narration skipped");
            return;
        }

        let metrics = self.state.metrics;
        let config = self.state.config;
        let recent = self.state.log.recent_messages(RECENT_LOG_WINDOW);
        let narrator = self.narrator.clone();

        self.narrations
            .spawn(async move { narrator.narrate(&metrics, &config, &recent).await });
        debug!("narration requested");
    }

    fn publish(&self) {
        let snapshot = Arc::new(self.state.snapshot(Instant::now()));
        self.snapshots.send_replace(snapshot);
    }
}

/// Interval whose first tick fires one period from now.
fn periodic(period: std::time::Duration) -> time::Interval {
    let period = period.max(std::time::Duration::from_millis(1));
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use neurogrid_metrics::SeededNoise;
    use neurogrid_narrator::{
        BoxFuture, GenerationRequest, NARRATION_FALLBACK, NarratorError, NarratorSettings,
        TextGenerator,
    };
    use neurogrid_state::LogKind;

    use crate::error::ControlError;
    use crate::state::STRESS_CONCLUDED_MESSAGE;

    struct StaticGenerator;

    impl TextGenerator for StaticGenerator {
        fn generate<'a>(
            &'a self,
            _request: &'a GenerationRequest,
        ) -> BoxFuture<'a, Result<String, NarratorError>> {
            Box::pin(async { Ok("Synaptic mesh holding steady.".to_string()) })
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            narration_probability: 0.0,
            ..EngineSettings::default()
        }
    }

    fn spawn_engine(
        settings: EngineSettings,
        narrator: Narrator,
    ) -> (EngineHandle, watch::Sender<bool>, tokio::task::JoinHandle<()>) {
        let (engine, handle) = Engine::new(settings, SeededNoise::from_seed(17), Arc::new(narrator));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(engine.run(shutdown_rx));
        (handle, shutdown_tx, task)
    }

    fn messages(snapshot: &Snapshot) -> Vec<String> {
        snapshot.logs.iter().map(|e| e.message.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn initial_snapshot_announces_startup() {
        let (engine, handle) =
            Engine::new(settings(), SeededNoise::from_seed(1), Arc::new(Narrator::offline()));
        assert_eq!(engine.state().ticks, 0);

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.logs[0].kind, LogKind::System);
        assert_eq!(snapshot.logs[0].message, ONLINE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_fill_history() {
        let (handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        time::sleep(Duration::from_millis(3_500)).await;

        let snapshot = handle.snapshot();
        assert!(snapshot.tick >= 3, "tick {}", snapshot.tick);
        assert_eq!(snapshot.history.len() as u64, snapshot.tick);

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_are_applied() {
        let (handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        handle.set_load(35.0).await.unwrap();
        handle.set_autoscale(false).await.unwrap();
        handle.diagnostic().await.unwrap();
        time::sleep(Duration::from_millis(10)).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.artificial_load, 35.0);
        assert!(!snapshot.autoscale_enabled);
        let logs = messages(&snapshot);
        assert!(logs.iter().any(|m| m == "Autoscaling disengaged. Manual control active."));
        assert!(logs.iter().any(|m| m.starts_with("Manual diagnostic:")));

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stress_pulse_starts_and_concludes() {
        let (handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        handle.stress(40.0, Duration::from_millis(2_000)).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;

        let snapshot = handle.snapshot();
        assert!(snapshot.stress.active);
        assert_eq!(snapshot.stress.amount, 40.0);
        assert!(messages(&snapshot).iter().any(|m| m.starts_with("Stress test initiated")));

        time::sleep(Duration::from_millis(2_500)).await;

        let snapshot = handle.snapshot();
        assert!(!snapshot.stress.active);
        assert!(messages(&snapshot).iter().any(|m| m == STRESS_CONCLUDED_MESSAGE));

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_stress_keeps_loop_running() {
        let (handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        handle.stress(40.0, Duration::MAX).await.unwrap();
        handle
            .stress(40.0, Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert!(!task.is_finished());
        assert!(handle.is_running());
        let snapshot = handle.snapshot();
        assert!(snapshot.stress.active);
        assert!(snapshot.stress.remaining_ms <= crate::MAX_PULSE.as_millis() as u64);

        time::sleep(Duration::from_millis(1_500)).await;
        handle.diagnostic().await.unwrap();
        assert!(handle.snapshot().tick >= 1);

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn narration_results_land_in_log_as_ai() {
        let settings = EngineSettings {
            narration_probability: 1.0,
            ..EngineSettings::default()
        };
        let narrator = Narrator::new(Arc::new(StaticGenerator), NarratorSettings::default());
        let (handle, shutdown, task) = spawn_engine(settings, narrator);

        time::sleep(Duration::from_millis(8_500)).await;

        let snapshot = handle.snapshot();
        let ai: Vec<_> = snapshot.logs.iter().filter(|e| e.kind == LogKind::Ai).collect();
        assert_eq!(ai.len(), 1);
        assert_eq!(ai[0].message, "Synaptic mesh holding steady.");

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_narration_logs_fallback() {
        let settings = EngineSettings {
            narration_probability: 1.0,
            ..EngineSettings::default()
        };
        let (handle, shutdown, task) = spawn_engine(settings, Narrator::offline());

        time::sleep(Duration::from_millis(8_500)).await;

        let snapshot = handle.snapshot();
        let ai: Vec<_> = snapshot.logs.iter().filter(|e| e.kind == LogKind::Ai).collect();
        assert_eq!(ai.len(), 1);
        assert_eq!(ai[0].message, NARRATION_FALLBACK);
        assert!(snapshot.logs.iter().all(|e| e.kind != LogKind::Error));

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_fail_after_shutdown() {
        let (handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        shutdown.send(true).unwrap();
        task.await.unwrap();

        assert!(!handle.is_running());
        assert_eq!(handle.diagnostic().await, Err(ControlError::EngineStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn changed_wakes_on_publish() {
        let (mut handle, shutdown, task) = spawn_engine(settings(), Narrator::offline());

        handle.diagnostic().await.unwrap();
        let snapshot = handle.changed().await.unwrap();
        assert!(messages(&snapshot).iter().any(|m| m.starts_with("Manual diagnostic:")));

        shutdown.send(true).unwrap();
        task.await.unwrap();
    }
}
