//! Simulated device
//!
//! [`SimulatedPod`] is a transport that also plays the hardware: it keeps its
//! own notion of the current set/preset and stored preset names, and answers
//! every query after a simulated latency by updating the controller's board
//! and posting one completion. Responses can be lost on purpose to exercise
//! handshake timeouts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use podsync_core::{
    FrameBody, FrameFactory, Message, MessageKind, PodsyncResult, Transport, CURRENT_PRESET,
    CURRENT_SET,
};
use podsync_runtime::{CompletionSignal, SharedBoard};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::recording::{RecordingTransport, SentMessage};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// How the simulated device behaves on the link
#[derive(Debug, Clone)]
pub struct SimulatedPodConfig {
    /// Response latency range (min, max) in milliseconds
    pub latency_range: (u64, u64),
    /// Fraction of query responses that never arrive (0.0 to 1.0)
    pub response_loss_rate: f64,
    /// Seed for latency and loss decisions
    pub seed: u64,
}

impl Default for SimulatedPodConfig {
    fn default() -> Self {
        Self {
            latency_range: (1, 5),
            response_loss_rate: 0.0,
            seed: 0x5eed,
        }
    }
}

impl SimulatedPodConfig {
    /// Answer as soon as the runtime schedules the responder
    pub fn instant() -> Self {
        Self {
            latency_range: (0, 0),
            ..Self::default()
        }
    }

    /// A device that never answers
    pub fn unresponsive() -> Self {
        Self {
            response_loss_rate: 1.0,
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_range = (min_ms, max_ms.max(min_ms));
        self
    }
}

// ----------------------------------------------------------------------------
// Device State
// ----------------------------------------------------------------------------

/// What the device itself believes, independent of the controller's board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub current_set: u8,
    pub current_preset: u8,
    /// Names stored per (set, preset)
    pub preset_names: HashMap<(u8, u8), String>,
    /// (set, preset) slots written by save requests, in order
    pub saved: Vec<(u8, u8)>,
    save_armed: bool,
}

impl DeviceState {
    fn resolve(&self, preset: u16, set: u16) -> (u8, u8) {
        let set = if set == CURRENT_SET {
            self.current_set
        } else {
            set as u8
        };
        let preset = if preset == CURRENT_PRESET {
            self.current_preset
        } else {
            preset as u8
        };
        (set, preset)
    }

    fn preset_name(&self, set: u8, preset: u8) -> String {
        self.preset_names
            .get(&(set, preset))
            .cloned()
            .unwrap_or_else(|| format!("Preset {}-{}", set + 1, preset + 1))
    }
}

// ----------------------------------------------------------------------------
// Simulated Pod
// ----------------------------------------------------------------------------

/// Transport plus responder standing in for the hardware
#[derive(Clone)]
pub struct SimulatedPod {
    shared: Arc<PodShared>,
}

struct PodShared {
    config: SimulatedPodConfig,
    board: SharedBoard,
    signal: CompletionSignal,
    recorder: RecordingTransport,
    device: Mutex<DeviceState>,
    rng: Mutex<fastrand::Rng>,
    dropping: AtomicBool,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
    idle: Notify,
    answered: AtomicU64,
    dropped: AtomicU64,
}

impl PodShared {
    fn device(&self) -> MutexGuard<'_, DeviceState> {
        self.device.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn rng(&self) -> MutexGuard<'_, fastrand::Rng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SimulatedPod {
    pub fn new(board: SharedBoard, signal: CompletionSignal, config: SimulatedPodConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        Self {
            shared: Arc::new(PodShared {
                config,
                board,
                signal,
                recorder: RecordingTransport::new(),
                device: Mutex::new(DeviceState::default()),
                rng: Mutex::new(rng),
                dropping: AtomicBool::new(false),
                outstanding: AtomicUsize::new(0),
                max_outstanding: AtomicUsize::new(0),
                idle: Notify::new(),
                answered: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Stop (or resume) answering queries
    pub fn set_drop_responses(&self, dropping: bool) {
        self.shared.dropping.store(dropping, Ordering::SeqCst);
    }

    /// Make subsequent sends fail at the transport level
    pub fn set_failing(&self, failing: bool) {
        self.shared.recorder.set_failing(failing);
    }

    pub fn device_state(&self) -> DeviceState {
        self.shared.device().clone()
    }

    /// Put the device on a given set/preset, as if changed from its front panel
    pub fn set_device_selection(&self, set: u8, preset: u8) {
        let mut device = self.shared.device();
        device.current_set = set;
        device.current_preset = preset;
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.shared.recorder.sent()
    }

    pub fn kinds(&self) -> Vec<MessageKind> {
        self.shared.recorder.kinds()
    }

    pub fn count_where(&self, predicate: impl Fn(&MessageKind) -> bool) -> usize {
        self.shared.recorder.count_where(predicate)
    }

    pub fn clear_sent(&self) {
        self.shared.recorder.clear();
    }

    /// Highest number of queries that were awaiting a response at once
    pub fn max_outstanding(&self) -> usize {
        self.shared.max_outstanding.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    pub fn answered(&self) -> u64 {
        self.shared.answered.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::SeqCst)
    }

    /// Wait until every accepted query has been answered
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.shared.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            idle.await;
        }
    }

    fn apply_mutation(&self, message: &Message) {
        let mut device = self.shared.device();
        match message.kind() {
            MessageKind::SetChange { set } => device.current_set = set,
            MessageKind::PresetChange { preset } => device.current_preset = preset,
            MessageKind::SaveTrigger => device.save_armed = true,
            MessageKind::PresetDefinition { preset, set } => {
                let slot = device.resolve(preset, set);
                match FrameFactory::decode(message.frame()) {
                    Ok(frame) => {
                        if let FrameBody::Preset(snapshot) = frame.body {
                            device.preset_names.insert(slot, snapshot.name);
                        }
                    }
                    Err(e) => warn!("Simulated pod could not decode preset definition: {}", e),
                }
                if device.save_armed {
                    device.save_armed = false;
                    device.saved.push(slot);
                }
            }
            _ => {}
        }
    }

    fn accept_query(&self, kind: MessageKind) {
        let lose = {
            let mut rng = self.shared.rng();
            self.shared.dropping.load(Ordering::SeqCst)
                || rng.f64() < self.shared.config.response_loss_rate
        };
        if lose {
            self.shared.dropped.fetch_add(1, Ordering::SeqCst);
            debug!(query = %kind, "Simulated pod dropping response");
            return;
        }

        let now = self.shared.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_outstanding.fetch_max(now, Ordering::SeqCst);

        let (min, max) = self.shared.config.latency_range;
        let latency = Duration::from_millis(self.shared.rng().u64(min..=max.max(min)));

        let pod = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            pod.respond(kind).await;
        });
    }

    async fn respond(&self, kind: MessageKind) {
        {
            let mut board = self.shared.board.lock().await;
            let result = match kind {
                MessageKind::SetQuery { set } => {
                    board.set_set_name(set as u8, &format!("Set {}", set + 1))
                }
                MessageKind::PresetQuery { preset, set } => {
                    let (set, preset) = self.shared.device().resolve(preset, set);
                    let name = self.shared.device().preset_name(set, preset);
                    board.set_preset_name(set, preset, &name)
                }
                MessageKind::StatusQuerySetId => {
                    let set = self.shared.device().current_set;
                    board.set_current_set(set)
                }
                MessageKind::StatusQueryPresetId => {
                    let preset = self.shared.device().current_preset;
                    board.set_current_preset(preset)
                }
                _ => Ok(()),
            };
            if let Err(e) = result {
                warn!(query = %kind, "Simulated pod could not apply response: {}", e);
            }
        }

        // Decrement first so the next query never observes this one as pending
        let remaining = self.shared.outstanding.fetch_sub(1, Ordering::SeqCst) - 1;
        self.shared.answered.fetch_add(1, Ordering::SeqCst);
        self.shared.signal.complete();
        if remaining == 0 {
            self.shared.idle.notify_waiters();
        }
    }
}

#[async_trait]
impl Transport for SimulatedPod {
    async fn send(&self, message: Message, channel: u8, sub_channel: u8) -> PodsyncResult<()> {
        let kind = message.kind();
        self.shared
            .recorder
            .send(message.clone(), channel, sub_channel)
            .await?;
        self.apply_mutation(&message);
        if kind.is_query() {
            self.accept_query(kind);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated-pod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsync_core::{DeviceLayout, FrameFactory, MessageFactory, PedalBoard};
    use podsync_runtime::SyncGate;

    fn init_logging() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn pod(config: SimulatedPodConfig) -> (SimulatedPod, SharedBoard, SyncGate) {
        init_logging();
        let board = SharedBoard::new(PedalBoard::new(DeviceLayout::new(2, 2)));
        let gate = SyncGate::new(Duration::from_millis(500));
        let pod = SimulatedPod::new(board.clone(), gate.signal(), config);
        (pod, board, gate)
    }

    #[tokio::test]
    async fn test_query_updates_board_and_completes() {
        let (pod, board, gate) = pod(SimulatedPodConfig::instant());
        pod.set_device_selection(1, 0);

        let session = gate.session().await;
        let query = FrameFactory.status_query_set_id().unwrap();
        session
            .handshake(query.kind(), pod.send(query, 0, 0))
            .await
            .unwrap();

        assert_eq!(board.lock().await.current_set(), Some(1));
        assert_eq!(pod.answered(), 1);
        assert_eq!(pod.max_outstanding(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_after_last_response() {
        let (pod, board, _gate) = pod(SimulatedPodConfig::instant().with_latency(10, 10));
        pod.set_device_selection(1, 1);

        pod.send(FrameFactory.status_query_set_id().unwrap(), 0, 0)
            .await
            .unwrap();
        pod.send(FrameFactory.status_query_preset_id().unwrap(), 0, 0)
            .await
            .unwrap();
        assert_eq!(pod.outstanding(), 2);

        pod.wait_idle().await;
        assert_eq!(pod.outstanding(), 0);
        assert_eq!(pod.answered(), 2);
        assert_eq!(board.lock().await.selection(), Some((1, 1)));

        // Nothing pending resolves at once
        pod.wait_idle().await;
    }

    #[tokio::test]
    async fn test_unresponsive_device_drops_queries() {
        let (pod, _board, _gate) = pod(SimulatedPodConfig::unresponsive());
        pod.send(FrameFactory.set_query(0).unwrap(), 0, 0)
            .await
            .unwrap();
        assert_eq!(pod.dropped(), 1);
        assert_eq!(pod.outstanding(), 0);
        assert_eq!(pod.kinds(), vec![MessageKind::SetQuery { set: 0 }]);
    }

    #[tokio::test]
    async fn test_save_records_target_slot() {
        let (pod, board, _gate) = pod(SimulatedPodConfig::instant());
        let snapshot = board.snapshot().await;

        pod.send(FrameFactory.save_trigger().unwrap(), 0, 0)
            .await
            .unwrap();
        pod.send(
            FrameFactory.preset_definition(&snapshot, 1, 0).unwrap(),
            0,
            0,
        )
        .await
        .unwrap();

        assert_eq!(pod.device_state().saved, vec![(0, 1)]);
    }
}
