// Application state management
//
// This module contains the main AppState struct: the range topology,
// the operator's selection, the running attack, the operator log, and
// the animation loop with its frame clock. Network work happens on the
// workers in `crate::net::worker`; their results are drained here at
// the start of every tick.

pub mod config;
pub mod event;
pub mod topology;

pub use config::{AttackSettings, RefreshConfig, RenderSettings};

use crate::model::{ActiveAttack, AttackStatus, LogLevel, Node, Selection, Team};
use crate::net::api::AttackRequest;
use crate::net::feed::FeedMessage;
use crate::net::{ApiClient, Command, ControlWorker, FeedEvent, FeedWorker, Update};
use crate::viz::{
    create_backend, Counters, FlowAnimator, FlowInputs, FrameHost, FrameReport, FrameToken,
    RenderBackend, Shape,
};
use config::{FEED_CONNECT_DELAY, LOG_CAPACITY, STATUS_REFRESH_INTERVAL};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

// ============================================================================
// Frame clock
// ============================================================================

/// Animation-frame primitive for the terminal run loop
///
/// At most one frame is pending at a time. The run loop calls
/// `take_due` once per iteration and fires the animator with the token.
#[derive(Debug)]
pub struct FrameClock {
    started: Instant,
    next_token: u64,
    pending: Option<FrameToken>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            next_token: 0,
            pending: None,
        }
    }

    /// Take the pending frame, if any, leaving nothing scheduled
    pub fn take_due(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Monotonic milliseconds since the clock was created
    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for FrameClock {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

// ============================================================================
// Operator log
// ============================================================================

/// One line in the operator log panel
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Time since startup
    pub at: Duration,
    pub level: LogLevel,
    pub message: String,
    /// Machine the line came from, for tool output
    pub source: Option<String>,
}

/// Which team the cursor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Red,
    Blue,
}

// ============================================================================
// AppState
// ============================================================================

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    pub red_team: Vec<Node>,
    pub blue_team: Vec<Node>,

    /// Sources, target, attack type, and whether the attack runs
    pub selection: Selection,

    /// Team the cursor is on (switch with Tab)
    pub focus: Focus,
    pub red_cursor: usize,
    pub blue_cursor: usize,

    pub render: RenderSettings,
    pub attack: AttackSettings,

    /// UI frame interval
    pub refresh_config: RefreshConfig,

    /// Attack launched from this session
    pub active_attack: Option<ActiveAttack>,

    /// Last health check result
    pub api_connected: bool,

    /// Bounded operator log, oldest first
    pub logs: VecDeque<LogEntry>,

    /// Caller-owned counters, handed to the animator on every mount
    pub counter_seed: Counters,

    /// Most recent completed frame
    pub last_report: Option<FrameReport>,

    /// Shapes of the most recent completed frame
    pub shapes: Vec<Shape>,

    animator: FlowAnimator,
    clock: FrameClock,
    backend: Box<dyn RenderBackend>,

    updates_tx: Sender<Update>,
    updates_rx: Receiver<Update>,
    control: Option<ControlWorker>,
    feed: Option<FeedWorker>,
    /// API base URL for feed connections, set once a client is attached
    api_base: Option<String>,
    launch_pending: bool,
    last_status_refresh: Option<Instant>,
    started: Instant,
}

impl AppState {
    /// Create a state with no API client attached
    ///
    /// The animator is mounted immediately with zeroed counters.
    pub fn new(
        render: RenderSettings,
        attack: AttackSettings,
        refresh_config: RefreshConfig,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::channel();
        let mut clock = FrameClock::new();
        let mut animator = FlowAnimator::new();
        animator.mount(&mut clock, Some(Counters::default()));

        let selection = Selection {
            attack_type: attack.attack_type,
            ..Selection::default()
        };

        Self {
            running: true,
            red_team: topology::red_team(),
            blue_team: topology::blue_team(),
            selection,
            focus: Focus::default(),
            red_cursor: 0,
            blue_cursor: 0,
            backend: create_backend(render.renderer),
            render,
            attack,
            refresh_config,
            active_attack: None,
            api_connected: false,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            counter_seed: Counters::default(),
            last_report: None,
            shapes: Vec::new(),
            animator,
            clock,
            updates_tx,
            updates_rx,
            control: None,
            feed: None,
            api_base: None,
            launch_pending: false,
            last_status_refresh: None,
            started: Instant::now(),
        }
    }

    /// Start the control worker for `client`
    pub fn attach(&mut self, client: ApiClient) {
        self.api_base = Some(client.base_url().to_string());
        self.log(
            LogLevel::Info,
            format!("Using orchestration API at {}", client.base_url()),
        );
        self.control = Some(ControlWorker::spawn(client, self.updates_tx.clone()));
    }

    /// Update state on each loop iteration
    ///
    /// Order: drain worker updates, schedule the periodic status
    /// refresh, then fire the pending animation frame.
    pub fn on_tick(&mut self) {
        self.drain_updates();

        let refresh_due = self
            .last_status_refresh
            .map(|t| t.elapsed() >= STATUS_REFRESH_INTERVAL)
            .unwrap_or(true);
        if refresh_due && self.control.is_some() {
            self.refresh_status();
        }

        self.selection.is_attacking = self.is_attacking();
        self.fire_frame();
    }

    /// Health always, topology only while no attack is running
    fn refresh_status(&mut self) {
        self.last_status_refresh = Some(Instant::now());
        self.send(Command::CheckHealth);
        if !self.is_attacking() {
            self.send(Command::RefreshTopology);
        }
    }

    fn fire_frame(&mut self) {
        let Some(token) = self.clock.take_due() else {
            return;
        };

        let inputs = FlowInputs {
            red_team: &self.red_team,
            blue_team: &self.blue_team,
            selection: &self.selection,
            packets_per_second: Some(self.render.packets_per_second),
            labels: self.render.labels_enabled,
        };
        let now_ms = self.clock.now_ms();

        if let Some(report) =
            self.animator
                .on_frame(token, now_ms, &inputs, &mut self.clock, self.backend.as_mut())
        {
            self.shapes = self.backend.take_shapes();
            tracing::trace!(
                spawned = report.spawned,
                retired = report.retired,
                in_flight = report.in_flight,
                "Frame"
            );
            if report.counters_changed() {
                self.counter_seed = report.counters;
            }
            self.last_report = Some(report);
        }
    }

    fn drain_updates(&mut self) {
        loop {
            match self.updates_rx.try_recv() {
                Ok(update) => self.apply_update(update),
                Err(TryRecvError::Empty) => break,
                // Cannot happen while we hold a sender
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Apply one worker result; last write wins
    pub fn apply_update(&mut self, update: Update) {
        match update {
            Update::Health(healthy) => {
                if healthy != self.api_connected {
                    if healthy {
                        self.log(LogLevel::Success, "Orchestration API connected");
                    } else {
                        self.log(LogLevel::Error, "Orchestration API unreachable");
                    }
                }
                self.api_connected = healthy;
            }
            Update::RedTeam(vms) => {
                topology::apply_red_status(&mut self.red_team, &vms);
            }
            Update::BlueTeam(targets) => {
                topology::apply_blue_status(&mut self.blue_team, &targets);
            }
            Update::TopologyFailed(error) => {
                // The health badge already shows connectivity
                tracing::debug!(error = %error, "Topology refresh failed");
            }
            Update::Launched(launch) => {
                self.launch_pending = false;
                let target_address = self
                    .target_node()
                    .map(|n| n.address.clone())
                    .unwrap_or_default();
                let message = if launch.message.is_empty() {
                    format!("Attack {} launched", launch.attack_id)
                } else {
                    launch.message.clone()
                };
                self.log(LogLevel::Success, message);

                self.start_feed(&launch.attack_id);
                self.active_attack = Some(ActiveAttack {
                    attack_id: launch.attack_id,
                    attack_type: self.selection.attack_type,
                    target_address,
                    target_port: self.attack.target_port,
                    status: launch.status,
                });
            }
            Update::LaunchFailed(error) => {
                self.launch_pending = false;
                self.log(LogLevel::Error, format!("Launch failed: {error}"));
            }
            Update::StopRequested(attack_id) => {
                self.log(LogLevel::Warning, format!("Stop requested for attack {attack_id}"));
                self.set_attack_status(&attack_id, AttackStatus::Stopped);
            }
            Update::StopFailed(error) => {
                self.log(LogLevel::Error, format!("Stop failed: {error}"));
            }
            Update::SpoofingReady { range, ips } => {
                self.log(
                    LogLevel::Success,
                    format!("IP spoofing enabled: {} addresses from {range}", ips.len()),
                );
                self.attack.enable_ip_spoofing = true;
                self.attack.spoofed_ips = ips;
            }
            Update::SpoofingFailed(error) => {
                self.log(LogLevel::Error, format!("IP spoofing unavailable: {error}"));
            }
            Update::Feed { attack_id, event } => self.apply_feed_event(&attack_id, event),
        }
    }

    fn apply_feed_event(&mut self, attack_id: &str, event: FeedEvent) {
        let current = self
            .active_attack
            .as_ref()
            .map(|a| a.attack_id == attack_id)
            .unwrap_or(false);
        if !current {
            tracing::debug!(attack_id, "Ignoring feed event for an old attack");
            return;
        }

        match event {
            FeedEvent::Opened => self.log(LogLevel::Success, "Live feed connected"),
            FeedEvent::Message(message) => self.apply_feed_message(attack_id, &message),
            FeedEvent::Error(error) => {
                self.log(LogLevel::Error, format!("Live feed error: {error}"))
            }
            FeedEvent::Closed => {
                if self.feed.as_ref().is_some_and(|f| f.attack_id() == attack_id) {
                    self.feed = None;
                }
                self.log(LogLevel::Info, "Live feed closed");
            }
        }
    }

    fn apply_feed_message(&mut self, attack_id: &str, message: &FeedMessage) {
        for line in message.log_lines() {
            self.push_log(line.level, line.message, line.source);
        }
        if let Some(status) = message.attack_status() {
            self.set_attack_status(attack_id, status);
        }
    }

    fn set_attack_status(&mut self, attack_id: &str, status: AttackStatus) {
        let Some(attack) = self.active_attack.as_mut().filter(|a| a.attack_id == attack_id) else {
            return;
        };
        if attack.status == status {
            return;
        }
        attack.status = status;
        tracing::info!(attack_id, status = status.label(), "Attack status changed");

        if !matches!(status, AttackStatus::Queued | AttackStatus::Running) {
            if let Some(feed) = self.feed.take() {
                feed.stop();
            }
        }
    }

    /// Open the live feed for `attack_id`, closing any previous one
    fn start_feed(&mut self, attack_id: &str) {
        if let Some(old) = self.feed.take() {
            old.stop();
        }
        let Some(base) = self.api_base.as_deref() else {
            tracing::debug!(attack_id, "No API attached; live feed skipped");
            return;
        };
        let url = crate::net::api::feed_url(base, attack_id);
        self.feed = Some(FeedWorker::spawn(
            attack_id.to_string(),
            url,
            FEED_CONNECT_DELAY,
            self.updates_tx.clone(),
        ));
    }

    fn send(&mut self, command: Command) -> bool {
        let sent = self.control.as_ref().map(|c| c.send(command)).unwrap_or(false);
        if !sent {
            self.log(LogLevel::Error, "Orchestration API client is not running");
        }
        sent
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True while the launched attack reports running
    pub fn is_attacking(&self) -> bool {
        self.active_attack
            .as_ref()
            .map(ActiveAttack::is_running)
            .unwrap_or(false)
    }

    /// Animated packet counters as of the last frame
    pub fn counters(&self) -> Counters {
        self.animator.counters()
    }

    pub fn in_flight(&self) -> usize {
        self.animator.in_flight()
    }

    #[cfg(test)]
    pub fn frame_pending(&self) -> bool {
        self.clock.is_pending()
    }

    pub fn target_node(&self) -> Option<&Node> {
        let id = self.selection.target.as_deref()?;
        self.blue_team.iter().find(|n| n.id == id)
    }

    /// Node under the cursor on the focused team
    pub fn cursor_node(&self) -> Option<&Node> {
        match self.focus {
            Focus::Red => self.red_team.get(self.red_cursor),
            Focus::Blue => self.blue_team.get(self.blue_cursor),
        }
    }

    // ========================================================================
    // Operator log
    // ========================================================================

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push_log(level, message.into(), None);
    }

    fn push_log(&mut self, level: LogLevel, message: String, source: Option<String>) {
        while self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            at: self.started.elapsed(),
            level,
            message,
            source,
        });
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Red => Focus::Blue,
            Focus::Blue => Focus::Red,
        };
    }

    pub fn cursor_up(&mut self) {
        let cursor = match self.focus {
            Focus::Red => &mut self.red_cursor,
            Focus::Blue => &mut self.blue_cursor,
        };
        *cursor = cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let (cursor, len) = match self.focus {
            Focus::Red => (&mut self.red_cursor, self.red_team.len()),
            Focus::Blue => (&mut self.blue_cursor, self.blue_team.len()),
        };
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    /// Select or deselect the node under the cursor
    pub fn toggle_cursor_node(&mut self) {
        let Some(node) = self.cursor_node() else {
            return;
        };
        let (id, team) = (node.id.clone(), node.team);
        match team {
            Team::Attacker => self.on_source_select(&id),
            Team::Target => self.on_target_select(&id),
        }
    }

    /// Toggle a source; rejected if it is the current target
    pub fn on_source_select(&mut self, id: &str) {
        if self.selection.is_target(id) {
            self.log(LogLevel::Warning, format!("{id} is the target and cannot be a source"));
            return;
        }
        if !self.red_team.iter().any(|n| n.id == id) {
            return;
        }
        self.selection.toggle_source(id);
    }

    /// Choose the target, or clear it when already chosen; rejected if
    /// the id is a selected source
    pub fn on_target_select(&mut self, id: &str) {
        if self.selection.is_source(id) {
            self.log(LogLevel::Warning, format!("{id} is a source and cannot be the target"));
            return;
        }
        if !self.blue_team.iter().any(|n| n.id == id) {
            return;
        }
        if self.selection.is_target(id) {
            self.selection.target = None;
        } else {
            self.selection.target = Some(id.to_string());
        }
    }

    // ========================================================================
    // Attack control
    // ========================================================================

    /// Validate the selection and ask the control worker to launch
    pub fn launch(&mut self) {
        if self.is_attacking() || self.launch_pending {
            self.log(LogLevel::Warning, "An attack is already running");
            return;
        }
        if self.selection.sources.is_empty() {
            self.log(LogLevel::Error, "Select at least one source machine");
            return;
        }
        let Some(target_id) = self.selection.target.clone() else {
            self.log(LogLevel::Error, "Select a target");
            return;
        };

        let spoofed_ips = (self.attack.enable_ip_spoofing && !self.attack.spoofed_ips.is_empty())
            .then(|| self.attack.spoofed_ips.clone());
        let request = AttackRequest {
            attack_type: self.selection.attack_type,
            source_vms: self.selection.sources.iter().cloned().collect(),
            target_id: target_id.clone(),
            target_port: self.attack.target_port,
            duration: self.attack.duration,
            workers: self.attack.workers,
            sockets: self.attack.sockets,
            enable_ip_spoofing: self.attack.enable_ip_spoofing,
            spoofed_ips,
        };

        self.log(
            LogLevel::Info,
            format!(
                "Launching {} from {} source(s) against {target_id}",
                self.selection.attack_type.display_name(),
                request.source_vms.len()
            ),
        );
        if self.send(Command::Launch(request)) {
            self.launch_pending = true;
        }
    }

    pub fn stop(&mut self) {
        let running = self
            .active_attack
            .as_ref()
            .filter(|a| matches!(a.status, AttackStatus::Queued | AttackStatus::Running))
            .map(|a| a.attack_id.clone());
        match running {
            Some(attack_id) => {
                self.send(Command::Stop(attack_id));
            }
            None => self.log(LogLevel::Warning, "No attack is running"),
        }
    }

    /// Next attack type; locked while an attack runs
    pub fn cycle_attack_type(&mut self) {
        if self.is_attacking() {
            self.log(LogLevel::Warning, "Stop the attack before changing its type");
            return;
        }
        self.attack.attack_type = self.attack.attack_type.next();
        self.selection.attack_type = self.attack.attack_type;
    }

    /// Disable spoofing, or request addresses to enable it
    pub fn toggle_spoofing(&mut self) {
        if self.attack.enable_ip_spoofing {
            self.attack.enable_ip_spoofing = false;
            self.attack.spoofed_ips.clear();
            self.log(LogLevel::Info, "IP spoofing disabled");
        } else if self.send(Command::PrepareSpoofing) {
            self.log(LogLevel::Info, "Requesting spoofed source addresses");
        }
    }

    // ========================================================================
    // Rendering controls
    // ========================================================================

    /// Switch layout: tear the animator down and remount it on a new
    /// backend with the preserved counters
    pub fn toggle_renderer(&mut self) {
        self.counter_seed = self.animator.teardown(&mut self.clock);
        self.render.renderer = self.render.renderer.toggled();
        self.backend = create_backend(self.render.renderer);
        self.shapes.clear();
        self.animator.mount(&mut self.clock, Some(self.counter_seed));

        tracing::info!(renderer = self.render.renderer.label(), "Renderer switched");
    }

    /// Zero the counters
    pub fn reset_counters(&mut self) {
        self.counter_seed = Counters::default();
        self.animator.reseed(self.counter_seed);
    }

    /// Stop workers and the animation loop
    pub fn shutdown(&mut self) {
        self.running = false;
        self.counter_seed = self.animator.teardown(&mut self.clock);
        if let Some(feed) = self.feed.take() {
            feed.stop();
        }
        if let Some(mut control) = self.control.take() {
            control.shutdown();
        }
    }
}
