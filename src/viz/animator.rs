// Particle simulation loop
//
// Once per frame, in this order: spawn, advance, retire, draw. The loop
// re-schedules itself through a FrameHost continuation token, and
// teardown cancels the pending token so no frame fires after the
// surface is gone.
//
// Counters live with the caller. The animator reads a seed at mount
// (or on an explicit reseed) and reports the running totals back in
// every FrameReport.

use crate::model::{Node, Selection, Team};
use crate::viz::backend::{NodeHighlight, RenderBackend, Stroke};
use crate::viz::particle::{protocol_color, ParticleArena};
use crate::viz::scheduler::{fan_out, resolve, SpawnScheduler};
use rand::{rngs::StdRng, SeedableRng};

/// Continuation key for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host animation-callback primitive
///
/// `request_frame` schedules exactly one future call of the animator's
/// frame callback; `cancel_frame` withdraws it.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Lifecycle of the loop itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// No frame requested yet
    #[default]
    Idle,
    /// A frame is requested after every completed frame
    Running,
    /// Torn down; pending frame cancelled and particles dropped
    Stopped,
}

/// Aggregate packet counters
///
/// Both counters advance together when a particle retires (reaches its
/// target). "Received" is end of flight path, not an acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub sent: u64,
    pub received: u64,
}

/// Everything the loop reads from its caller, borrowed for one frame
#[derive(Debug, Clone, Copy)]
pub struct FlowInputs<'a> {
    pub red_team: &'a [Node],
    pub blue_team: &'a [Node],
    pub selection: &'a Selection,
    /// Spawn rate, default applies when None
    pub packets_per_second: Option<f64>,
    pub labels: bool,
}

/// Outcome of one completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub spawned: usize,
    pub retired: usize,
    pub in_flight: usize,
    pub counters: Counters,
}

impl FrameReport {
    /// True when the caller-owned counter seed should be updated
    pub fn counters_changed(&self) -> bool {
        self.retired > 0
    }
}

/// Frame-driven particle animation
pub struct FlowAnimator {
    state: LoopState,
    arena: ParticleArena,
    scheduler: SpawnScheduler,
    counters: Counters,
    pending: Option<FrameToken>,
    rng: StdRng,
}

impl FlowAnimator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Animator with a fixed random stream, for reproducible runs
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            state: LoopState::Idle,
            arena: ParticleArena::new(),
            scheduler: SpawnScheduler::new(),
            counters: Counters::default(),
            pending: None,
            rng,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn in_flight(&self) -> usize {
        self.arena.len()
    }

    /// Start the loop and request the first frame
    ///
    /// Counters start from `seed`, or zero when none is given. Mounting
    /// an already running animator does nothing.
    pub fn mount(&mut self, host: &mut dyn FrameHost, seed: Option<Counters>) {
        if self.state == LoopState::Running {
            return;
        }

        self.counters = seed.unwrap_or_default();
        self.scheduler.reset();
        self.pending = Some(host.request_frame());
        self.state = LoopState::Running;

        tracing::debug!(
            sent = self.counters.sent,
            received = self.counters.received,
            "Animator mounted"
        );
    }

    /// Replace the counters with a fresh caller-provided seed
    pub fn reseed(&mut self, seed: Counters) {
        self.counters = seed;
    }

    /// Frame callback
    ///
    /// Runs only for the token most recently handed out by `host`; a
    /// stale token or a stopped loop returns None without drawing or
    /// requesting another frame.
    ///
    /// # Arguments
    /// * `token` - The continuation being fired
    /// * `now_ms` - Monotonic frame timestamp in milliseconds
    /// * `inputs` - Topology and selection for this frame
    /// * `host` - Where to request the next frame
    /// * `backend` - Where to draw
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        now_ms: f64,
        inputs: &FlowInputs<'_>,
        host: &mut dyn FrameHost,
        backend: &mut dyn RenderBackend,
    ) -> Option<FrameReport> {
        if self.state != LoopState::Running || self.pending != Some(token) {
            return None;
        }
        self.pending = None;

        // Spawn
        let mut spawned = 0;
        let due_ticks = if inputs.selection.is_attacking {
            self.scheduler.tick(now_ms, inputs.packets_per_second)
        } else {
            0
        };
        if due_ticks > 0 {
            let particles = fan_out(
                inputs.red_team,
                inputs.blue_team,
                inputs.selection,
                due_ticks,
                &*backend,
                &mut self.rng,
            );
            spawned = particles.len();
            for particle in particles {
                self.arena.insert(particle);
            }
        }

        // Advance and retire
        let retired = self.arena.advance_and_retire();
        self.counters.sent += retired as u64;
        self.counters.received += retired as u64;

        self.draw(inputs, backend);

        self.pending = Some(host.request_frame());

        Some(FrameReport {
            spawned,
            retired,
            in_flight: self.arena.len(),
            counters: self.counters,
        })
    }

    fn draw(&self, inputs: &FlowInputs<'_>, backend: &mut dyn RenderBackend) {
        backend.begin_frame();

        let selection = inputs.selection;
        let target = selection
            .target
            .as_deref()
            .and_then(|id| resolve(inputs.blue_team, id, &*backend));

        if let Some(to) = target {
            let stroke = if selection.is_attacking {
                Stroke::Active
            } else {
                Stroke::Selected
            };
            let color = protocol_color(selection.attack_type.protocol());

            for node in inputs.red_team.iter().filter(|n| selection.is_source(&n.id)) {
                let from = backend.project(node.team, node.logical_slot, inputs.red_team.len());
                backend.draw_connection(from, to, stroke, color);
            }
        }

        for (team, nodes) in [(Team::Attacker, inputs.red_team), (Team::Target, inputs.blue_team)] {
            for node in nodes {
                let highlight = match team {
                    Team::Attacker if selection.is_source(&node.id) => NodeHighlight::Source,
                    Team::Target if selection.is_target(&node.id) => NodeHighlight::Target,
                    _ => NodeHighlight::None,
                };
                let at = backend.project(node.team, node.logical_slot, nodes.len());
                backend.draw_node(node, at, highlight, inputs.labels);
            }
        }

        // Trails first so no trail covers a packet head
        let amplitude = backend.wave_amplitude();
        for particle in self.arena.iter() {
            for (age, at) in particle.trail(amplitude) {
                backend.draw_trail(at, &particle.style, age);
            }
        }
        for particle in self.arena.iter() {
            backend.draw_particle(particle.position(amplitude), &particle.style);
        }
    }

    /// Stop the loop: cancel the pending frame and drop every particle
    ///
    /// # Returns
    /// The counters at teardown, for the caller to keep as the next seed
    pub fn teardown(&mut self, host: &mut dyn FrameHost) -> Counters {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
        let dropped = self.arena.len();
        self.arena.clear();
        self.state = LoopState::Stopped;

        tracing::debug!(dropped, "Animator torn down");
        self.counters
    }
}

impl Default for FlowAnimator {
    fn default() -> Self {
        Self::new()
    }
}
