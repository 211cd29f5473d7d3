// Attack visualization core
//
// Projection, particle lifecycle, spawn pacing, the frame loop and the
// stats overlay model. Nothing in here performs I/O; the terminal UI
// and the workers feed it plain data.

pub mod animator;
pub mod backend;
pub mod particle;
pub mod projector;
pub mod scheduler;
pub mod stats;

pub use animator::{Counters, FlowAnimator, FlowInputs, FrameHost, FrameReport, FrameToken};
pub use backend::{create_backend, RenderBackend, Shape};
pub use stats::StatsView;
