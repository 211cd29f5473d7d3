// Particle model and arena
//
// A particle is one simulated unit of attack traffic travelling from a
// source node to the target node. Its path and style are captured at
// spawn time and never retargeted.

use crate::app::config::{
    MIN_PARTICLE_SPEED, PARTICLE_SIZE_RANGE, PARTICLE_SPEED_RANGE, SPAWN_PROGRESS_JITTER,
    TRAIL_LENGTH,
};
use crate::model::AttackType;
use crate::theme::{AMBER_YELLOW, FLARE_ORANGE, SIGNAL_RED, TOXIC_GREEN};
use crate::viz::projector::Point;
use rand::Rng;
use ratatui::style::Color;

/// Visual attributes of a particle, fixed at spawn
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStyle {
    /// Protocol label, e.g. "TCP SYN"
    pub protocol: &'static str,
    pub color: Color,
    /// Relative size, 2.0 to 5.0
    pub size: f64,
}

impl ParticleStyle {
    /// Derive the style for a packet of the given attack type
    pub fn for_attack(attack_type: AttackType, size: f64) -> Self {
        let protocol = attack_type.protocol();
        Self {
            protocol,
            color: protocol_color(protocol),
            size,
        }
    }

    /// Glyph used on the canvas; bigger packets get heavier glyphs
    pub fn glyph(&self) -> &'static str {
        if self.size >= 4.0 {
            "●"
        } else if self.size >= 3.0 {
            "•"
        } else {
            "·"
        }
    }
}

/// Color used for packets of a protocol
pub fn protocol_color(protocol: &str) -> Color {
    match protocol {
        "TCP SYN" => SIGNAL_RED,
        "UDP" => FLARE_ORANGE,
        "HTTP" => AMBER_YELLOW,
        "ICMP" => TOXIC_GREEN,
        _ => SIGNAL_RED,
    }
}

/// One in-flight packet
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub origin: Point,
    pub destination: Point,
    /// Position along the path, retired once it reaches 1.0
    pub progress: f64,
    /// Progress at spawn; the trail never reaches back past it
    pub start: f64,
    /// Progress added per frame, always at least MIN_PARTICLE_SPEED
    pub speed: f64,
    pub style: ParticleStyle,
}

impl Particle {
    /// Create a particle at the start of its path
    ///
    /// Speeds that are not finite or below MIN_PARTICLE_SPEED are
    /// clamped up, so every particle eventually retires.
    pub fn new(origin: Point, destination: Point, speed: f64, style: ParticleStyle) -> Self {
        let speed = if speed.is_finite() {
            speed.max(MIN_PARTICLE_SPEED)
        } else {
            MIN_PARTICLE_SPEED
        };

        Self {
            origin,
            destination,
            progress: 0.0,
            start: 0.0,
            speed,
            style,
        }
    }

    /// Create a particle with speed, size and a small head start drawn
    /// from the configured ranges
    pub fn spawn<R: Rng + ?Sized>(
        origin: Point,
        destination: Point,
        attack_type: AttackType,
        rng: &mut R,
    ) -> Self {
        let speed = rng.gen_range(PARTICLE_SPEED_RANGE);
        let size = rng.gen_range(PARTICLE_SIZE_RANGE);
        let mut particle =
            Self::new(origin, destination, speed, ParticleStyle::for_attack(attack_type, size));
        particle.progress = rng.gen_range(0.0..SPAWN_PROGRESS_JITTER);
        particle.start = particle.progress;
        particle
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Interpolated position with a cosmetic sinusoidal wave on y
    ///
    /// The wave only moves the glyph; retirement looks at `progress`.
    pub fn position(&self, wave_amplitude: f64) -> Point {
        self.position_at(self.progress, wave_amplitude)
    }

    /// Positions of the last few frames, oldest first, tagged with their
    /// age in frames (1 is the previous frame)
    pub fn trail(&self, wave_amplitude: f64) -> impl Iterator<Item = (usize, Point)> + '_ {
        (1..=TRAIL_LENGTH)
            .rev()
            .map(move |age| (age, self.progress - age as f64 * self.speed))
            .filter(move |&(_, progress)| progress >= self.start)
            .map(move |(age, progress)| (age, self.position_at(progress, wave_amplitude)))
    }

    fn position_at(&self, progress: f64, wave_amplitude: f64) -> Point {
        let mut p = self.origin.lerp(&self.destination, progress);
        p.y += (progress * std::f64::consts::PI * 4.0).sin() * wave_amplitude;
        p
    }
}

/// Owned collection of live particles
///
/// Spawn inserts, retirement swap-removes. Nothing outside the arena
/// holds a reference to a particle, so retirement cannot dangle.
#[derive(Debug, Default)]
pub struct ParticleArena {
    particles: Vec<Particle>,
}

impl ParticleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Drop every particle immediately
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance every particle by its speed, then retire the completed ones
    ///
    /// Returns the number of particles retired on this call. A particle
    /// is advanced at most once per call and removed on the same call
    /// its progress reaches 1.0.
    pub fn advance_and_retire(&mut self) -> usize {
        if self.is_empty() {
            return 0;
        }
        for particle in &mut self.particles {
            particle.progress += particle.speed;
        }

        let mut retired = 0;
        let mut idx = 0;
        while idx < self.particles.len() {
            if self.particles[idx].is_complete() {
                self.particles.swap_remove(idx);
                retired += 1;
            } else {
                idx += 1;
            }
        }
        retired
    }
}
