use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng};

use super::{fraction_left, Effect, LIFESPAN_FRAMES};
use crate::{
    config::VisualConfig,
    patterns::FrameInput,
    render::{Dimensions, Point, Surface},
};

/// Particles released per beat.
pub const BATCH_SIZE: usize = 5;
/// Speed range in pixels per frame.
pub const MIN_SPEED: f32 = 2.0;
pub const MAX_SPEED: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub angle: f32,
    pub speed: f32,
    pub size: f32,
    remaining: u16,
}

impl Particle {
    /// Fresh particle at `position` with full life.
    pub fn new(position: Point, angle: f32, speed: f32, size: f32) -> Self {
        Self {
            position,
            angle,
            speed,
            size,
            remaining: LIFESPAN_FRAMES,
        }
    }

    /// Life left in `0..=1`; also the draw opacity.
    pub fn life(&self) -> f32 {
        fraction_left(self.remaining)
    }

    /// Moves one frame along the heading and burns one frame of life.
    /// Returns whether the particle is still alive.
    fn step(&mut self) -> bool {
        let (sin, cos) = self.angle.sin_cos();
        self.position.x += cos * self.speed;
        self.position.y += sin * self.speed;
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }
}

/// Builds the particles released by one beat: a batch at the canvas centre
/// with random headings. Empty when particles are disabled.
pub fn spawn_particles<R: Rng>(
    dimensions: Dimensions,
    config: &VisualConfig,
    rng: &mut R,
) -> Vec<Particle> {
    if !config.particles_enabled {
        return Vec::new();
    }

    let center = dimensions.center();
    (0..BATCH_SIZE)
        .map(|_| {
            Particle::new(
                center,
                rng.random_range(0.0..TAU),
                rng.random_range(MIN_SPEED..MAX_SPEED),
                config.particle_size,
            )
        })
        .collect()
}

/// Advances every particle, draws the survivors and returns them in their
/// original order.
pub fn advance_particles<S: Surface + ?Sized>(
    surface: &mut S,
    mut particles: Vec<Particle>,
    config: &VisualConfig,
) -> Vec<Particle> {
    particles.retain_mut(|particle| {
        if !particle.step() {
            return false;
        }
        surface.fill_circle(particle.position, particle.size, config.color.with_alpha(particle.life()));
        true
    });
    particles
}

/// Live particle collection owned by the render loop.
#[derive(Debug, Default, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Adds `batch`, evicting the oldest particles beyond `cap`.
    pub fn absorb(&mut self, batch: Vec<Particle>, cap: usize) {
        self.particles.extend(batch);
        if self.particles.len() > cap {
            let overflow = self.particles.len() - cap;
            self.particles.drain(0..overflow);
        }
    }
}

impl Effect for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn enabled(&self, config: &VisualConfig) -> bool {
        config.particles_enabled
    }

    fn on_beat(&mut self, dimensions: Dimensions, config: &VisualConfig, rng: &mut StdRng) {
        let batch = spawn_particles(dimensions, config, rng);
        self.absorb(batch, config.particle_count as usize);
    }

    fn advance_and_render(
        &mut self,
        surface: &mut dyn Surface,
        _input: &FrameInput<'_>,
        config: &VisualConfig,
    ) {
        let live = std::mem::take(&mut self.particles);
        self.particles = advance_particles(surface, live, config);
    }

    fn live(&self) -> usize {
        self.particles.len()
    }

    fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn dims() -> Dimensions {
        Dimensions::new(800.0, 600.0)
    }

    #[test]
    fn spawns_a_centred_batch() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = spawn_particles(dims(), &VisualConfig::default(), &mut rng);

        assert_eq!(batch.len(), BATCH_SIZE);
        for particle in &batch {
            assert_eq!(particle.position, Point::new(400.0, 300.0));
            assert!((0.0..TAU).contains(&particle.angle));
            assert!((MIN_SPEED..MAX_SPEED).contains(&particle.speed));
            assert_eq!(particle.size, 3.0);
            assert_eq!(particle.life(), 1.0);
        }
    }

    #[test]
    fn disabled_particles_spawn_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = VisualConfig {
            particles_enabled: false,
            ..VisualConfig::default()
        };
        assert!(spawn_particles(dims(), &config, &mut rng).is_empty());
    }

    #[test]
    fn empties_in_exactly_fifty_frames() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = VisualConfig::default();
        let mut particles = spawn_particles(dims(), &config, &mut rng);
        let mut surface = DrawList::new();

        for frame in 1..=LIFESPAN_FRAMES {
            let before = particles.len();
            particles = advance_particles(&mut surface, particles, &config);
            assert!(particles.len() <= before);
            if frame < LIFESPAN_FRAMES {
                assert_eq!(particles.len(), BATCH_SIZE, "frame {frame}");
            }
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn draws_with_fading_alpha_and_moves_outwards() {
        let config = VisualConfig::default();
        let particle = Particle::new(Point::new(10.0, 10.0), 0.0, 4.0, 2.0);
        let mut surface = DrawList::new();
        let particles = advance_particles(&mut surface, vec![particle], &config);

        assert_eq!(particles[0].position, Point::new(14.0, 10.0));
        match &surface.commands()[0] {
            DrawCommand::FillCircle { center, radius, color } => {
                assert_eq!(*center, Point::new(14.0, 10.0));
                assert_eq!(*radius, 2.0);
                assert!((color.a - 0.98).abs() < 1e-6);
                assert_eq!(color.rgb(), config.color);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn field_respects_the_cap() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = VisualConfig {
            particle_count: 12,
            ..VisualConfig::default()
        };
        let mut field = ParticleField::new();
        for _ in 0..4 {
            field.on_beat(dims(), &config, &mut rng);
        }
        assert_eq!(field.live(), 12);

        field.clear();
        assert_eq!(field.live(), 0);
    }
}
