//! Drifting particle background.
//!
//! Particles bounce off the window edges, scatter away from the pointer, and
//! are joined by fading lines when close to each other.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One particle per this many square pixels.
const AREA_PER_PARTICLE: f32 = 12_000.0;
/// Pointer influence radius in pixels.
pub const POINTER_RADIUS: f32 = 120.0;
/// Pixels a particle is pushed per frame while near the pointer.
const PUSH: f32 = 3.0;
/// Keep-out margin used when pushing particles.
const EDGE: f32 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x:     f32,
    pub y:     f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub size:  f32,
}

impl Particle {
    fn step(&mut self, width: f32, height: f32, pointer: Option<(f32, f32)>) {
        if self.x > width  || self.x < 0.0 { self.dir_x = -self.dir_x; }
        if self.y > height || self.y < 0.0 { self.dir_y = -self.dir_y; }

        if let Some((px, py)) = pointer {
            let dx = px - self.x;
            let dy = py - self.y;
            if (dx * dx + dy * dy).sqrt() < POINTER_RADIUS + self.size {
                if px < self.x && self.x < width - EDGE  { self.x += PUSH; }
                if px > self.x && self.x > EDGE          { self.x -= PUSH; }
                if py < self.y && self.y < height - EDGE { self.y += PUSH; }
                if py > self.y && self.y > EDGE          { self.y -= PUSH; }
            }
        }

        self.x += self.dir_x;
        self.y += self.dir_y;
    }
}

/// A line between two close particles.  `opacity` may be ≤ 0 for far pairs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a:       usize,
    pub b:       usize,
    pub opacity: f32,
}

#[derive(Debug)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub width:     f32,
    pub height:    f32,
    pointer:       Option<(f32, f32)>,
    rng:           StdRng,
}

impl ParticleField {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    /// Deterministic field for tests.
    pub fn seeded(width: usize, height: usize, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: usize, height: usize, rng: StdRng) -> Self {
        let mut field = ParticleField {
            particles: Vec::new(),
            width:     width as f32,
            height:    height as f32,
            pointer:   None,
            rng,
        };
        field.populate();
        field
    }

    fn populate(&mut self) {
        let count = (self.width * self.height / AREA_PER_PARTICLE) as usize;
        let (w, h) = (self.width.max(1.0), self.height.max(1.0));
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                size:  rng.gen_range(1.0..3.0),
                x:     rng.gen_range(0.0..w),
                y:     rng.gen_range(0.0..h),
                dir_x: rng.gen_range(-0.2..0.2),
                dir_y: rng.gen_range(-0.2..0.2),
            })
            .collect();
    }

    /// Pointer position in window pixels, or `None` when it leaves.
    pub fn set_pointer(&mut self, pointer: Option<(f32, f32)>) {
        self.pointer = pointer;
    }

    pub fn tick(&mut self) {
        let (w, h, pointer) = (self.width, self.height, self.pointer);
        for p in &mut self.particles {
            p.step(w, h, pointer);
        }
    }

    /// Pairs closer than a seventh of the window in each dimension.
    pub fn links(&self) -> Vec<Link> {
        let limit = (self.width / 7.0) * (self.height / 7.0);
        let mut out = Vec::new();
        for (a, pa) in self.particles.iter().enumerate() {
            for (b, pb) in self.particles.iter().enumerate().skip(a + 1) {
                let d2 = (pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2);
                if d2 < limit {
                    out.push(Link { a, b, opacity: 1.0 - d2 / 20_000.0 });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f32, y: f32, dir_x: f32, dir_y: f32) -> Particle {
        Particle { x, y, dir_x, dir_y, size: 2.0 }
    }

    #[test]
    fn density_follows_area() {
        let field = ParticleField::seeded(1200, 1000, 1);
        assert_eq!(field.particles.len(), 100);
        for p in &field.particles {
            assert!((1.0..3.0).contains(&p.size));
            assert!(p.dir_x.abs() <= 0.2 && p.dir_y.abs() <= 0.2);
        }
    }

    #[test]
    fn seeded_fields_match() {
        let a = ParticleField::seeded(640, 480, 7);
        let b = ParticleField::seeded(640, 480, 7);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn bounces_off_right_edge() {
        let mut p = particle(101.0, 50.0, 0.2, 0.0);
        p.step(100.0, 100.0, None);
        assert!(p.dir_x < 0.0);
        assert!(p.x < 101.0);
    }

    #[test]
    fn pointer_pushes_particle_away() {
        let mut p = particle(200.0, 200.0, 0.0, 0.0);
        p.step(400.0, 400.0, Some((190.0, 210.0)));
        assert_eq!((p.x, p.y), (203.0, 197.0));

        let mut far = particle(200.0, 200.0, 0.0, 0.0);
        far.step(400.0, 400.0, Some((0.0, 0.0)));
        assert_eq!((far.x, far.y), (200.0, 200.0));
    }

    #[test]
    fn close_pairs_link_with_fading_opacity() {
        let mut field = ParticleField::seeded(700, 700, 3);
        field.particles = vec![
            particle(0.0, 0.0, 0.0, 0.0),
            particle(30.0, 40.0, 0.0, 0.0),
            particle(600.0, 600.0, 0.0, 0.0),
        ];
        let links = field.links();
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].a, links[0].b), (0, 1));
        assert!((links[0].opacity - (1.0 - 2500.0 / 20_000.0)).abs() < 1e-6);
    }

    #[test]
    fn small_window_gets_few_particles() {
        assert_eq!(ParticleField::seeded(120, 100, 9).particles.len(), 1);
        assert!(ParticleField::seeded(100, 100, 9).particles.is_empty());
    }
}
