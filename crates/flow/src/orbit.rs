use std::time::Duration;

use serde::Serialize;

use crate::carousel::GestureCarousel;

/// One node on the ring, in the presenter's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitNode {
    pub index: usize,
    /// Start angle plus current ring rotation, in degrees.
    pub angle_degrees: f64,
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

/// Facial-feature picker: `n` nodes evenly spaced on a circle, rotated by a
/// wrapped [`GestureCarousel`] so the active node comes to angle zero.
#[derive(Debug, Clone)]
pub struct OrbitalSelector {
    carousel: GestureCarousel,
    radius: f64,
    center: (f64, f64),
}

impl OrbitalSelector {
    pub fn new(node_count: usize, radius: f64, center: (f64, f64)) -> Self {
        Self {
            carousel: GestureCarousel::new(node_count),
            radius,
            center,
        }
    }

    pub fn with_snap_duration(mut self, duration: Duration) -> Self {
        self.carousel = self.carousel.with_snap_duration(duration);
        self
    }

    pub fn carousel(&self) -> &GestureCarousel {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut GestureCarousel {
        &mut self.carousel
    }

    pub fn node_count(&self) -> usize {
        self.carousel.item_count()
    }

    pub fn active_index(&self) -> usize {
        self.carousel.active_index()
    }

    /// Node click; same rules as [`GestureCarousel::jump_to`].
    pub fn select(&mut self, index: usize) -> bool {
        self.carousel.jump_to(index)
    }

    fn step_degrees(&self) -> f64 {
        match self.node_count() {
            0 => 0.0,
            n => 360.0 / n as f64,
        }
    }

    pub fn start_angle(&self, index: usize) -> f64 {
        self.step_degrees() * index as f64
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_for(self.carousel.offset())
    }

    /// Rotation `elapsed` into the current eased transition.
    pub fn rotation_at(&self, elapsed: Duration) -> f64 {
        self.rotation_for(self.carousel.offset_at(elapsed))
    }

    fn rotation_for(&self, offset: f64) -> f64 {
        offset / 100.0 * self.step_degrees()
    }

    pub fn node_position(&self, index: usize) -> (f64, f64) {
        self.position_at_angle(self.start_angle(index) + self.rotation_degrees())
    }

    fn position_at_angle(&self, degrees: f64) -> (f64, f64) {
        let radians = degrees.to_radians();
        (
            self.center.0 + self.radius * radians.cos(),
            self.center.1 + self.radius * radians.sin(),
        )
    }

    pub fn nodes(&self) -> Vec<OrbitNode> {
        let rotation = self.rotation_degrees();
        (0..self.node_count())
            .map(|index| {
                let angle = self.start_angle(index) + rotation;
                let (x, y) = self.position_at_angle(angle);
                OrbitNode {
                    index,
                    angle_degrees: angle,
                    x,
                    y,
                    active: index == self.active_index(),
                }
            })
            .collect()
    }
}
