//! Scene positions

use serde::{Deserialize, Serialize};

/// A point in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal, along the truck route
    pub x: f64,
    /// Vertical
    pub y: f64,
    /// Depth
    pub z: f64,
}

impl Position {
    /// Create a new position
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation toward `target`; `t` is clamped to `0..=1`
    pub fn lerp(self, target: Position, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
            z: self.z + (target.z - self.z) * t,
        }
    }

    /// Euclidean distance
    pub fn distance(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_halfway() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(10.0, -4.0, 2.0);
        assert_eq!(a.lerp(b, 0.5), Position::new(5.0, -2.0, 1.0));
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Position::new(1.0, 1.0, 1.0);
        let b = Position::new(3.0, 3.0, 3.0);
        assert_eq!(a.lerp(b, 4.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(b), 5.0);
    }
}
