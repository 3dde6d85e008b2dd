use super::spawner::Obstacle;
use super::Geometry;

/// Axis-aligned bounding box, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// The player's box for a given left edge. The player rests on the bottom edge.
pub fn player_bounds(x: f64, geometry: &Geometry) -> Aabb {
    Aabb::new(
        x,
        geometry.screen_height - geometry.player_height,
        geometry.player_width,
        geometry.player_height,
    )
}

/// First obstacle, in creation order, whose box overlaps `player` at time `now`.
pub fn first_hit<'a>(
    player: &Aabb,
    obstacles: &'a [Obstacle],
    now: u64,
    geometry: &Geometry,
) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|obstacle| player.overlaps(&obstacle.bounds(now, geometry)))
}
