//! Hello-triangle mover
//!
//! One triangle in an 800x600 field with y growing upward. A held direction
//! key moves it 2 px per frame and turns it to face the direction of travel.

use glam::{Mat4, Vec2, Vec3};

use crate::input::{Key, KeyAction};

/// Field size of the triangle demo
pub const TRIANGLE_FIELD: Vec2 = Vec2::new(800.0, 600.0);
/// Pixels moved per frame
pub const TRIANGLE_STEP: f32 = 2.0;
/// Triangle vertices in model space
pub const TRIANGLE_VERTICES: [[f32; 2]; 3] = [[0.0, 0.0], [100.0, 0.0], [50.0, 50.0]];
/// Fill color
pub const TRIANGLE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Background color
pub const TRIANGLE_CLEAR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Stop,
}

impl Heading {
    fn offset(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::new(0.0, TRIANGLE_STEP),
            Heading::Down => Vec2::new(0.0, -TRIANGLE_STEP),
            Heading::Left => Vec2::new(-TRIANGLE_STEP, 0.0),
            Heading::Right => Vec2::new(TRIANGLE_STEP, 0.0),
            Heading::Stop => Vec2::ZERO,
        }
    }

    /// Facing angle in degrees, `None` for `Stop`
    fn angle(self) -> Option<f32> {
        match self {
            Heading::Up => Some(0.0),
            Heading::Left => Some(90.0),
            Heading::Down => Some(180.0),
            Heading::Right => Some(270.0),
            Heading::Stop => None,
        }
    }
}

/// Triangle position, facing, and current heading
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMover {
    pub pos: Vec2,
    pub angle_deg: f32,
    pub heading: Heading,
    pub close_requested: bool,
}

impl Default for TriangleMover {
    fn default() -> Self {
        Self {
            pos: TRIANGLE_FIELD / 2.0,
            angle_deg: 0.0,
            heading: Heading::Stop,
            close_requested: false,
        }
    }
}

impl TriangleMover {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a key event
    pub fn on_key(&mut self, key: Key, action: KeyAction) {
        if key == Key::Escape && action == KeyAction::Press {
            self.close_requested = true;
        }

        match action {
            // Held keys auto-repeat; only a release or another key stops
            KeyAction::Repeat => {}
            KeyAction::Press => {
                self.heading = match key {
                    Key::Up => Heading::Up,
                    Key::Down => Heading::Down,
                    Key::Left => Heading::Left,
                    Key::Right => Heading::Right,
                    _ => Heading::Stop,
                };
            }
            KeyAction::Release => self.heading = Heading::Stop,
        }
    }

    /// Advance one frame
    pub fn step(&mut self) {
        self.pos += self.heading.offset();
        if let Some(angle) = self.heading.angle() {
            self.angle_deg = angle;
        }
    }

    /// `translate(x, y, 0) * rotate_z(angle)`
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pos.x, self.pos.y, 0.0))
            * Mat4::from_rotation_z(self.angle_deg.to_radians())
    }

    /// Triangle corners in field coordinates
    pub fn world_vertices(&self) -> [Vec2; 3] {
        let model = self.model_matrix();
        TRIANGLE_VERTICES.map(|[x, y]| model.transform_point3(Vec3::new(x, y, 0.0)).truncate())
    }
}

/// `ortho(0, 800, 0, 600, -1, 1)` with y up
pub fn triangle_projection() -> Mat4 {
    Mat4::orthographic_rh(0.0, TRIANGLE_FIELD.x, 0.0, TRIANGLE_FIELD.y, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centered_and_still() {
        let mut mover = TriangleMover::new();
        mover.step();
        assert_eq!(mover.pos, Vec2::new(400.0, 300.0));
        assert_eq!(mover.heading, Heading::Stop);
    }

    #[test]
    fn test_move_up_three_frames() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Up, KeyAction::Press);
        for _ in 0..3 {
            mover.step();
        }
        assert_eq!(mover.pos, Vec2::new(400.0, 306.0));
        assert_eq!(mover.angle_deg, 0.0);
    }

    #[test]
    fn test_release_stops_but_keeps_facing() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Right, KeyAction::Press);
        mover.step();
        mover.on_key(Key::Right, KeyAction::Release);
        mover.step();
        assert_eq!(mover.pos, Vec2::new(402.0, 300.0));
        assert_eq!(mover.angle_deg, 270.0);
        assert_eq!(mover.heading, Heading::Stop);
    }

    #[test]
    fn test_repeat_keeps_heading() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Left, KeyAction::Press);
        mover.on_key(Key::Left, KeyAction::Repeat);
        mover.step();
        assert_eq!(mover.heading, Heading::Left);
        assert_eq!(mover.angle_deg, 90.0);
        assert_eq!(mover.pos, Vec2::new(398.0, 300.0));
    }

    #[test]
    fn test_held_key_repeats_do_not_stop_like_release() {
        let mut held = TriangleMover::new();
        held.on_key(Key::Up, KeyAction::Press);
        for _ in 0..30 {
            held.on_key(Key::Up, KeyAction::Repeat);
            held.step();
        }
        assert_eq!(held.heading, Heading::Up);
        assert_eq!(held.pos, Vec2::new(400.0, 360.0));

        let mut released = TriangleMover::new();
        released.on_key(Key::Up, KeyAction::Press);
        released.on_key(Key::Up, KeyAction::Release);
        released.step();
        assert_eq!(released.heading, Heading::Stop);
        assert_eq!(released.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_other_key_press_stops() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Down, KeyAction::Press);
        mover.on_key(Key::Launch, KeyAction::Press);
        assert_eq!(mover.heading, Heading::Stop);
    }

    #[test]
    fn test_escape_requests_close() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Escape, KeyAction::Press);
        assert!(mover.close_requested);
    }

    #[test]
    fn test_world_vertices_rotate() {
        let mut mover = TriangleMover::new();
        mover.on_key(Key::Left, KeyAction::Press);
        mover.step();
        let [a, b, _] = mover.world_vertices();
        assert!(a.abs_diff_eq(Vec2::new(398.0, 300.0), 1e-3));
        // (100, 0) rotated 90 degrees counter-clockwise
        assert!(b.abs_diff_eq(Vec2::new(398.0, 400.0), 1e-3));
    }
}
