//! Sprite rendering
//!
//! The game only talks to [`SpriteRenderer`]; the WebGPU backend lives in
//! `pipeline`. Field coordinates put the origin at the top-left corner with
//! y growing downward.

pub mod pipeline;
pub mod textures;
pub mod vertex;

use glam::{Mat4, Vec2, Vec3};

use crate::resources::{self, ResourceError, ResourceManager, ShaderKind};
use crate::sim::GameState;
use crate::sim::triangle::triangle_projection;

pub use pipeline::{GpuRenderer, RenderInitError};
pub use textures::TextureImage;

/// Opaque handle to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Anything that can draw a textured quad
pub trait SpriteRenderer {
    /// Upload RGBA pixels and get a handle for later draws
    fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle;

    /// Draw one textured quad; `position` is the top-left corner
    fn draw_sprite(&mut self, texture: TextureHandle, position: Vec2, size: Vec2, rotation_deg: f32);
}

/// Draw one frame of the catch game: background, apple, basket
///
/// The apple texture is picked from `spoiled` on every call.
pub fn render_game<R: SpriteRenderer + ?Sized>(
    state: &GameState,
    resources: &ResourceManager,
    renderer: &mut R,
) -> Result<(), ResourceError> {
    resources.require_shader(resources::SPRITE_SHADER, ShaderKind::Sprite)?;

    let background = resources.texture(resources::BACKGROUND)?;
    renderer.draw_sprite(background, Vec2::ZERO, state.tuning.field, 0.0);

    let apple = if state.object.spoiled {
        resources.texture(resources::SPOILED_APPLE)?
    } else {
        resources.texture(resources::APPLE)?
    };
    renderer.draw_sprite(apple, state.object.pos, state.object.size(), 0.0);

    let player = resources.texture(resources::PLAYER)?;
    renderer.draw_sprite(player, state.paddle.pos, state.paddle.size, 0.0);

    Ok(())
}

/// Model matrix for a unit quad: move to `position`, rotate about the
/// quad's center, then scale to `size`
pub fn sprite_model(position: Vec2, size: Vec2, rotation_deg: f32) -> Mat4 {
    let half = (size * 0.5).extend(0.0);
    Mat4::from_translation(position.extend(0.0))
        * Mat4::from_translation(half)
        * Mat4::from_rotation_z(rotation_deg.to_radians())
        * Mat4::from_translation(-half)
        * Mat4::from_scale(Vec3::new(size.x, size.y, 1.0))
}

/// `ortho(0, w, h, 0, -1, 1)`: top-left origin, y down
pub fn field_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

/// Projection the pipeline behind a shader key draws with
pub fn projection_for(kind: ShaderKind, field: Vec2) -> Mat4 {
    match kind {
        ShaderKind::Sprite => field_projection(field.x, field.y),
        ShaderKind::Flat => triangle_projection(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::Tuning;

    /// Draw call captured by [`RecordingRenderer`]
    #[derive(Debug, Clone, PartialEq)]
    pub struct DrawCall {
        pub texture: TextureHandle,
        pub position: Vec2,
        pub size: Vec2,
        pub rotation_deg: f32,
    }

    /// Keeps uploads and draws in memory
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub uploads: Vec<(u32, u32)>,
        pub draws: Vec<DrawCall>,
    }

    impl SpriteRenderer for RecordingRenderer {
        fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle {
            self.uploads.push((image.width, image.height));
            TextureHandle(self.uploads.len() as u32 - 1)
        }

        fn draw_sprite(&mut self, texture: TextureHandle, position: Vec2, size: Vec2, rotation_deg: f32) {
            self.draws.push(DrawCall {
                texture,
                position,
                size,
                rotation_deg,
            });
        }
    }

    fn loaded() -> (ResourceManager, RecordingRenderer) {
        let mut renderer = RecordingRenderer::default();
        let mut resources = ResourceManager::new();
        resources.load_game_assets(&mut renderer);
        (resources, renderer)
    }

    #[test]
    fn test_render_order_and_geometry() {
        let (resources, mut renderer) = loaded();
        let state = GameState::new(Tuning::default(), 1);

        render_game(&state, &resources, &mut renderer).unwrap();

        let draws = &renderer.draws;
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].texture, resources.texture(resources::BACKGROUND).unwrap());
        assert_eq!(draws[0].size, state.tuning.field);
        assert_eq!(draws[1].texture, resources.texture(resources::APPLE).unwrap());
        assert_eq!(draws[1].position, state.object.pos);
        assert_eq!(draws[2].texture, resources.texture(resources::PLAYER).unwrap());
        assert_eq!(draws[2].position, state.paddle.pos);
    }

    #[test]
    fn test_spoiled_texture_follows_flag() {
        let (resources, mut renderer) = loaded();
        let mut state = GameState::new(Tuning::default(), 1);

        state.set_collisions(5);
        render_game(&state, &resources, &mut renderer).unwrap();
        assert_eq!(
            renderer.draws[1].texture,
            resources.texture(resources::SPOILED_APPLE).unwrap()
        );

        state.set_collisions(6);
        render_game(&state, &resources, &mut renderer).unwrap();
        assert_eq!(renderer.draws[4].texture, resources.texture(resources::APPLE).unwrap());
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let mut renderer = RecordingRenderer::default();
        let mut resources = ResourceManager::new();
        resources.load_shader(resources::SPRITE_SHADER, ShaderKind::Sprite);
        let state = GameState::new(Tuning::default(), 1);

        let err = render_game(&state, &resources, &mut renderer).unwrap_err();
        assert_eq!(err, ResourceError::MissingTexture(resources::BACKGROUND.to_string()));
        assert!(renderer.draws.is_empty());
    }

    #[test]
    fn test_sprite_shader_required_before_drawing() {
        let mut renderer = RecordingRenderer::default();
        let resources = ResourceManager::new();
        let state = GameState::new(Tuning::default(), 1);

        let err = render_game(&state, &resources, &mut renderer).unwrap_err();
        assert_eq!(err, ResourceError::MissingShader(resources::SPRITE_SHADER.to_string()));
        assert!(renderer.draws.is_empty());
    }

    #[test]
    fn test_projection_follows_shader_kind() {
        let field = Vec2::new(800.0, 600.0);
        let top = Vec3::new(0.0, 600.0, 0.0);
        // Sprites are y-down, the flat triangle pass is y-up
        let sprite = projection_for(ShaderKind::Sprite, field).project_point3(top);
        let flat = projection_for(ShaderKind::Flat, field).project_point3(top);
        assert!((sprite.y + 1.0).abs() < 1e-5);
        assert!((flat.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sprite_model_maps_unit_quad() {
        let model = sprite_model(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0), 0.0);
        let corner = model.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!(corner.truncate().abs_diff_eq(Vec2::new(40.0, 60.0), 1e-4));
    }

    #[test]
    fn test_sprite_model_rotates_about_center() {
        let model = sprite_model(Vec2::ZERO, Vec2::new(10.0, 10.0), 180.0);
        let origin = model.transform_point3(Vec3::ZERO);
        assert!(origin.truncate().abs_diff_eq(Vec2::new(10.0, 10.0), 1e-4));
    }

    #[test]
    fn test_field_projection_corners() {
        let proj = field_projection(800.0, 600.0);
        let top_left = proj.project_point3(Vec3::ZERO);
        let bottom_right = proj.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!(top_left.truncate().abs_diff_eq(Vec2::new(-1.0, 1.0), 1e-5));
        assert!(bottom_right.truncate().abs_diff_eq(Vec2::new(1.0, -1.0), 1e-5));
    }
}
