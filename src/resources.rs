//! String-keyed registry of loaded textures and shaders

use std::collections::HashMap;

use crate::renderer::{SpriteRenderer, TextureHandle, TextureImage, textures};

/// Texture keys used by the catch game
pub const BACKGROUND: &str = "background";
pub const APPLE: &str = "apple";
pub const SPOILED_APPLE: &str = "s_apple";
pub const PLAYER: &str = "player";
/// Shader keys
pub const SPRITE_SHADER: &str = "sprite";
pub const FLAT_SHADER: &str = "flat";

/// Which render pipeline a shader key selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    /// Textured, alpha-blended quads
    Sprite,
    /// Per-vertex color
    Flat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("Texture '{0}' was never loaded")]
    MissingTexture(String),

    #[error("Shader '{0}' was never loaded")]
    MissingShader(String),

    #[error("Shader '{name}' is a {found:?} shader, expected {expected:?}")]
    WrongShader {
        name: String,
        expected: ShaderKind,
        found: ShaderKind,
    },
}

/// Maps names to handles returned by the renderer
#[derive(Debug, Default)]
pub struct ResourceManager {
    textures: HashMap<String, TextureHandle>,
    shaders: HashMap<String, ShaderKind>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload `image` and register it under `name`, replacing any previous entry
    pub fn load_texture<R: SpriteRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        image: &TextureImage,
        name: &str,
    ) -> TextureHandle {
        let handle = renderer.upload_texture(image);
        if self.textures.insert(name.to_string(), handle).is_some() {
            log::debug!("Texture '{}' replaced", name);
        }
        handle
    }

    pub fn texture(&self, name: &str) -> Result<TextureHandle, ResourceError> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::MissingTexture(name.to_string()))
    }

    pub fn load_shader(&mut self, name: &str, kind: ShaderKind) {
        self.shaders.insert(name.to_string(), kind);
    }

    pub fn shader(&self, name: &str) -> Result<ShaderKind, ResourceError> {
        self.shaders
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::MissingShader(name.to_string()))
    }

    /// Look up `name` and check it selects the `expected` pipeline
    pub fn require_shader(&self, name: &str, expected: ShaderKind) -> Result<(), ResourceError> {
        match self.shader(name)? {
            found if found == expected => Ok(()),
            found => Err(ResourceError::WrongShader {
                name: name.to_string(),
                expected,
                found,
            }),
        }
    }

    /// Load everything the catch game draws with
    pub fn load_game_assets<R: SpriteRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.load_shader(SPRITE_SHADER, ShaderKind::Sprite);
        self.load_texture(renderer, &textures::background(), BACKGROUND);
        self.load_texture(renderer, &textures::spoiled_apple(), SPOILED_APPLE);
        self.load_texture(renderer, &textures::apple(), APPLE);
        self.load_texture(renderer, &textures::basket(), PLAYER);
        log::info!("Loaded {} textures", self.textures.len());
    }

    /// The hello triangle draws untextured, so it only needs its shader
    pub fn load_triangle_assets(&mut self) {
        self.load_shader(FLAT_SHADER, ShaderKind::Flat);
    }
}
