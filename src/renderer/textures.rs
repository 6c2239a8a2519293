//! Procedurally generated sprite textures
//!
//! Every image is built from distance functions in code, so the game ships
//! without image files. Output is deterministic.

use glam::Vec2;

/// Sizes of the generated images in pixels
pub const APPLE_SIZE: u32 = 64;
pub const BASKET_SIZE: (u32, u32) = (128, 32);
pub const BACKGROUND_SIZE: (u32, u32) = (256, 192);

/// Tightly packed RGBA8 pixels, row-major from the top-left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Fill an image by sampling `f(x, y)` at every pixel center in
    /// normalized `[0, 1]` coordinates
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(Vec2) -> [f32; 4]) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let uv = Vec2::new(
                    (x as f32 + 0.5) / width as f32,
                    (y as f32 + 0.5) / height as f32,
                );
                rgba.extend(f(uv).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Anti-aliased coverage from a signed distance (negative inside)
fn coverage(d: f32, feather: f32) -> f32 {
    (0.5 - d / feather).clamp(0.0, 1.0)
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Layer `top` with alpha `a` over `base`
fn over(base: [f32; 4], top: [f32; 3], a: f32) -> [f32; 4] {
    let rgb = mix([base[0], base[1], base[2]], top, a);
    [rgb[0], rgb[1], rgb[2], base[3] + a * (1.0 - base[3])]
}

fn apple_with(body: [f32; 3], highlight: [f32; 3], spots: bool) -> TextureImage {
    const FEATHER: f32 = 0.03;
    let center = Vec2::new(0.5, 0.56);
    TextureImage::from_fn(APPLE_SIZE, APPLE_SIZE, |p| {
        let mut px = [0.0; 4];

        // Stem and leaf sit behind the body
        let stem = (p.x - 0.5).abs().max((p.y - 0.12).abs() - 0.08) - 0.025;
        px = over(px, [0.35, 0.22, 0.1], coverage(stem, FEATHER));
        let leaf = sd_circle(p, Vec2::new(0.64, 0.12), 0.09).max(sd_circle(p, Vec2::new(0.56, 0.2), 0.09));
        px = over(px, [0.25, 0.6, 0.2], coverage(leaf, FEATHER));

        let body_d = sd_circle(p, center, 0.4);
        let shade = ((p - Vec2::new(0.38, 0.4)).length() / 0.5).clamp(0.0, 1.0);
        let mut color = mix(highlight, body, shade);
        if spots {
            let spot = sd_circle(p, Vec2::new(0.62, 0.62), 0.08)
                .min(sd_circle(p, Vec2::new(0.38, 0.72), 0.05))
                .min(sd_circle(p, Vec2::new(0.45, 0.48), 0.04));
            color = mix(color, [0.2, 0.15, 0.05], coverage(spot, FEATHER) * 0.8);
        }
        over(px, color, coverage(body_d, FEATHER))
    })
}

/// Fresh red apple
pub fn apple() -> TextureImage {
    apple_with([0.75, 0.08, 0.08], [1.0, 0.45, 0.4], false)
}

/// Brown, spotted apple
pub fn spoiled_apple() -> TextureImage {
    apple_with([0.4, 0.32, 0.12], [0.6, 0.55, 0.3], true)
}

/// Woven basket used for the paddle
pub fn basket() -> TextureImage {
    let (w, h) = BASKET_SIZE;
    TextureImage::from_fn(w, h, |p| {
        let base = [0.55, 0.36, 0.18];
        let dark = [0.35, 0.22, 0.1];
        let weave = ((p.x * 16.0).floor() as i32 + (p.y * 4.0).floor() as i32) % 2 == 0;
        let mut color = if weave { base } else { mix(base, dark, 0.5) };
        // Rim along the top edge
        if p.y < 0.18 {
            color = dark;
        }
        [color[0], color[1], color[2], 1.0]
    })
}

/// Sky gradient over a strip of grass
pub fn background() -> TextureImage {
    let (w, h) = BACKGROUND_SIZE;
    TextureImage::from_fn(w, h, |p| {
        let color = if p.y > 0.9 {
            mix([0.3, 0.6, 0.2], [0.2, 0.45, 0.15], (p.y - 0.9) / 0.1)
        } else {
            mix([0.45, 0.7, 0.95], [0.85, 0.93, 1.0], p.y / 0.9)
        };
        [color[0], color[1], color[2], 1.0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let img = apple();
        assert_eq!((img.width, img.height), (APPLE_SIZE, APPLE_SIZE));
        assert_eq!(img.rgba.len(), (APPLE_SIZE * APPLE_SIZE * 4) as usize);

        let img = basket();
        assert_eq!(img.rgba.len(), (BASKET_SIZE.0 * BASKET_SIZE.1 * 4) as usize);
    }

    #[test]
    fn test_apple_is_round() {
        let img = apple();
        // Corners are transparent, the middle is opaque
        assert_eq!(img.pixel(0, APPLE_SIZE - 1)[3], 0);
        assert_eq!(img.pixel(APPLE_SIZE - 1, APPLE_SIZE - 1)[3], 0);
        assert_eq!(img.pixel(APPLE_SIZE / 2, APPLE_SIZE * 3 / 5)[3], 255);
    }

    #[test]
    fn test_fresh_and_spoiled_differ() {
        let fresh = apple();
        let spoiled = spoiled_apple();
        let (x, y) = (APPLE_SIZE * 3 / 5, APPLE_SIZE * 3 / 5);
        assert!(fresh.pixel(x, y)[0] > spoiled.pixel(x, y)[0]);
    }

    #[test]
    fn test_background_is_opaque() {
        let img = background();
        assert!(img.rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(spoiled_apple(), spoiled_apple());
    }
}
