//! Mesh payload carried by game objects
//!
//! The scene core treats the mesh as opaque data; only the render step looks
//! inside. Variants are a closed sum type so the renderer dispatches with an
//! exhaustive match.

use crate::scene::transform::Transform;

/// Text alignment for text meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Anchor at the left edge
    #[default]
    Left,
    /// Anchor at the center
    Center,
    /// Anchor at the right edge
    Right,
}

/// One frame of a sprite sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    /// Key of the source image, resolved by the render surface
    pub image: String,
    /// Horizontal offset inside the image (pixels)
    pub offset_x: f32,
    /// Vertical offset inside the image (pixels)
    pub offset_y: f32,
    /// Width in units
    pub width: f32,
    /// Height in units
    pub height: f32,
}

/// Sprite placed inside a sprite collection, with its own transform
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSprite {
    /// Identifier of the sprite inside the collection
    pub id: u32,
    /// Sprite frame
    pub frame: SpriteFrame,
    /// Transform of the sprite; absolute values are computed against the owner
    pub transform: Transform,
}

/// Shape of a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum MeshShape {
    /// No drawable content
    Empty,
    /// Filled rectangle
    Rect {
        /// Fill style understood by the render surface (e.g. `#00000055`)
        fill: String,
    },
    /// Text label
    Text {
        /// Text content
        text: String,
        /// Font description
        font: String,
        /// Fill style
        fill: String,
        /// Alignment
        align: TextAlign,
    },
    /// Whole image
    Image {
        /// Key of the image
        image: String,
    },
    /// Single frame of a sprite sheet
    Sprite(SpriteFrame),
    /// Several sprites drawn with one object
    SpriteCollection(Vec<CollectionSprite>),
}

/// Mesh payload: a shape plus size and opacity
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Shape to draw
    pub shape: MeshShape,
    /// Width in units
    pub width: f32,
    /// Height in units
    pub height: f32,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mesh {
    /// Mesh without drawable content
    pub fn empty() -> Self {
        Self {
            shape: MeshShape::Empty,
            width: 0.0,
            height: 0.0,
            alpha: 1.0,
        }
    }

    /// Filled rectangle
    pub fn rect(fill: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            shape: MeshShape::Rect { fill: fill.into() },
            width,
            height,
            alpha: 1.0,
        }
    }

    /// Text label
    pub fn text(text: impl Into<String>, font: impl Into<String>, fill: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            shape: MeshShape::Text {
                text: text.into(),
                font: font.into(),
                fill: fill.into(),
                align: TextAlign::Left,
            },
            width,
            height,
            alpha: 1.0,
        }
    }

    /// Whole image of the given size in units
    pub fn image(image: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            shape: MeshShape::Image { image: image.into() },
            width,
            height,
            alpha: 1.0,
        }
    }

    /// Single sprite frame
    pub fn sprite(frame: SpriteFrame) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            shape: MeshShape::Sprite(frame),
            alpha: 1.0,
        }
    }

    /// Collection of independently placed sprites
    pub fn sprite_collection(sprites: Vec<CollectionSprite>) -> Self {
        Self {
            shape: MeshShape::SpriteCollection(sprites),
            width: 0.0,
            height: 0.0,
            alpha: 1.0,
        }
    }

    /// Builder pattern: Set opacity
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Check whether the mesh has drawable content
    pub fn is_empty(&self) -> bool {
        matches!(self.shape, MeshShape::Empty)
    }
}
