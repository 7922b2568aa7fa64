//! Render step: mesh dispatch onto an external drawing surface
//!
//! The engine does no drawing itself. [`BasicRenderer`] converts the owner's
//! mesh and absolute transform into pixel-space calls on a [`RenderSurface`]
//! supplied by the host (canvas, terminal, recorder in tests).

use crate::components::{Component, DrawContext};
use crate::error::{EngineError, EngineResult};
use crate::foundation::math::Vec2;
use crate::scene::{MeshShape, SpriteFrame, TextAlign, Transform};

/// Placement of one draw call, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Absolute position of the object
    pub position: Vec2,
    /// Rotation pivot relative to the position; content is drawn at `-origin`
    pub origin: Vec2,
    /// Absolute rotation (radians)
    pub rotation: f32,
    /// Width of the drawn content
    pub width: f32,
    /// Height of the drawn content
    pub height: f32,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
}

impl DrawParams {
    fn new(transform: &Transform, width: f32, height: f32, alpha: f32, unit_size: f32) -> Self {
        Self {
            position: transform.absolute_position() * unit_size,
            origin: transform.rotation_offset * unit_size,
            rotation: transform.absolute_rotation(),
            width: width * unit_size,
            height: height * unit_size,
            alpha,
        }
    }
}

/// Drawing backend implemented by the host
pub trait RenderSurface {
    /// Fill a rectangle
    fn fill_rect(&mut self, params: &DrawParams, fill: &str);

    /// Draw a text label
    fn fill_text(&mut self, params: &DrawParams, text: &str, font: &str, fill: &str, align: TextAlign);

    /// Draw an image, or a frame of it when `frame` is given
    fn draw_image(&mut self, params: &DrawParams, image: &str, frame: Option<&SpriteFrame>);
}

/// Draws the owner's mesh every frame
///
/// An empty mesh is a caller error: attach the renderer only to objects
/// that carry something to draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicRenderer;

impl BasicRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }
}

impl Component for BasicRenderer {
    fn on_draw(&self, ctx: &DrawContext<'_>, surface: &mut dyn RenderSurface) -> EngineResult<()> {
        let owner = ctx.owner();
        let mesh = &owner.mesh;
        let unit = ctx.unit_size();
        let transform = &owner.transform;

        match &mesh.shape {
            MeshShape::Empty => {
                return Err(EngineError::UnsupportedMesh {
                    tag: owner.tag().to_string(),
                });
            }
            MeshShape::Rect { fill } => {
                let params = DrawParams::new(transform, mesh.width, mesh.height, mesh.alpha, unit);
                surface.fill_rect(&params, fill);
            }
            MeshShape::Text { text, font, fill, align } => {
                let params = DrawParams::new(transform, mesh.width, mesh.height, mesh.alpha, unit);
                surface.fill_text(&params, text, font, fill, *align);
            }
            MeshShape::Image { image } => {
                let params = DrawParams::new(transform, mesh.width, mesh.height, mesh.alpha, unit);
                surface.draw_image(&params, image, None);
            }
            MeshShape::Sprite(frame) => {
                let params = DrawParams::new(transform, frame.width, frame.height, mesh.alpha, unit);
                surface.draw_image(&params, &frame.image, Some(frame));
            }
            MeshShape::SpriteCollection(sprites) => {
                for sprite in sprites {
                    let mut placed = sprite.transform.clone();
                    placed.update_absolute(Some(transform));
                    let params = DrawParams::new(&placed, sprite.frame.width, sprite.frame.height, mesh.alpha, unit);
                    surface.draw_image(&params, &sprite.frame.image, Some(&sprite.frame));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::{CollectionSprite, GameObject, Mesh, Scene};
    use approx::assert_relative_eq;

    /// Surface that records each call as a line of text
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) calls: Vec<String>,
        pub(crate) positions: Vec<Vec2>,
    }

    impl RenderSurface for RecordingSurface {
        fn fill_rect(&mut self, params: &DrawParams, fill: &str) {
            self.calls.push(format!("rect {}", fill));
            self.positions.push(params.position);
        }

        fn fill_text(&mut self, params: &DrawParams, text: &str, _font: &str, _fill: &str, _align: TextAlign) {
            self.calls.push(format!("text {}", text));
            self.positions.push(params.position);
        }

        fn draw_image(&mut self, params: &DrawParams, image: &str, frame: Option<&SpriteFrame>) {
            let kind = if frame.is_some() { "sprite" } else { "image" };
            self.calls.push(format!("{} {}", kind, image));
            self.positions.push(params.position);
        }
    }

    fn sprite(image: &str) -> SpriteFrame {
        SpriteFrame {
            image: image.to_string(),
            offset_x: 0.0,
            offset_y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn test_rect_in_pixels() {
        let mut scene = Scene::default();
        let mut object = GameObject::new("box");
        object.transform = Transform::from_position(2.0, 1.0);
        object.mesh = Mesh::rect("#ff0000", 1.0, 1.0);
        let id = scene.add_global_object(object).unwrap();
        scene.add_component(id, BasicRenderer::new()).unwrap();

        let mut surface = RecordingSurface::default();
        scene.draw(&mut surface).unwrap();
        assert_eq!(surface.calls, vec!["rect #ff0000"]);
        assert_relative_eq!(surface.positions[0].x, 200.0);
        assert_relative_eq!(surface.positions[0].y, 100.0);
    }

    #[test]
    fn test_sprite_collection_draws_each_sprite_relative_to_owner() {
        let mut scene = Scene::default();
        let mut object = GameObject::new("bubbles");
        object.transform = Transform::from_position(1.0, 0.0);
        object.mesh = Mesh::sprite_collection(vec![
            CollectionSprite {
                id: 1,
                frame: sprite("atlas"),
                transform: Transform::from_position(0.0, 1.0),
            },
            CollectionSprite {
                id: 2,
                frame: sprite("atlas"),
                transform: Transform::from_position(1.0, 1.0),
            },
        ]);
        let id = scene.add_global_object(object).unwrap();
        scene.add_component(id, BasicRenderer::new()).unwrap();

        let mut surface = RecordingSurface::default();
        scene.draw(&mut surface).unwrap();
        assert_eq!(surface.calls, vec!["sprite atlas", "sprite atlas"]);
        assert_relative_eq!(surface.positions[1].x, 200.0);
        assert_relative_eq!(surface.positions[1].y, 100.0);
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mut scene = Scene::default();
        let id = scene.add_global_object(GameObject::new("nothing")).unwrap();
        scene.add_component(id, BasicRenderer::new()).unwrap();

        let mut surface = RecordingSurface::default();
        let result = scene.draw(&mut surface);
        assert!(matches!(result, Err(EngineError::UnsupportedMesh { tag }) if tag == "nothing"));
    }
}
