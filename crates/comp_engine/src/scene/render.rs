//! Draw pass

use crate::components::{DrawContext, RenderSurface};
use crate::error::EngineResult;
use crate::foundation::collections::ObjectId;
use crate::scene::game_object::ObjectState;
use crate::scene::lifecycle::ComponentFlags;
use crate::scene::Scene;

impl Scene {
    /// Drawable reachable objects, sorted stably by z-index
    ///
    /// Objects with equal z-index keep their depth-first graph order.
    pub fn draw_order(&self) -> Vec<ObjectId> {
        let mut order: Vec<ObjectId> = self
            .walk()
            .into_iter()
            .filter(|id| self.objects.get(*id).is_some_and(|o| o.has_state(ObjectState::DRAWABLE)))
            .collect();
        order.sort_by_key(|id| self.objects.get(*id).map_or(0, |o| o.z_index()));
        order
    }

    /// Refresh absolute transforms, then run the draw hook of every live
    /// component of every drawable object in draw order
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) -> EngineResult<()> {
        self.refresh_transforms();

        for id in self.draw_order() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            let ctx = DrawContext::new(self, object);
            for component in &object.components {
                let Some(slot) = self.components.get(*component) else {
                    continue;
                };
                if !slot.flags.contains(ComponentFlags::INITIALIZED) || slot.flags.contains(ComponentFlags::FINISHED) {
                    continue;
                }
                if let Some(behavior) = slot.behavior.as_deref() {
                    behavior.on_draw(&ctx, surface)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::GameObject;

    fn object_with_z(tag: &str, z: i32) -> GameObject {
        let mut object = GameObject::new(tag);
        object.set_z_index(z);
        object
    }

    #[test]
    fn test_draw_order_is_stable_by_z_index() {
        let mut scene = Scene::default();
        let root = scene.root();
        scene.object_mut(root).unwrap().remove_state(ObjectState::DRAWABLE);
        let back = scene.add_global_object(object_with_z("back", 0)).unwrap();
        let front = scene.add_global_object(object_with_z("front", 5)).unwrap();
        let child = scene.add_child_object(front, object_with_z("child", 0)).unwrap();
        let hidden = scene.add_global_object(object_with_z("hidden", 1)).unwrap();
        scene.object_mut(hidden).unwrap().remove_state(ObjectState::DRAWABLE);

        assert_eq!(scene.draw_order(), vec![back, child, front]);
    }
}
