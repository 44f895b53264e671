//! Scene model: layers, shapes, and the mutation contract.
//!
//! The scene is the single owner of all shapes. Mutations are atomic: an
//! operation either succeeds (and bumps the scene version) or returns a
//! `SceneError` and leaves the scene untouched.

use crate::shapes::{GeometryPatch, LayerId, Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Scene mutation errors. All are local precondition violations; the scene
/// is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("layer {0} does not exist or is locked")]
    InvalidLayer(LayerId),
    #[error("layer {0} is locked")]
    LayerLocked(LayerId),
    #[error("shape {0} does not exist")]
    UnknownShape(ShapeId),
    #[error("layer {0} does not exist")]
    UnknownLayer(LayerId),
    #[error("cannot remove the last layer")]
    LastLayer,
}

/// An ordered, independently visible and lockable grouping of shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Visibility affects the read projection only.
    pub visible: bool,
    /// Locking denies mutation of the layer's shapes; selection stays allowed.
    pub locked: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}

/// The full set of layers and shapes for one drawing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Layers in z-order (insertion order significant).
    layers: Vec<Layer>,
    /// All shapes, keyed by id.
    shapes: HashMap<ShapeId, Shape>,
    /// Draw order of shapes (back to front).
    draw_order: Vec<ShapeId>,
    /// The layer new shapes land on.
    active_layer: LayerId,
    /// Change counter for renderer/broadcaster snapshot invalidation.
    version: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene seeded with two visible, unlocked layers, the first
    /// one active.
    pub fn new() -> Self {
        let layers = vec![Layer::new("Layer 1"), Layer::new("Layer 2")];
        let active_layer = layers[0].id;
        Self {
            layers,
            shapes: HashMap::new(),
            draw_order: Vec::new(),
            active_layer,
            version: 0,
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Monotonic change counter. Valid as a snapshot only until the next
    /// event callback.
    pub fn version(&self) -> u64 {
        self.version
    }

    // --- Layer operations ---

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    pub fn is_layer_locked(&self, id: LayerId) -> bool {
        self.layer(id).is_some_and(|l| l.locked)
    }

    /// Append a new layer and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.layers.push(layer);
        self.active_layer = id;
        self.touch();
        log::debug!("added layer {id}");
        id
    }

    /// Remove a layer, cascading deletion of its shapes. Removing the sole
    /// remaining layer is rejected with `LastLayer`.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<(), SceneError> {
        if self.layer(id).is_none() {
            return Err(SceneError::UnknownLayer(id));
        }
        if self.layers.len() == 1 {
            return Err(SceneError::LastLayer);
        }
        self.layers.retain(|l| l.id != id);
        let doomed: Vec<ShapeId> = self
            .shapes
            .values()
            .filter(|s| s.layer() == id)
            .map(|s| s.id())
            .collect();
        for shape_id in &doomed {
            self.shapes.remove(shape_id);
        }
        self.draw_order.retain(|sid| !doomed.contains(sid));
        if self.active_layer == id {
            // First remaining layer by order becomes active.
            self.active_layer = self.layers[0].id;
        }
        self.touch();
        log::debug!("removed layer {id} and {} shapes", doomed.len());
        Ok(())
    }

    /// Make a layer active. Selecting a locked layer is allowed; mutation
    /// on it is still denied.
    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), SceneError> {
        if self.layer(id).is_none() {
            return Err(SceneError::UnknownLayer(id));
        }
        self.active_layer = id;
        self.touch();
        Ok(())
    }

    pub fn toggle_layer_visibility(&mut self, id: LayerId) -> Result<(), SceneError> {
        let layer = self.layer_mut(id).ok_or(SceneError::UnknownLayer(id))?;
        layer.visible = !layer.visible;
        self.touch();
        Ok(())
    }

    pub fn toggle_layer_lock(&mut self, id: LayerId) -> Result<(), SceneError> {
        let layer = self.layer_mut(id).ok_or(SceneError::UnknownLayer(id))?;
        layer.locked = !layer.locked;
        self.touch();
        Ok(())
    }

    // --- Shape operations ---

    /// Insert a shape. Fails with `InvalidLayer` if the shape's layer does
    /// not exist or is locked.
    pub fn create_shape(&mut self, shape: Shape) -> Result<ShapeId, SceneError> {
        let layer = shape.layer();
        match self.layer(layer) {
            None => return Err(SceneError::InvalidLayer(layer)),
            Some(l) if l.locked => return Err(SceneError::InvalidLayer(layer)),
            Some(_) => {}
        }
        let id = shape.id();
        self.draw_order.push(id);
        self.shapes.insert(id, shape);
        self.touch();
        log::debug!("created shape {id} on layer {layer}");
        Ok(id)
    }

    /// Merge a partial geometry patch into a shape.
    pub fn update_shape_geometry(
        &mut self,
        id: ShapeId,
        patch: &GeometryPatch,
    ) -> Result<(), SceneError> {
        let layer = self
            .shapes
            .get(&id)
            .ok_or(SceneError::UnknownShape(id))?
            .layer();
        if self.is_layer_locked(layer) {
            return Err(SceneError::LayerLocked(layer));
        }
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.apply_patch(patch);
        }
        self.touch();
        Ok(())
    }

    /// Translate a shape by a delta. Same preconditions as a geometry patch.
    pub fn translate_shape(&mut self, id: ShapeId, delta: Vec2) -> Result<(), SceneError> {
        let layer = self
            .shapes
            .get(&id)
            .ok_or(SceneError::UnknownShape(id))?
            .layer();
        if self.is_layer_locked(layer) {
            return Err(SceneError::LayerLocked(layer));
        }
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.translate(delta);
        }
        self.touch();
        Ok(())
    }

    /// Remove a shape and return it.
    ///
    /// No lock check: removal also backs gesture cancellation, which must
    /// succeed even if the layer was locked mid-gesture.
    pub fn remove_shape(&mut self, id: ShapeId) -> Result<Shape, SceneError> {
        let shape = self.shapes.remove(&id).ok_or(SceneError::UnknownShape(id))?;
        self.draw_order.retain(|&sid| sid != id);
        self.touch();
        Ok(shape)
    }

    /// Replace-or-insert a full shape snapshot (last-writer-wins).
    ///
    /// This is the remote application path: the edit was validated at its
    /// origin, so lock checks are skipped. A snapshot referencing a layer
    /// unknown locally is reattached to the active layer.
    pub fn upsert_shape(&mut self, mut shape: Shape) {
        if self.layer(shape.layer()).is_none() {
            log::debug!(
                "shape {} references unknown layer {}, reattaching to active layer",
                shape.id(),
                shape.layer()
            );
            shape.set_layer(self.active_layer);
        }
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.draw_order.push(id);
        }
        self.touch();
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes in draw order (back to front), skipping invisible layers.
    /// This is the renderer's read projection.
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.draw_order
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .filter(|s| self.layer(s.layer()).is_some_and(|l| l.visible))
    }

    /// Shapes hit by a point, front to back (selection priority order).
    /// Shapes on invisible layers are not hit.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.draw_order
            .iter()
            .rev()
            .filter_map(|&id| self.shapes.get(&id))
            .filter(|s| self.layer(s.layer()).is_some_and(|l| l.visible))
            .filter(|s| s.hit_test(point, tolerance))
            .map(|s| s.id())
            .collect()
    }

    /// Serialize the scene to JSON (full-scene resync is the host's job;
    /// this is the snapshot it ships).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Ellipse, Rectangle};

    fn rect_on(scene: &Scene) -> Shape {
        Shape::Rectangle(Rectangle::new(
            scene.active_layer(),
            Point::new(0.0, 0.0),
            10.0,
            10.0,
        ))
    }

    #[test]
    fn test_new_scene_has_two_layers() {
        let scene = Scene::new();
        assert_eq!(scene.layers().len(), 2);
        assert_eq!(scene.active_layer(), scene.layers()[0].id);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_create_shape_bumps_version() {
        let mut scene = Scene::new();
        let v0 = scene.version();
        let id = scene.create_shape(rect_on(&scene)).unwrap();
        assert!(scene.version() > v0);
        assert!(scene.shape(id).is_some());
    }

    #[test]
    fn test_create_shape_unknown_layer() {
        let mut scene = Scene::new();
        let bogus = Uuid::new_v4();
        let shape = Shape::Rectangle(Rectangle::new(bogus, Point::ZERO, 10.0, 10.0));
        assert_eq!(
            scene.create_shape(shape),
            Err(SceneError::InvalidLayer(bogus))
        );
        assert!(scene.is_empty());
    }

    #[test]
    fn test_create_shape_locked_layer() {
        let mut scene = Scene::new();
        let layer = scene.active_layer();
        scene.toggle_layer_lock(layer).unwrap();
        assert_eq!(
            scene.create_shape(rect_on(&scene)),
            Err(SceneError::InvalidLayer(layer))
        );
    }

    #[test]
    fn test_update_unknown_shape() {
        let mut scene = Scene::new();
        let bogus = Uuid::new_v4();
        assert_eq!(
            scene.update_shape_geometry(bogus, &GeometryPatch::default()),
            Err(SceneError::UnknownShape(bogus))
        );
    }

    #[test]
    fn test_update_on_locked_layer() {
        let mut scene = Scene::new();
        let layer = scene.active_layer();
        let id = scene.create_shape(rect_on(&scene)).unwrap();
        scene.toggle_layer_lock(layer).unwrap();
        assert_eq!(
            scene.update_shape_geometry(id, &GeometryPatch::radius(5.0)),
            Err(SceneError::LayerLocked(layer))
        );
        assert_eq!(
            scene.translate_shape(id, Vec2::new(1.0, 1.0)),
            Err(SceneError::LayerLocked(layer))
        );
    }

    #[test]
    fn test_remove_last_layer_rejected() {
        let mut scene = Scene::new();
        let ids: Vec<LayerId> = scene.layers().iter().map(|l| l.id).collect();
        scene.remove_layer(ids[0]).unwrap();
        assert_eq!(scene.remove_layer(ids[1]), Err(SceneError::LastLayer));
        assert_eq!(scene.layers().len(), 1);
    }

    #[test]
    fn test_remove_layer_cascades_and_reassigns_active() {
        let mut scene = Scene::new();
        let first = scene.active_layer();
        scene.create_shape(rect_on(&scene)).unwrap();
        scene.create_shape(rect_on(&scene)).unwrap();
        assert_eq!(scene.shape_count(), 2);

        scene.remove_layer(first).unwrap();
        assert_eq!(scene.shape_count(), 0);
        assert_eq!(scene.active_layer(), scene.layers()[0].id);
    }

    #[test]
    fn test_set_active_layer() {
        let mut scene = Scene::new();
        let second = scene.layers()[1].id;
        scene.toggle_layer_lock(second).unwrap();
        // Selecting a locked layer is allowed.
        scene.set_active_layer(second).unwrap();
        assert_eq!(scene.active_layer(), second);

        let bogus = Uuid::new_v4();
        assert_eq!(
            scene.set_active_layer(bogus),
            Err(SceneError::UnknownLayer(bogus))
        );
        assert_eq!(scene.active_layer(), second);
    }

    #[test]
    fn test_toggle_visibility_hides_from_projection() {
        let mut scene = Scene::new();
        let layer = scene.active_layer();
        scene.create_shape(rect_on(&scene)).unwrap();
        assert_eq!(scene.shapes_ordered().count(), 1);
        scene.toggle_layer_visibility(layer).unwrap();
        assert_eq!(scene.shapes_ordered().count(), 0);
        assert!(scene.shapes_at_point(Point::new(5.0, 5.0), 0.0).is_empty());
        scene.toggle_layer_visibility(layer).unwrap();
        assert_eq!(scene.shapes_ordered().count(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut scene = Scene::new();
        let circle = Ellipse::new(scene.active_layer(), Point::new(0.0, 0.0), 10.0);
        let id = circle.id;
        scene.upsert_shape(Shape::Ellipse(circle.clone()));
        assert_eq!(scene.shape_count(), 1);

        let mut bigger = circle;
        bigger.radius = 50.0;
        scene.upsert_shape(Shape::Ellipse(bigger));
        assert_eq!(scene.shape_count(), 1);
        match scene.shape(id).unwrap() {
            Shape::Ellipse(e) => assert!((e.radius - 50.0).abs() < f64::EPSILON),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_upsert_unknown_layer_reattaches() {
        let mut scene = Scene::new();
        let foreign_layer = Uuid::new_v4();
        let shape = Shape::Rectangle(Rectangle::new(foreign_layer, Point::ZERO, 5.0, 5.0));
        let id = shape.id();
        scene.upsert_shape(shape);
        assert_eq!(scene.shape(id).unwrap().layer(), scene.active_layer());
    }

    #[test]
    fn test_shapes_at_point_front_first() {
        let mut scene = Scene::new();
        let back = scene.create_shape(rect_on(&scene)).unwrap();
        let front = scene.create_shape(rect_on(&scene)).unwrap();
        let hits = scene.shapes_at_point(Point::new(5.0, 5.0), 0.0);
        assert_eq!(hits, vec![front, back]);
    }

    #[test]
    fn test_scene_json_roundtrip() {
        let mut scene = Scene::new();
        scene.create_shape(rect_on(&scene)).unwrap();
        let json = scene.to_json().unwrap();
        let back = Scene::from_json(&json).unwrap();
        assert_eq!(back.shape_count(), 1);
        assert_eq!(back.layers().len(), 2);
    }
}
