//! Deduplicated box-list models and their derived face masks.

use karst_geom::{Aabb, Dir, boxes_contain_face, boxes_intersect_face, rotate_180, rotate_clockwise, rotate_counter_clockwise};

use crate::error::BuildError;
use crate::types::ModelId;

/// The empty model is registered first and always holds id 0.
pub const MODEL_EMPTY: ModelId = 0;

// Inset coverage targets, in pixel coordinates. The pole is the 2x2-pixel
// column torches and candles stand on; the wall part is the 8x8-pixel
// central pillar wall segments connect to.
const POLE_SLICE: Aabb = Aabb::pixels(7.0, 0.0, 7.0, 9.0, 16.0, 9.0);
const WALL_SLICE: Aabb = Aabb::pixels(4.0, 0.0, 4.0, 12.0, 16.0, 12.0);
const FULL_SLICE: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 16.0, 16.0);

/// A shape used for collision, support, or light blocking: an ordered box
/// list in unit-cube coordinates plus one bit per direction for each
/// derived face property.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockModel {
    pub boxes: Vec<Aabb>,
    /// Model fully covers the unit face.
    pub full_faces: u8,
    /// Model covers the central pole through that face.
    pub pole_faces: u8,
    /// Some box touches that face at all.
    pub non_empty_faces: u8,
    /// Model covers the central wall pillar through that face.
    pub covered_wall_parts: u8,
}

#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<BlockModel>,
}

impl ModelRegistry {
    /// Starts with the empty model so id 0 is stable.
    pub fn new() -> Self {
        let mut registry = Self { models: Vec::new() };
        registry
            .register(&[])
            .expect("empty model registration cannot fail");
        registry
    }

    #[inline]
    pub fn get(&self, id: ModelId) -> &BlockModel {
        &self.models[id as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockModel> {
        self.models.iter()
    }

    /// Registers a box list given in 16-pixel-grid coordinates, returning
    /// the id of the structurally identical model if one exists.
    ///
    /// Degenerate boxes are rejected here, before they can stall the cover
    /// sweep deep inside an unrelated face computation.
    pub fn register(&mut self, pixel_boxes: &[Aabb]) -> Result<ModelId, BuildError> {
        for (index, b) in pixel_boxes.iter().enumerate() {
            if !b.has_volume() {
                return Err(BuildError::DegenerateModelBox { index });
            }
        }

        let boxes: Vec<Aabb> = pixel_boxes.iter().map(|b| b.to_unit()).collect();

        // linear equality scan; the model count stays small enough that
        // nothing smarter pays for itself
        for (id, model) in self.models.iter().enumerate() {
            if model.boxes == boxes {
                return Ok(id as ModelId);
            }
        }

        let unit_full = FULL_SLICE.to_unit();
        let unit_pole = POLE_SLICE.to_unit();
        let unit_wall = WALL_SLICE.to_unit();

        let mut model = BlockModel {
            boxes,
            full_faces: 0,
            pole_faces: 0,
            non_empty_faces: 0,
            covered_wall_parts: 0,
        };
        for dir in Dir::ALL {
            if boxes_contain_face(&model.boxes, unit_full, dir) {
                model.full_faces |= dir.mask();
            }
            if boxes_contain_face(&model.boxes, unit_pole, dir) {
                model.pole_faces |= dir.mask();
            }
            if boxes_intersect_face(&model.boxes, unit_full, dir) {
                model.non_empty_faces |= dir.mask();
            }
            if boxes_contain_face(&model.boxes, unit_wall, dir) {
                model.covered_wall_parts |= dir.mask();
            }
        }

        let id = self.models.len() as ModelId;
        self.models.push(model);
        Ok(id)
    }
}

/// Which neighbours a cross-shaped block (pane, fence, wall bar) connects
/// to.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrossConnections {
    pub neg_z: bool,
    pub pos_z: bool,
    pub neg_x: bool,
    pub pos_x: bool,
}

/// Synthesizes the box list for one connection state of a cross-shaped
/// block from three pixel-space templates: the free-standing centre post,
/// the arm reaching the -Z neighbour, and the bar running through both Z
/// neighbours. Arms for other directions are rotations of the -Z templates.
pub fn cross_model_boxes(
    centre: Aabb,
    neg_z_arm: Aabb,
    through_z: Aabb,
    connections: CrossConnections,
) -> Vec<Aabb> {
    let mut boxes = Vec::with_capacity(2);

    if connections.neg_z && connections.pos_z {
        boxes.push(through_z);
    } else if connections.neg_z {
        boxes.push(neg_z_arm);
    } else if connections.pos_z {
        boxes.push(rotate_180(neg_z_arm));
    }

    if connections.neg_x && connections.pos_x {
        boxes.push(rotate_clockwise(through_z));
    } else if connections.neg_x {
        boxes.push(rotate_counter_clockwise(neg_z_arm));
    } else if connections.pos_x {
        boxes.push(rotate_clockwise(neg_z_arm));
    }

    if boxes.is_empty() {
        // not connected to any edge
        boxes.push(centre);
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 16.0, 16.0);
    const BOTTOM_SLAB: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 8.0, 16.0);

    #[test]
    fn empty_model_is_id_zero_with_blank_masks() {
        let registry = ModelRegistry::new();
        let empty = registry.get(MODEL_EMPTY);
        assert!(empty.boxes.is_empty());
        assert_eq!(empty.full_faces, 0);
        assert_eq!(empty.pole_faces, 0);
        assert_eq!(empty.non_empty_faces, 0);
        assert_eq!(empty.covered_wall_parts, 0);
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ModelRegistry::new();
        let a = registry.register(&[FULL]).unwrap();
        let b = registry.register(&[FULL]).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.register(&[]).unwrap(), MODEL_EMPTY);
    }

    #[test]
    fn full_cube_masks_are_all_ones() {
        let mut registry = ModelRegistry::new();
        let id = registry.register(&[FULL]).unwrap();
        let model = registry.get(id);
        assert_eq!(model.full_faces, 0b11_1111);
        assert_eq!(model.pole_faces, 0b11_1111);
        assert_eq!(model.non_empty_faces, 0b11_1111);
        assert_eq!(model.covered_wall_parts, 0b11_1111);
    }

    #[test]
    fn bottom_slab_full_face_is_down_only() {
        let mut registry = ModelRegistry::new();
        let id = registry.register(&[BOTTOM_SLAB]).unwrap();
        let model = registry.get(id);
        assert_eq!(model.full_faces, Dir::NegY.mask());
        // every face is touched by the slab
        assert_eq!(model.non_empty_faces, 0b11_1111);
        // the half-height pole and wall pillar are only covered downwards
        assert_eq!(model.pole_faces & Dir::NegY.mask(), Dir::NegY.mask());
        assert_eq!(model.pole_faces & Dir::PosY.mask(), 0);
    }

    #[test]
    fn fence_post_covers_pole_but_not_full_faces() {
        let mut registry = ModelRegistry::new();
        let post = Aabb::pixels(6.0, 0.0, 6.0, 10.0, 16.0, 10.0);
        let id = registry.register(&[post]).unwrap();
        let model = registry.get(id);
        assert_eq!(model.full_faces, 0);
        assert_eq!(model.pole_faces & Dir::NegY.mask(), Dir::NegY.mask());
        assert_eq!(model.pole_faces & Dir::PosY.mask(), Dir::PosY.mask());
        // 4-pixel post is narrower than the 8-pixel wall pillar
        assert_eq!(model.covered_wall_parts & Dir::PosY.mask(), 0);
    }

    #[test]
    fn degenerate_box_is_rejected() {
        let mut registry = ModelRegistry::new();
        let flat = Aabb::pixels(0.0, 8.0, 0.0, 16.0, 8.0, 16.0);
        let err = registry.register(&[flat]).unwrap_err();
        assert!(matches!(err, BuildError::DegenerateModelBox { index: 0 }));
    }

    #[test]
    fn cross_boxes_select_and_rotate_templates() {
        let centre = Aabb::pixels(7.0, 0.0, 7.0, 9.0, 16.0, 9.0);
        let neg_z = Aabb::pixels(7.0, 0.0, 0.0, 9.0, 16.0, 9.0);
        let through = Aabb::pixels(7.0, 0.0, 0.0, 9.0, 16.0, 16.0);

        let only_neg_z = cross_model_boxes(
            centre,
            neg_z,
            through,
            CrossConnections { neg_z: true, ..Default::default() },
        );
        assert_eq!(only_neg_z, vec![neg_z]);

        let both_z = cross_model_boxes(
            centre,
            neg_z,
            through,
            CrossConnections { neg_z: true, pos_z: true, ..Default::default() },
        );
        assert_eq!(both_z, vec![through]);

        let unconnected = cross_model_boxes(centre, neg_z, through, CrossConnections::default());
        assert_eq!(unconnected, vec![centre]);

        let all = cross_model_boxes(
            centre,
            neg_z,
            through,
            CrossConnections { neg_z: true, pos_z: true, neg_x: true, pos_x: true },
        );
        assert_eq!(all, vec![through, rotate_clockwise(through)]);
    }
}
