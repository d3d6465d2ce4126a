//! Light propagation precompute over registered block models.
//!
//! For every ordered model pair and direction the shared boundary face is
//! tested once at startup: project the source model's boxes onto its
//! `dir`-facing boundary and the destination model's boxes from the
//! opposite side, keep only projections that actually reach the shared
//! plane, and run the same greedy cover sweep the face masks use. Light is
//! blocked exactly when the combined projections cover the whole face. The
//! result is a dense N x N table of 6-bit direction masks, immutable for
//! the rest of the process lifetime.
#![forbid(unsafe_code)]

use karst_blocks::model::{BlockModel, ModelRegistry};
use karst_blocks::types::ModelId;
use karst_geom::{Aabb, Dir, FaceRect, rects_cover_target};
use log::info;

/// One box projected towards a shared face: the rectangle it shadows and
/// how far along the axis it reaches (1.0 = touches the shared plane).
struct PropagationTest {
    edge: f32,
    rect: FaceRect,
}

fn box_to_propagation_test(b: Aabb, dir: Dir) -> PropagationTest {
    let (edge, rect) = match dir {
        Dir::NegY => (1.0 - b.min.y, FaceRect::new(b.min.x, b.min.z, b.max.x, b.max.z)),
        Dir::PosY => (b.max.y, FaceRect::new(b.min.x, b.min.z, b.max.x, b.max.z)),
        Dir::NegZ => (1.0 - b.min.z, FaceRect::new(b.min.x, b.min.y, b.max.x, b.max.y)),
        Dir::PosZ => (b.max.z, FaceRect::new(b.min.x, b.min.y, b.max.x, b.max.y)),
        Dir::NegX => (1.0 - b.min.x, FaceRect::new(b.min.y, b.min.z, b.max.y, b.max.z)),
        Dir::PosX => (b.max.x, FaceRect::new(b.min.y, b.min.z, b.max.y, b.max.z)),
    };
    PropagationTest { edge, rect }
}

/// Can light leave a block shaped like `from` through its `dir` face and
/// enter a neighbour shaped like `to`?
fn light_can_propagate(from: &BlockModel, to: &BlockModel, dir: Dir) -> bool {
    let mut rects: Vec<FaceRect> = Vec::with_capacity(from.boxes.len() + to.boxes.len());

    for &b in &from.boxes {
        let test = box_to_propagation_test(b, dir);
        if test.edge >= 1.0 {
            rects.push(test.rect);
        }
    }
    for &b in &to.boxes {
        let test = box_to_propagation_test(b, dir.opposite());
        if test.edge >= 1.0 {
            rects.push(test.rect);
        }
    }

    let full_face = FaceRect::new(0.0, 0.0, 1.0, 1.0);
    !rects_cover_target(&rects, full_face)
}

/// Dense `N x N` table of 6-bit direction masks, `N` the number of
/// registered models. Bit set = light passes.
pub struct LightTable {
    model_count: usize,
    masks: Vec<u8>,
}

impl LightTable {
    /// Runs the all-pairs sweep. Invoked once by the startup sequence,
    /// after the model registry is complete.
    pub fn compute(models: &ModelRegistry) -> LightTable {
        let n = models.len();
        let mut masks = vec![0u8; n * n];
        for (from_id, from) in models.iter().enumerate() {
            for (to_id, to) in models.iter().enumerate() {
                let mut mask = 0u8;
                for dir in Dir::ALL {
                    if light_can_propagate(from, to, dir) {
                        mask |= dir.mask();
                    }
                }
                masks[from_id * n + to_id] = mask;
            }
        }
        info!("light propagation table: {n} models, {} pair masks", n * n);
        LightTable {
            model_count: n,
            masks,
        }
    }

    #[inline]
    pub fn model_count(&self) -> usize {
        self.model_count
    }

    /// Full 6-bit mask for a model pair.
    #[inline]
    pub fn mask(&self, from: ModelId, to: ModelId) -> u8 {
        self.masks[from as usize * self.model_count + to as usize]
    }

    #[inline]
    pub fn can_propagate(&self, from: ModelId, to: ModelId, dir: Dir) -> bool {
        self.mask(from, to) & dir.mask() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karst_blocks::model::MODEL_EMPTY;

    const FULL: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 16.0, 16.0);
    const BOTTOM_SLAB: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 8.0, 16.0);
    const TOP_SLAB: Aabb = Aabb::pixels(0.0, 8.0, 0.0, 16.0, 16.0, 16.0);

    fn registry_with(box_lists: &[&[Aabb]]) -> (ModelRegistry, Vec<ModelId>) {
        let mut models = ModelRegistry::new();
        let ids = box_lists
            .iter()
            .map(|list| models.register(list).unwrap())
            .collect();
        (models, ids)
    }

    #[test]
    fn empty_models_pass_light_everywhere() {
        let (models, _) = registry_with(&[]);
        let table = LightTable::compute(&models);
        assert_eq!(table.mask(MODEL_EMPTY, MODEL_EMPTY), 0b11_1111);
    }

    #[test]
    fn full_cube_blocks_every_direction() {
        let (models, ids) = registry_with(&[&[FULL]]);
        let table = LightTable::compute(&models);
        let full = ids[0];
        assert_eq!(table.mask(full, MODEL_EMPTY), 0);
        assert_eq!(table.mask(MODEL_EMPTY, full), 0);
        assert_eq!(table.mask(full, full), 0);
    }

    #[test]
    fn stacked_bottom_slabs_block_downward_light() {
        let (models, ids) = registry_with(&[&[BOTTOM_SLAB]]);
        let table = LightTable::compute(&models);
        let slab = ids[0];
        // the source slab reaches the shared plane from below with a
        // full-face footprint, so no light crosses downwards
        assert!(!table.can_propagate(slab, slab, Dir::NegY));
        // upwards the destination slab's underside seals the shared plane
        assert!(!table.can_propagate(slab, slab, Dir::PosY));
        // sideways the upper half of the shared face stays open
        assert!(table.can_propagate(slab, slab, Dir::NegZ));
        assert!(table.can_propagate(slab, slab, Dir::PosX));
    }

    #[test]
    fn bottom_and_top_slab_seal_their_shared_column() {
        let (models, ids) = registry_with(&[&[BOTTOM_SLAB], &[TOP_SLAB]]);
        let table = LightTable::compute(&models);
        let (bottom, top) = (ids[0], ids[1]);
        // bottom slab below, top slab above: both halves of the vertical
        // faces are shadowed when light moves up out of the bottom slab
        assert!(!table.can_propagate(bottom, top, Dir::NegY));
        assert!(!table.can_propagate(top, bottom, Dir::PosY));
        // sideways, bottom covers the lower half and top the upper half
        assert!(!table.can_propagate(bottom, top, Dir::NegZ));
        assert!(!table.can_propagate(top, bottom, Dir::PosX));
    }

    #[test]
    fn slab_into_empty_passes_except_through_its_own_full_face() {
        let (models, ids) = registry_with(&[&[BOTTOM_SLAB]]);
        let table = LightTable::compute(&models);
        let slab = ids[0];
        assert!(!table.can_propagate(slab, MODEL_EMPTY, Dir::NegY));
        assert!(table.can_propagate(slab, MODEL_EMPTY, Dir::PosY));
        assert!(table.can_propagate(slab, MODEL_EMPTY, Dir::PosZ));
        // and mirrored for light arriving into the slab from outside
        assert!(!table.can_propagate(MODEL_EMPTY, slab, Dir::PosY));
        assert!(table.can_propagate(MODEL_EMPTY, slab, Dir::NegY));
    }

    #[test]
    fn thin_post_never_blocks() {
        let post = Aabb::pixels(6.0, 0.0, 6.0, 10.0, 16.0, 10.0);
        let (models, ids) = registry_with(&[&[post], &[FULL]]);
        let table = LightTable::compute(&models);
        let (post, full) = (ids[0], ids[1]);
        assert_eq!(table.mask(post, MODEL_EMPTY), 0b11_1111);
        assert_eq!(table.mask(post, post), 0b11_1111);
        // but a full neighbour still seals the pair
        assert_eq!(table.mask(post, full), 0);
    }
}
