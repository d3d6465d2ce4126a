//! Pixel-grid geometry for the block model compiler (no engine dependency).
#![forbid(unsafe_code)]

use core::ops::{Mul, Sub};

/// Block models are authored on a 16-pixel grid and stored in unit-cube
/// coordinates.
pub const PIXELS_PER_BLOCK: f32 = 16.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Shorthand for authoring boxes in pixel coordinates.
    #[inline]
    pub const fn pixels(min_x: f32, min_y: f32, min_z: f32, max_x: f32, max_y: f32, max_z: f32) -> Self {
        Self::new(Vec3::new(min_x, min_y, min_z), Vec3::new(max_x, max_y, max_z))
    }

    #[inline]
    pub fn extent(self) -> Vec3 {
        self.max - self.min
    }

    /// Strictly positive extent on every axis. The cover sweep only
    /// terminates for positive-area faces, so degenerate boxes must be
    /// rejected before they reach it.
    #[inline]
    pub fn has_volume(self) -> bool {
        let e = self.extent();
        e.x > 0.0 && e.y > 0.0 && e.z > 0.0
    }

    /// Pixel-grid box scaled down to unit-cube coordinates.
    #[inline]
    pub fn to_unit(self) -> Aabb {
        let s = 1.0 / PIXELS_PER_BLOCK;
        Aabb::new(self.min * s, self.max * s)
    }
}

/// Axis directions in face-mask bit order (bit = `dir as u8`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Dir {
    NegY = 0,
    PosY = 1,
    NegZ = 2,
    PosZ = 3,
    NegX = 4,
    PosX = 5,
}

impl Dir {
    pub const ALL: [Dir; 6] = [Dir::NegY, Dir::PosY, Dir::NegZ, Dir::PosZ, Dir::NegX, Dir::PosX];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn mask(self) -> u8 {
        1 << self.index()
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        match self {
            Dir::NegY => Dir::PosY,
            Dir::PosY => Dir::NegY,
            Dir::NegZ => Dir::PosZ,
            Dir::PosZ => Dir::NegZ,
            Dir::NegX => Dir::PosX,
            Dir::PosX => Dir::NegX,
        }
    }
}

// Rotations operate on pixel-space boxes: 90 degrees about +Y, viewed with
// +X up and +Z right. Pure coordinate permutation/negation, so applying
// `rotate_clockwise` four times returns the input exactly.

#[inline]
pub fn rotate_clockwise(b: Aabb) -> Aabb {
    Aabb::new(
        Vec3::new(PIXELS_PER_BLOCK - b.max.z, b.min.y, b.min.x),
        Vec3::new(PIXELS_PER_BLOCK - b.min.z, b.max.y, b.max.x),
    )
}

#[inline]
pub fn rotate_180(b: Aabb) -> Aabb {
    rotate_clockwise(rotate_clockwise(b))
}

#[inline]
pub fn rotate_counter_clockwise(b: Aabb) -> Aabb {
    rotate_180(rotate_clockwise(b))
}

/// An axis-aligned rectangle in the (a, b) coordinates of some cube face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceRect {
    pub min_a: f32,
    pub min_b: f32,
    pub max_a: f32,
    pub max_b: f32,
}

impl FaceRect {
    #[inline]
    pub const fn new(min_a: f32, min_b: f32, max_a: f32, max_b: f32) -> Self {
        Self { min_a, min_b, max_a, max_b }
    }
}

/// All model boxes sit on the pixel grid, so a fairly large epsilon is safe
/// and absorbs the pixel->unit division rounding.
pub const COVER_EPSILON: f32 = 0.001;

const MAX_COVER_ITERATIONS: usize = 1000;

/// Greedy sweep deciding whether `target` is fully covered by the union of
/// `faces`.
///
/// Start at the minimum (a, b) corner. Move b forward through every face
/// containing the current point, remembering the smallest far-a edge seen;
/// when b reaches the target's far edge, jump a to that minimum and reset b.
/// Done when a reaches the far edge; not covered when neither coordinate can
/// advance. Every input rectangle must have positive area or the sweep
/// cannot guarantee progress; the iteration cap turns that into a loud
/// failure instead of a hang.
pub fn rects_cover_target(faces: &[FaceRect], target: FaceRect) -> bool {
    let eps = COVER_EPSILON;
    let mut best_a = target.min_a;
    let mut best_b = target.min_b;

    for _ in 0..MAX_COVER_ITERATIONS {
        let old_best_a = best_a;
        let mut min_found_a = f32::INFINITY;

        loop {
            let old_best_b = best_b;

            for face in faces {
                if face.min_a <= best_a + eps
                    && best_a <= face.max_a + eps
                    && face.min_b <= best_b + eps
                    && best_b <= face.max_b + eps
                {
                    // face contains the scan point, so b can move forward
                    best_b = face.max_b;
                    min_found_a = min_found_a.min(face.max_a);
                }
            }

            if old_best_b == best_b {
                // b stuck: a strip of the target is uncovered
                return false;
            }

            if best_b + eps >= target.max_b {
                best_b = target.min_b;
                best_a = min_found_a;
                break;
            }
        }

        if best_a + eps >= target.max_a {
            return true;
        }

        if old_best_a == best_a {
            return false;
        }
    }

    panic!("face cover sweep failed to terminate; degenerate input rectangle?");
}

/// Does the union of `boxes` fully cover the `dir`-facing face of `slice`?
///
/// `slice` is usually the unit cube, but inset targets (the light pole, the
/// wall pillar) use the same path.
pub fn boxes_contain_face(boxes: &[Aabb], slice: Aabb, dir: Dir) -> bool {
    let eps = COVER_EPSILON;
    let mut faces: Vec<FaceRect> = Vec::with_capacity(boxes.len());

    for b in boxes {
        let (rect, axis_min, axis_max, cut) = match dir {
            Dir::NegY => (FaceRect::new(b.min.x, b.min.z, b.max.x, b.max.z), b.min.y, b.max.y, slice.min.y),
            Dir::PosY => (FaceRect::new(b.min.x, b.min.z, b.max.x, b.max.z), b.min.y, b.max.y, slice.max.y),
            Dir::NegZ => (FaceRect::new(b.min.x, b.min.y, b.max.x, b.max.y), b.min.z, b.max.z, slice.min.z),
            Dir::PosZ => (FaceRect::new(b.min.x, b.min.y, b.max.x, b.max.y), b.min.z, b.max.z, slice.max.z),
            Dir::NegX => (FaceRect::new(b.min.y, b.min.z, b.max.y, b.max.z), b.min.x, b.max.x, slice.min.x),
            Dir::PosX => (FaceRect::new(b.min.y, b.min.z, b.max.y, b.max.z), b.min.x, b.max.x, slice.max.x),
        };
        // keep boxes whose extent along the face axis spans the cut plane
        if axis_min <= cut + eps && cut <= axis_max + eps {
            faces.push(rect);
        }
    }

    let target = match dir {
        Dir::NegY | Dir::PosY => FaceRect::new(slice.min.x, slice.min.z, slice.max.x, slice.max.z),
        Dir::NegZ | Dir::PosZ => FaceRect::new(slice.min.x, slice.min.y, slice.max.x, slice.max.y),
        Dir::NegX | Dir::PosX => FaceRect::new(slice.min.y, slice.min.z, slice.max.y, slice.max.z),
    };

    rects_cover_target(&faces, target)
}

/// Existence check: does any box touch the `dir`-facing face of `slice` at
/// all? No containment requirement.
pub fn boxes_intersect_face(boxes: &[Aabb], slice: Aabb, dir: Dir) -> bool {
    let mut flat = slice;
    match dir {
        Dir::NegY => flat.max.y = flat.min.y,
        Dir::PosY => flat.min.y = flat.max.y,
        Dir::NegZ => flat.max.z = flat.min.z,
        Dir::PosZ => flat.min.z = flat.max.z,
        Dir::NegX => flat.max.x = flat.min.x,
        Dir::PosX => flat.min.x = flat.max.x,
    }

    boxes.iter().any(|b| {
        b.min.x <= flat.max.x
            && b.max.x >= flat.min.x
            && b.min.y <= flat.max.y
            && b.max.y >= flat.min.y
            && b.min.z <= flat.max.z
            && b.max.z >= flat.min.z
    })
}
