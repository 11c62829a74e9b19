//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the handful of helpers the clipping
//! code needs (point transforms, axis-aligned extents, rect constraining).

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Transform a position by an affine matrix, ignoring the projective row.
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Axis-aligned min/max of a set of points projected on the XY plane.
pub fn xy_extent(points: &[Vec3]) -> (Vec2, Vec2) {
    let mut min = Vec2::new(f32::MAX, f32::MAX);
    let mut max = Vec2::new(f32::MIN, f32::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Offset that moves the rectangle `[min_rect, max_rect]` inside
/// `[min_area, max_area]`.
///
/// When the content is larger than the area on an axis, the area is grown
/// on both sides by the difference first, so oversized content is allowed
/// to overhang instead of oscillating between edges.
pub fn constrain_rect(min_rect: Vec2, max_rect: Vec2, mut min_area: Vec2, mut max_area: Vec2) -> Vec2 {
    let mut offset = Vec2::zeros();

    let content_x = max_rect.x - min_rect.x;
    let content_y = max_rect.y - min_rect.y;
    let area_x = max_area.x - min_area.x;
    let area_y = max_area.y - min_area.y;

    if content_x > area_x {
        let diff = content_x - area_x;
        min_area.x -= diff;
        max_area.x += diff;
    }

    if content_y > area_y {
        let diff = content_y - area_y;
        min_area.y -= diff;
        max_area.y += diff;
    }

    if min_rect.x < min_area.x {
        offset.x += min_area.x - min_rect.x;
    }
    if max_rect.x > max_area.x {
        offset.x -= max_rect.x - max_area.x;
    }
    if min_rect.y < min_area.y {
        offset.y += min_area.y - min_rect.y;
    }
    if max_rect.y > max_area.y {
        offset.y -= max_rect.y - max_area.y;
    }

    offset
}
