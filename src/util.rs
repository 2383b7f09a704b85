/// A module of utility functions
use nalgebra_glm as glm;

/// Axis length below which a rotation axis is treated as missing
const AXIS_EPSILON: f32 = 1.0e-6;

/// Returns a usable frame delta. Negative, NaN and infinite values become 0
/// so that a bad clock reading can't move animation backwards or poison the
/// accumulated time.
#[must_use]
pub fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta
    } else {
        0.0
    }
}

/// Builds `translate(translation) * rotate(angle, axis) * scale(uniform)`.
/// This is the usual order for hand tuned offsets: the scale is applied to
/// the object first, then the rotation, then the translation. A zero length
/// axis skips the rotation.
#[must_use]
pub fn offset_matrix(
    translation: &glm::Vec3,
    angle_degrees: f32,
    axis: &glm::Vec3,
    scale: f32,
) -> glm::Mat4 {
    let m = glm::translate(&glm::Mat4::identity(), translation);
    let m = if glm::length(axis) > AXIS_EPSILON {
        glm::rotate(&m, angle_degrees.to_radians(), axis)
    } else {
        m
    };
    glm::scale(&m, &glm::vec3(scale, scale, scale))
}

/// Builds `translate(translation) * scale(uniform)`
#[must_use]
pub fn translate_scale(translation: &glm::Vec3, scale: f32) -> glm::Mat4 {
    let m = glm::translate(&glm::Mat4::identity(), translation);
    glm::scale(&m, &glm::vec3(scale, scale, scale))
}

/// Transforms a 3D position using a 4x4 matrix and return as a `glm::Vec3`
#[must_use]
pub fn transform(position: &glm::Vec3, matrix: &glm::Mat4) -> glm::Vec3 {
    let ws = glm::vec4(position.x, position.y, position.z, 1.0f32);
    let vs = matrix * ws;
    glm::vec3(vs.x, vs.y, vs.z)
}

/// Compares two matrices column by column within `epsilon`
#[must_use]
pub fn mat4_approx_eq(a: &glm::Mat4, b: &glm::Mat4, epsilon: f32) -> bool {
    let c = glm::equal_columns_eps(a, b, epsilon);
    c.x && c.y && c.z && c.w
}
