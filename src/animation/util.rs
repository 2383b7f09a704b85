use super::types::{
    Animation, BoneChannel, Interpolation, JointInfo, Keyframe, Skeleton, Trs,
};
use crate::bm_error::BmError;
use log::trace;
use nalgebra_glm as glm;

/// Helper to calculate the parameter used for interpolation
fn weight(start: f32, end: f32, current: f32) -> f32 {
    const EPSILON: f32 = 0.0005;
    ((current - start) / (end - start).max(EPSILON)).clamp(0.0f32, 1.0f32)
}

/// Samples one keyframe track at `current_time`. `initial_frame` holds the
/// bind pose value and is used before the first keyframe.
fn calculate<T: Copy>(
    interpolation: Interpolation,
    track: &[Keyframe<T>],
    initial_frame: &Keyframe<T>,
    current_time: f32,
    blend: impl Fn(&T, &T, f32) -> T,
) -> T {
    let mut frame = initial_frame;
    for f in track {
        if f.time <= current_time {
            // This frame is at or before the current time, so make it the
            // new candidate frame
            frame = f;
        } else {
            // This frame is after the desired time, so stop looping
            if interpolation == Interpolation::Step {
                return frame.data;
            }
            // Cubic spline isn't supported and is treated as linear
            return blend(
                &frame.data,
                &f.data,
                weight(frame.time, f.time, current_time),
            );
        }
    }
    // Fall through past the end of the track so return data from the
    // candidate frame
    frame.data
}

fn sample_channel(channel: &BoneChannel, bind: &Trs, current_time: f32) -> Trs {
    let translation = calculate(
        channel.interpolation,
        &channel.translations,
        &Keyframe::new(0.0, bind.translation),
        current_time,
        |a, b, t| glm::lerp(a, b, t),
    );
    let rotation = calculate(
        channel.interpolation,
        &channel.rotations,
        &Keyframe::new(0.0, bind.rotation),
        current_time,
        |a, b, t| glm::quat_slerp(a, b, t),
    );
    let scale = calculate(
        channel.interpolation,
        &channel.scales,
        &Keyframe::new(0.0, bind.scale),
        current_time,
        |a, b, t| glm::lerp(a, b, t),
    );
    Trs::new(translation, rotation, scale)
}

/// Calculates the local transform for a joint at an arbitrary timestamp. A
/// bone without a channel holds its bind pose.
fn transform(
    joint_info: &JointInfo,
    animation: &Animation,
    bone: usize,
    current_time: f32,
) -> glm::Mat4 {
    animation
        .channels
        .get(&bone)
        .map_or(joint_info.bind, |channel| {
            sample_channel(channel, &joint_info.bind, current_time)
        })
        .to_mat4()
}

// Call with a root joint to recursively calculate the global transform of it
// and its descendants, writing each one combined with its inverse bind
fn traverse(
    skeleton: &Skeleton,
    animation: &Animation,
    bone: usize,
    current_time: f32,
    parent_global: &glm::Mat4,
    output: &mut [glm::Mat4],
) {
    let Some(joint_info) = skeleton.joints.get(bone) else {
        trace!("bone={} not in skeleton", bone);
        return;
    };

    let global = parent_global
        * transform(joint_info, animation, bone, current_time);

    for child in &joint_info.children {
        traverse(skeleton, animation, *child, current_time, &global, output);
    }

    if let Some(out) = output.get_mut(bone) {
        *out = global * joint_info.inv_bind;
    }
}

/// Calculates the final bone matrices for an animation at an arbitrary
/// timestamp in clip ticks. `output` is resized to one matrix per joint.
///
/// # Errors
/// Returns `BmError::MalformedClip` if the skeleton can't be walked. The
/// output is still usable in that case: empty for a skeleton with no joints,
/// otherwise filled with identity matrices.
pub fn animate(
    skeleton: &Skeleton,
    animation: &Animation,
    current_time: f32,
    output: &mut Vec<glm::Mat4>,
) -> Result<(), BmError> {
    output.clear();
    output.resize(skeleton.len(), glm::Mat4::identity());
    skeleton.validate()?;

    let identity = glm::Mat4::identity();
    for root in skeleton.roots() {
        traverse(skeleton, animation, root, current_time, &identity, output);
    }
    Ok(())
}
