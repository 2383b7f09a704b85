mod playback;
mod types;
mod util;

// Re-exports
pub use {
    playback::{ClipId, Playback},
    types::{
        Animation, BoneChannel, Clip, Interpolation, JointInfo, Keyframe,
        Skeleton, Trs,
    },
    util::animate,
};
