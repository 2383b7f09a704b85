//! Attaches a prop to a bone of an animated, skinned character.
//!
//! `Session` is the entry point. It owns the clips and their `Playback`, an
//! `AttachmentController` and a `TriggerLayer`, and each call to
//! `Session::frame` returns the model transform, the prop transform (if the
//! prop is drawn) and the final bone matrices for skinning. Windowing,
//! shaders and asset loading are left to the application.
pub mod animation;
pub mod attachment;
pub mod bm_error;
pub mod bone_directory;
pub mod config;
pub mod frame_clock;
pub mod keyboard;
pub mod session;
pub mod trigger;
pub mod types;
pub mod util;
