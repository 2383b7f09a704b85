//! Prop attachment state machine and bone-space transform
//!
//! The prop is `Hidden` while the primary clip plays. Selecting the secondary
//! clip shows it `Floating` at a fixed offset from the model and arms a
//! countdown. When the countdown runs out the prop becomes `Attached` and
//! follows the target bone until the next clip switch.
//!
//! The attached transform is recovered from the final skinning matrix of the
//! target bone rather than by walking the hierarchy again. A final matrix is
//! `global * offset`, where `offset` is the bone's inverse bind matrix, so
//! the bone's animated global transform is `final * inverse(offset)`. Using
//! the same matrices the renderer skins with keeps the prop exactly on the
//! drawn pose.

use crate::{
    bm_error::BmError,
    bone_directory::BoneDirectory,
    config::AttachConfig,
    types::ClipSlot,
    util::sanitize_delta,
};
use log::{debug, info, warn};
use nalgebra_glm as glm;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttachMode {
    /// Not drawn
    Hidden,
    /// Drawn at a fixed offset from the model
    Floating,
    /// Drawn following the target bone
    Attached,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttachmentState {
    pub mode: AttachMode,
    /// Seconds left before attaching. Only counts down while `Floating`.
    pub countdown: f32,
    /// Target bone index, `None` if the bone name didn't resolve at startup
    pub target: Option<usize>,
    /// Prop pose relative to the bone once attached
    pub static_offset: glm::Mat4,
}

/// Position and approximate uniform scale of a prop transform, for logs
#[must_use]
pub fn position_and_scale(transform: &glm::Mat4) -> (glm::Vec3, f32) {
    let position =
        glm::vec3(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)]);
    let x_axis =
        glm::vec3(transform[(0, 0)], transform[(1, 0)], transform[(2, 0)]);
    (position, glm::length(&x_axis))
}

/// Degraded paths already reported, so each is logged once
#[derive(Clone, Copy, Debug, Default)]
struct Reported {
    missing_entry: bool,
    bad_index: bool,
    singular_offset: bool,
}

pub struct AttachmentController {
    state: AttachmentState,
    armed: bool,
    bone_name: String,
    arm_duration: f32,
    float_matrix: glm::Mat4,
    last_attached: Option<glm::Mat4>,
    reported: Reported,
    first_draw_logged: bool,
}

/// Recovers a bone's animated global transform from its final skinning
/// matrix by removing the inverse bind pose baked into it. Returns `None` if
/// the offset can't be inverted.
#[must_use]
pub fn bone_global(
    final_matrix: &glm::Mat4,
    offset: &glm::Mat4,
) -> Option<glm::Mat4> {
    offset.try_inverse().map(|inv| final_matrix * inv)
}

impl AttachmentController {
    /// Creates a hidden controller, resolving the target bone in `directory`,
    /// which should come from the primary skeleton. A missing bone is logged
    /// and leaves the target unresolved.
    #[must_use]
    pub fn new(config: &AttachConfig, directory: &BoneDirectory) -> Self {
        let target = match directory.resolve(&config.bone_name) {
            Ok(entry) => {
                info!(
                    "Attach bone '{}' found with index {}",
                    config.bone_name, entry.id
                );
                Some(entry.id)
            }
            Err(e) => {
                warn!("{e}, attachment will use the floating transform");
                None
            }
        };
        Self {
            state: AttachmentState {
                mode: AttachMode::Hidden,
                countdown: 0.0,
                target,
                static_offset: config.attach_offset.to_mat4(),
            },
            armed: false,
            bone_name: config.bone_name.clone(),
            arm_duration: sanitize_delta(config.arm_duration),
            float_matrix: config.float_matrix(),
            last_attached: None,
            reported: Reported::default(),
            first_draw_logged: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AttachmentState {
        &self.state
    }

    #[must_use]
    pub const fn mode(&self) -> AttachMode {
        self.state.mode
    }

    #[must_use]
    pub const fn countdown(&self) -> f32 {
        self.state.countdown
    }

    #[must_use]
    pub const fn target(&self) -> Option<usize> {
        self.state.target
    }

    #[must_use]
    pub fn bone_name(&self) -> &str {
        &self.bone_name
    }

    /// Call when a clip is selected. Always resets, even if the same clip
    /// was already playing.
    pub fn on_clip_selected(&mut self, slot: ClipSlot) {
        match slot {
            ClipSlot::Primary => self.select_primary(),
            ClipSlot::Secondary => self.select_secondary(),
        }
    }

    /// Hides the prop and disarms the countdown
    pub fn select_primary(&mut self) {
        debug!("prop hidden");
        self.state.mode = AttachMode::Hidden;
        self.state.countdown = 0.0;
        self.armed = false;
        self.last_attached = None;
    }

    /// Shows the prop floating and restarts the countdown
    pub fn select_secondary(&mut self) {
        self.state.mode = AttachMode::Floating;
        self.state.countdown = self.arm_duration;
        self.armed = true;
        self.last_attached = None;
        info!(
            "Attachment countdown started. Prop will attach in {} seconds.",
            self.arm_duration
        );
    }

    /// Advances the countdown. Returns `true` on the tick the prop attaches.
    /// A countdown armed at 0 never runs, leaving the prop floating.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.armed
            || self.state.mode != AttachMode::Floating
            || self.state.countdown <= 0.0
        {
            return false;
        }
        self.state.countdown -= sanitize_delta(delta);
        if self.state.countdown > 0.0 {
            return false;
        }
        self.state.countdown = 0.0;
        self.state.mode = AttachMode::Attached;
        self.armed = false;
        info!("Attachment occurred. Prop is now attached.");
        true
    }

    /// Floating prop transform, `model * translate * scale`
    #[must_use]
    pub fn floating_transform(&self, model: &glm::Mat4) -> glm::Mat4 {
        model * self.float_matrix
    }

    /// Calculates the prop's world transform for this frame, or `None` if it
    /// shouldn't be drawn. `finals` are the final bone matrices of the
    /// active clip and `directory` is that clip's bone directory.
    pub fn world_transform(
        &mut self,
        model: &glm::Mat4,
        finals: &[glm::Mat4],
        directory: &BoneDirectory,
    ) -> Option<glm::Mat4> {
        let transform = match self.state.mode {
            AttachMode::Hidden => return None,
            AttachMode::Floating => self.floating_transform(model),
            AttachMode::Attached => {
                self.attached_transform(model, finals, directory)
            }
        };
        if !self.first_draw_logged {
            let (position, scale) = position_and_scale(&transform);
            info!(
                "Prop first drawn {:?} at {:?}, scale about {}",
                self.state.mode, position, scale
            );
            self.first_draw_logged = true;
        }
        Some(transform)
    }

    fn attached_transform(
        &mut self,
        model: &glm::Mat4,
        finals: &[glm::Mat4],
        directory: &BoneDirectory,
    ) -> glm::Mat4 {
        let Some(index) = self.state.target else {
            return self.floating_transform(model);
        };
        let Some(final_matrix) = finals.get(index) else {
            if !self.reported.bad_index {
                let e = BmError::InvalidBoneIndex {
                    index,
                    count: finals.len(),
                };
                warn!("{e}, holding the previous prop transform");
                self.reported.bad_index = true;
            }
            return self
                .last_attached
                .unwrap_or_else(|| self.floating_transform(model));
        };

        let basis = match directory.resolve(&self.bone_name) {
            Ok(entry) => {
                if entry.id != index {
                    debug!(
                        "bone '{}' is index {} in the active clip, using {}",
                        self.bone_name, entry.id, index
                    );
                }
                bone_global(final_matrix, &entry.offset).unwrap_or_else(|| {
                    if !self.reported.singular_offset {
                        warn!(
                            "offset for '{}' is not invertible, using the \
                             final matrix directly",
                            self.bone_name
                        );
                        self.reported.singular_offset = true;
                    }
                    *final_matrix
                })
            }
            Err(e) => {
                if !self.reported.missing_entry {
                    warn!("{e}, using the final matrix directly");
                    self.reported.missing_entry = true;
                }
                *final_matrix
            }
        };

        let transform = model * basis * self.state.static_offset;
        self.last_attached = Some(transform);
        transform
    }
}
