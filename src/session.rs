use crate::{
    animation::{Clip, ClipId, Playback},
    attachment::{AttachMode, AttachmentController},
    bm_error::BmError,
    config::AttachConfig,
    keyboard::Keyboard,
    trigger::{Bindings, Command, TriggerLayer},
    types::{ClipSlot, MovementHandler},
    util::sanitize_delta,
};
use log::{error, info, trace};
use nalgebra_glm as glm;

/// What the renderer needs for one frame
#[derive(Clone, Copy, Debug)]
pub struct FrameOutput<'a> {
    /// World matrix of the skinned model
    pub model: glm::Mat4,
    /// World matrix of the prop, `None` if it shouldn't be drawn
    pub prop: Option<glm::Mat4>,
    /// Final bone matrices for skinning, indexed by bone
    pub bone_matrices: &'a [glm::Mat4],
}

impl FrameOutput<'_> {
    #[must_use]
    pub const fn draw_prop(&self) -> bool {
        self.prop.is_some()
    }
}

/// Owns everything that changes from frame to frame: the clips and their
/// playback, the attachment controller and the trigger layer.
///
/// Each frame runs in a fixed order: poll input, apply commands, advance
/// animation, advance the countdown, then calculate the prop transform from
/// the freshly calculated bone matrices.
pub struct Session {
    playback: Playback,
    controller: AttachmentController,
    trigger: TriggerLayer,
    model: glm::Mat4,
    prop: Option<glm::Mat4>,
    close_requested: bool,
    frame_count: u64,
}

impl Session {
    /// Creates a session with the primary clip playing and the prop hidden.
    /// The attach bone is resolved against the primary clip's skeleton.
    ///
    /// # Errors
    /// May return `BmError`
    pub fn new(
        config: &AttachConfig,
        primary: Clip,
        secondary: Clip,
    ) -> Result<Self, BmError> {
        let controller = AttachmentController::new(config, primary.directory());
        info!(
            "Session clips '{}' and '{}'",
            primary.name(),
            secondary.name()
        );
        let playback = Playback::new(vec![primary, secondary])?;
        Ok(Self {
            playback,
            controller,
            trigger: TriggerLayer::default(),
            model: config.model_matrix(),
            prop: None,
            close_requested: false,
            frame_count: 0,
        })
    }

    /// Replaces the default key bindings
    #[must_use]
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.trigger = TriggerLayer::new(bindings);
        self
    }

    /// Applies a command as if its key had been pressed
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SwitchClip(slot) => self.select(slot),
            Command::Quit => {
                info!("Close requested");
                self.close_requested = true;
            }
        }
    }

    fn select(&mut self, slot: ClipSlot) {
        if let Err(e) = self.playback.switch_to(ClipId::from(slot)) {
            error!("Can't select {slot:?} clip: {e}");
            return;
        }
        self.controller.on_clip_selected(slot);
    }

    /// Runs one frame: polls `keyboard`, forwards held movement keys to
    /// `mover`, applies any commands and then advances by `delta` seconds
    pub fn frame<M: MovementHandler + ?Sized>(
        &mut self,
        keyboard: &Keyboard,
        delta: f32,
        mover: &mut M,
    ) -> FrameOutput<'_> {
        let delta = sanitize_delta(delta);
        let commands = self.trigger.poll(keyboard, delta, mover);
        for command in commands {
            self.apply(command);
        }
        self.advance(delta)
    }

    /// Advances animation and the countdown by `delta` seconds without
    /// looking at input, then calculates the prop transform
    pub fn advance(&mut self, delta: f32) -> FrameOutput<'_> {
        self.playback.tick(delta);
        if self.controller.tick(delta) {
            trace!("attached at frame {}", self.frame_count);
        }
        self.prop = self.controller.world_transform(
            &self.model,
            self.playback.final_matrices(),
            self.playback.active_clip().directory(),
        );
        self.frame_count += 1;
        self.output()
    }

    /// Output of the most recent frame
    #[must_use]
    pub fn output(&self) -> FrameOutput<'_> {
        FrameOutput {
            model: self.model,
            prop: self.prop,
            bone_matrices: self.playback.final_matrices(),
        }
    }

    #[must_use]
    pub const fn playback(&self) -> &Playback {
        &self.playback
    }

    #[must_use]
    pub const fn controller(&self) -> &AttachmentController {
        &self.controller
    }

    #[must_use]
    pub const fn mode(&self) -> AttachMode {
        self.controller.mode()
    }

    #[must_use]
    pub const fn model(&self) -> &glm::Mat4 {
        &self.model
    }

    /// Moves the model. Takes effect on the next frame.
    pub fn set_model(&mut self, model: glm::Mat4) {
        self.model = model;
    }

    #[must_use]
    pub const fn close_requested(&self) -> bool {
        self.close_requested
    }

    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
