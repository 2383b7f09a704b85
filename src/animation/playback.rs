use super::{types::Clip, util};
use crate::{bm_error::BmError, types::ClipSlot, util::sanitize_delta};
use log::{debug, warn};
use nalgebra_glm as glm;

/// Index of a clip owned by a `Playback`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClipId(pub usize);

impl From<ClipSlot> for ClipId {
    fn from(slot: ClipSlot) -> Self {
        Self(slot.index())
    }
}

/// Owns the clips, the active clip and elapsed time, and the final bone
/// matrices from the most recent tick.
///
/// Switching clips is a plain command. Anything that needs to react to a
/// switch, such as the attachment controller, is told by whoever issued the
/// switch.
pub struct Playback {
    clips: Vec<Clip>,
    active: ClipId,
    elapsed: f32,
    final_matrices: Vec<glm::Mat4>,
    reported: Vec<bool>,
}

impl Playback {
    /// Creates playback with the first clip active and its pose at time 0
    ///
    /// # Errors
    /// Returns `BmError::MissingClip` if `clips` is empty
    pub fn new(clips: Vec<Clip>) -> Result<Self, BmError> {
        if clips.is_empty() {
            return Err(BmError::MissingClip(ClipSlot::Primary));
        }
        let reported = vec![false; clips.len()];
        let mut playback = Self {
            clips,
            active: ClipId(0),
            elapsed: 0.0,
            final_matrices: Vec::new(),
            reported,
        };
        playback.tick(0.0);
        Ok(playback)
    }

    /// Makes `id` the active clip and resets elapsed time. The final bone
    /// matrices keep the previous pose until the next `tick`.
    ///
    /// # Errors
    /// Returns `BmError::UnknownClip` if there is no such clip, leaving the
    /// current clip playing
    pub fn switch_to(&mut self, id: ClipId) -> Result<(), BmError> {
        if id.0 >= self.clips.len() {
            return Err(BmError::UnknownClip(id.0));
        }
        debug!(
            "switch_to clip {} '{}' from '{}'",
            id.0,
            self.clips[id.0].name(),
            self.active_clip().name()
        );
        self.active = id;
        self.elapsed = 0.0;
        Ok(())
    }

    /// Advances elapsed time and recalculates the final bone matrices. A
    /// clip that can't be animated yields identity (or no) matrices and is
    /// reported once.
    pub fn tick(&mut self, delta: f32) {
        self.elapsed += sanitize_delta(delta);
        let clip = &self.clips[self.active.0];
        let time = clip.animation().sample_time(self.elapsed);
        if let Err(e) = util::animate(
            clip.skeleton(),
            clip.animation(),
            time,
            &mut self.final_matrices,
        ) {
            if !self.reported[self.active.0] {
                warn!("clip '{}' can't be animated: {e}", clip.name());
                self.reported[self.active.0] = true;
            }
        }
    }

    /// Final bone matrices from the most recent tick, indexed by bone
    #[must_use]
    pub fn final_matrices(&self) -> &[glm::Mat4] {
        &self.final_matrices
    }

    /// Seconds since the active clip was selected
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub const fn active(&self) -> ClipId {
        self.active
    }

    #[must_use]
    pub fn active_clip(&self) -> &Clip {
        &self.clips[self.active.0]
    }

    #[must_use]
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(id.0)
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClipId, Playback};
    use crate::animation::{
        Animation, BoneChannel, Clip, Interpolation, Keyframe, Skeleton, Trs,
    };
    use crate::util;
    use nalgebra_glm as glm;
    use std::sync::Arc;

    const EPSILON: f32 = 0.0005_f32;

    fn slide_clip(name: &str) -> Clip {
        let skeleton = Arc::new(Skeleton::from_bind_pose(
            "test",
            &[("root", None, Trs::default())],
        ));
        let mut channel = BoneChannel::new(Interpolation::Linear);
        channel.translations = vec![
            Keyframe::new(0.0, glm::Vec3::zeros()),
            Keyframe::new(2.0, glm::vec3(4.0, 0.0, 0.0)),
        ];
        let animation = Animation::new(name, 2.0, 1.0).with_channel(0, channel);
        Clip::new(skeleton, animation).unwrap()
    }

    fn root_x(playback: &Playback) -> f32 {
        util::transform(&glm::Vec3::zeros(), &playback.final_matrices()[0]).x
    }

    #[test]
    fn new_requires_clip() {
        assert!(Playback::new(Vec::new()).is_err());
        let playback = Playback::new(vec![slide_clip("a")]).unwrap();
        assert_eq!(playback.final_matrices().len(), 1);
    }

    #[test]
    fn tick_loops() {
        let mut playback = Playback::new(vec![slide_clip("a")]).unwrap();
        playback.tick(0.5);
        assert!((root_x(&playback) - 1.0).abs() < EPSILON);
        playback.tick(2.0);
        assert!((root_x(&playback) - 1.0).abs() < EPSILON);
        assert!((playback.elapsed() - 2.5).abs() < EPSILON);
    }

    #[test]
    fn tick_ignores_bad_delta() {
        let mut playback = Playback::new(vec![slide_clip("a")]).unwrap();
        playback.tick(0.25);
        playback.tick(-3.0);
        playback.tick(f32::NAN);
        assert!((playback.elapsed() - 0.25).abs() < EPSILON);
        assert!((root_x(&playback) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn switch_resets_elapsed() {
        let mut playback =
            Playback::new(vec![slide_clip("a"), slide_clip("b")]).unwrap();
        playback.tick(1.2);
        playback.switch_to(ClipId(1)).unwrap();
        assert_eq!(playback.active(), ClipId(1));
        assert!(playback.elapsed().abs() < EPSILON);
        assert_eq!(playback.active_clip().name(), "b");
        assert!(playback.switch_to(ClipId(5)).is_err());
        assert_eq!(playback.active(), ClipId(1));
    }

    #[test]
    fn empty_skeleton_does_not_fail() {
        let skeleton = Arc::new(Skeleton::new("empty", Vec::new()));
        let clip =
            Clip::new(skeleton, Animation::new("empty", 1.0, 1.0)).unwrap();
        let mut playback = Playback::new(vec![clip]).unwrap();
        playback.tick(0.1);
        playback.tick(0.1);
        assert!(playback.final_matrices().is_empty());
    }
}
