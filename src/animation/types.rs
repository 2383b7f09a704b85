use crate::{bm_error::BmError, bone_directory::BoneDirectory};
use ahash::{HashMap, HashMapExt};
use nalgebra_glm as glm;
use std::sync::Arc;

/// Translation, rotation and scale of a joint relative to its parent
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trs {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: glm::Vec3::zeros(),
            rotation: glm::Quat::identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Trs {
    #[must_use]
    pub const fn new(
        translation: glm::Vec3,
        rotation: glm::Quat,
        scale: glm::Vec3,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Composes as `T * R * S`
    #[must_use]
    pub fn to_mat4(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scale)
    }
}

/// One joint of a skeleton. The joint's position in `Skeleton::joints` is its
/// bone index, which is also its index into the final bone matrices.
#[derive(Clone, Debug)]
pub struct JointInfo {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub bind: Trs,
    pub inv_bind: glm::Mat4,
}

impl JointInfo {
    #[must_use]
    pub fn new(
        name: &str,
        parent: Option<usize>,
        bind: Trs,
        inv_bind: glm::Mat4,
    ) -> Self {
        Self {
            name: name.to_owned(),
            parent,
            children: Vec::new(),
            bind,
            inv_bind,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Skeleton {
    pub name: String,
    pub joints: Vec<JointInfo>,
}

impl Skeleton {
    /// Creates a skeleton, rebuilding every joint's `children` list from the
    /// `parent` links. Parents that are out of range are left for `validate`
    /// to report.
    #[must_use]
    pub fn new(name: &str, mut joints: Vec<JointInfo>) -> Self {
        for joint in &mut joints {
            joint.children.clear();
        }
        let count = joints.len();
        for index in 0..count {
            if let Some(parent) = joints[index].parent {
                if parent < count && parent != index {
                    joints[parent].children.push(index);
                }
            }
        }
        Self {
            name: name.to_owned(),
            joints,
        }
    }

    /// Creates a skeleton from a bind pose, calculating each inverse bind
    /// matrix from the joint's global bind transform. Joints whose global
    /// transform can't be determined get an identity inverse bind.
    #[must_use]
    pub fn from_bind_pose(name: &str, joints: &[(&str, Option<usize>, Trs)]) -> Self {
        let infos = (0..joints.len())
            .map(|index| {
                let (joint_name, parent, bind) = joints[index];
                let inv_bind = bind_global(joints, index)
                    .and_then(glm::Mat4::try_inverse)
                    .unwrap_or_else(glm::Mat4::identity);
                JointInfo::new(joint_name, parent, bind, inv_bind)
            })
            .collect();
        Self::new(name, infos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Indices of the joints without a parent
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, joint)| joint.parent.is_none())
            .map(|(index, _)| index)
    }

    /// Checks that the hierarchy can be walked: there is at least one joint,
    /// every parent link is in range, every child list agrees with the
    /// parent links, and every joint is reached exactly once from the roots.
    /// Fields are public, so the child lists are checked as well as the
    /// parents.
    ///
    /// # Errors
    /// Returns `BmError::MalformedClip` describing the first problem found
    pub fn validate(&self) -> Result<(), BmError> {
        if self.joints.is_empty() {
            return Err(BmError::MalformedClip(format!(
                "skeleton '{}' has no joints",
                self.name
            )));
        }
        let count = self.joints.len();
        for (index, joint) in self.joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= count || parent == index {
                    return Err(BmError::MalformedClip(format!(
                        "joint '{}' has invalid parent {parent}",
                        joint.name
                    )));
                }
            }
        }
        for (index, joint) in self.joints.iter().enumerate() {
            for &child in &joint.children {
                let parent = self.joints.get(child).and_then(|c| c.parent);
                if parent != Some(index) {
                    return Err(BmError::MalformedClip(format!(
                        "joint '{}' lists {child} as a child",
                        joint.name
                    )));
                }
            }
        }
        let mut reached = vec![false; count];
        let mut stack: Vec<usize> = self.roots().collect();
        while let Some(index) = stack.pop() {
            if reached[index] {
                return Err(BmError::MalformedClip(format!(
                    "joint '{}' is reached more than once",
                    self.joints[index].name
                )));
            }
            reached[index] = true;
            stack.extend(self.joints[index].children.iter().copied());
        }
        if let Some(index) = reached.iter().position(|r| !r) {
            return Err(BmError::MalformedClip(format!(
                "joint '{}' is not reachable from a root",
                self.joints[index].name
            )));
        }
        Ok(())
    }
}

/// Walks up the parent links to get the global bind transform of a joint.
/// Returns `None` for a broken or cyclic chain.
fn bind_global(
    joints: &[(&str, Option<usize>, Trs)],
    index: usize,
) -> Option<glm::Mat4> {
    let mut m = joints[index].2.to_mat4();
    let mut parent = joints[index].1;
    let mut steps = 0;
    while let Some(p) = parent {
        steps += 1;
        if steps > joints.len() {
            return None;
        }
        let (_, next, bind) = joints.get(p)?;
        m = bind.to_mat4() * m;
        parent = *next;
    }
    Some(m)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

#[derive(Clone, Debug, Default)]
pub struct Keyframe<T> {
    pub time: f32,
    pub data: T,
}

impl<T> Keyframe<T> {
    #[must_use]
    pub const fn new(time: f32, data: T) -> Self {
        Self { time, data }
    }
}

/// Keyframes for one bone. Any of the tracks may be empty, in which case the
/// bind pose value is used for that component.
#[derive(Clone, Debug)]
pub struct BoneChannel {
    pub interpolation: Interpolation,
    pub translations: Vec<Keyframe<glm::Vec3>>,
    pub rotations: Vec<Keyframe<glm::Quat>>,
    pub scales: Vec<Keyframe<glm::Vec3>>,
}

impl BoneChannel {
    #[must_use]
    pub const fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            translations: Vec::new(),
            rotations: Vec::new(),
            scales: Vec::new(),
        }
    }
}

/// Keyframe data keyed by bone index. Times are in clip ticks, converted from
/// seconds with `ticks_per_second`.
#[derive(Clone, Debug)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: HashMap<usize, BoneChannel>,
}

impl Animation {
    /// A non-positive `ticks_per_second` is replaced by 1 so that times are
    /// in seconds
    #[must_use]
    pub fn new(name: &str, duration: f32, ticks_per_second: f32) -> Self {
        let ticks_per_second =
            if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
                ticks_per_second
            } else {
                1.0
            };
        Self {
            name: name.to_owned(),
            duration,
            ticks_per_second,
            channels: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, bone: usize, channel: BoneChannel) -> Self {
        self.channels.insert(bone, channel);
        self
    }

    /// Converts elapsed seconds to the looped sampling time in clip ticks.
    /// Clips without a positive duration always sample at 0.
    #[must_use]
    pub fn sample_time(&self, elapsed: f32) -> f32 {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return 0.0;
        }
        (elapsed * self.ticks_per_second).rem_euclid(self.duration)
    }
}

/// An animation bound to the skeleton it was authored for, along with the
/// bone directory built from that skeleton
#[derive(Clone, Debug)]
pub struct Clip {
    skeleton: Arc<Skeleton>,
    animation: Animation,
    directory: BoneDirectory,
}

impl Clip {
    /// # Errors
    /// May return `BmError` if the skeleton has duplicate joint names
    pub fn new(
        skeleton: Arc<Skeleton>,
        animation: Animation,
    ) -> Result<Self, BmError> {
        let directory = BoneDirectory::from_skeleton(&skeleton)?;
        Ok(Self {
            skeleton,
            animation,
            directory,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.animation.name
    }

    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    #[must_use]
    pub const fn directory(&self) -> &BoneDirectory {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::{Animation, JointInfo, Skeleton, Trs};
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0005_f32;

    fn joint(name: &str, parent: Option<usize>) -> JointInfo {
        JointInfo::new(name, parent, Trs::default(), glm::Mat4::identity())
    }

    #[test]
    fn children_from_parents() {
        let skeleton = Skeleton::new(
            "test",
            vec![joint("a", None), joint("b", Some(0)), joint("c", Some(0))],
        );
        assert_eq!(skeleton.joints[0].children, vec![1, 2]);
        assert!(skeleton.validate().is_ok());
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn validate_rejects_cycle() {
        let skeleton = Skeleton::new(
            "test",
            vec![joint("a", None), joint("b", Some(2)), joint("c", Some(1))],
        );
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_parent_and_empty() {
        let skeleton =
            Skeleton::new("test", vec![joint("a", None), joint("b", Some(9))]);
        assert!(skeleton.validate().is_err());
        assert!(Skeleton::new("empty", Vec::new()).validate().is_err());
    }

    #[test]
    fn validate_rejects_child_out_of_range() {
        let mut a = joint("a", None);
        a.children = vec![5];
        let skeleton = Skeleton {
            name: "test".to_owned(),
            joints: vec![a],
        };
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn validate_rejects_cycle_in_children() {
        let mut a = joint("a", None);
        a.children = vec![1];
        let mut b = joint("b", Some(0));
        b.children = vec![0];
        let skeleton = Skeleton {
            name: "test".to_owned(),
            joints: vec![a, b],
        };
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_child() {
        let mut a = joint("a", None);
        a.children = vec![1, 1];
        let skeleton = Skeleton {
            name: "test".to_owned(),
            joints: vec![a, joint("b", Some(0))],
        };
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn bind_pose_inverse() {
        let up = Trs {
            translation: glm::vec3(0.0, 1.0, 0.0),
            ..Trs::default()
        };
        let skeleton = Skeleton::from_bind_pose(
            "test",
            &[("root", None, up), ("tip", Some(0), up)],
        );
        // The tip sits at y = 2 in the bind pose, so its inverse bind moves
        // it back to the origin
        let p = crate::util::transform(
            &glm::vec3(0.0, 2.0, 0.0),
            &skeleton.joints[1].inv_bind,
        );
        let c = glm::equal_eps(&p, &glm::Vec3::zeros(), EPSILON);
        assert!(c.x && c.y && c.z);
    }

    #[test]
    fn sample_time_loops() {
        let animation = Animation::new("test", 2.0, 0.0);
        assert!((animation.sample_time(0.5) - 0.5).abs() < EPSILON);
        assert!((animation.sample_time(2.5) - 0.5).abs() < EPSILON);
        let fast = Animation::new("fast", 10.0, 4.0);
        assert!((fast.sample_time(3.0) - 2.0).abs() < EPSILON);
        let empty = Animation::new("empty", 0.0, 1.0);
        assert!(empty.sample_time(7.0).abs() < EPSILON);
    }
}
