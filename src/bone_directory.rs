use crate::{animation::Skeleton, bm_error::BmError};
use ahash::{HashMap, HashMapExt};
use nalgebra_glm as glm;

/// A bone's index into the final bone matrices and its inverse bind (offset)
/// matrix
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneEntry {
    pub id: usize,
    pub offset: glm::Mat4,
}

/// Read-only lookup from bone name to `BoneEntry`, built once per skeleton.
///
/// Every index is unique and less than the bone count. A name that isn't
/// present is an error, never a default entry, so callers decide on their
/// own fallback.
#[derive(Clone, Debug, Default)]
pub struct BoneDirectory {
    entries: HashMap<String, BoneEntry>,
    names: Vec<Option<String>>,
}

impl BoneDirectory {
    /// Builds the directory from a skeleton's joints. The joint index is the
    /// bone index and the joint's inverse bind matrix is the offset.
    ///
    /// # Errors
    /// Returns `BmError::DuplicateBoneName` if two joints share a name
    pub fn from_skeleton(skeleton: &Skeleton) -> Result<Self, BmError> {
        Self::from_entries(
            skeleton.joints.iter().enumerate().map(|(id, joint)| {
                (
                    joint.name.clone(),
                    BoneEntry {
                        id,
                        offset: joint.inv_bind,
                    },
                )
            }),
            skeleton.len(),
        )
    }

    /// Builds the directory from explicit entries for a skeleton with
    /// `bone_count` bones. Not every bone needs an entry.
    ///
    /// # Errors
    /// May return `BmError` for an index out of range, a repeated index or a
    /// repeated name
    pub fn from_entries<I>(entries: I, bone_count: usize) -> Result<Self, BmError>
    where
        I: IntoIterator<Item = (String, BoneEntry)>,
    {
        let mut map = HashMap::new();
        let mut names = vec![None; bone_count];
        for (name, entry) in entries {
            let Some(slot) = names.get_mut(entry.id) else {
                return Err(BmError::InvalidBoneIndex {
                    index: entry.id,
                    count: bone_count,
                });
            };
            if slot.is_some() {
                return Err(BmError::DuplicateBoneIndex(entry.id));
            }
            if map.contains_key(&name) {
                return Err(BmError::DuplicateBoneName(name));
            }
            *slot = Some(name.clone());
            map.insert(name, entry);
        }
        Ok(Self {
            entries: map,
            names,
        })
    }

    /// Looks up a bone by name
    ///
    /// # Errors
    /// Returns `BmError::BoneNotFound` if the name isn't in the directory
    pub fn resolve(&self, name: &str) -> Result<&BoneEntry, BmError> {
        self.entries
            .get(name)
            .ok_or_else(|| BmError::BoneNotFound(name.to_owned()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Name of the bone with index `id`, if it has an entry
    #[must_use]
    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.names.get(id).and_then(Option::as_deref)
    }

    /// Number of bones in the skeleton this directory was built for
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.names.len()
    }

    /// Number of named entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{BoneDirectory, BoneEntry};
    use crate::{
        animation::{Skeleton, Trs},
        bm_error::BmError,
    };
    use nalgebra_glm as glm;

    fn entry(id: usize) -> BoneEntry {
        BoneEntry {
            id,
            offset: glm::translation(&glm::vec3(0.0, -(id as f32), 0.0)),
        }
    }

    #[test]
    fn resolve() {
        let directory = BoneDirectory::from_entries(
            [("hips".to_owned(), entry(0)), ("thumb".to_owned(), entry(2))],
            3,
        )
        .unwrap();
        assert_eq!(directory.resolve("thumb").unwrap().id, 2);
        assert_eq!(directory.name_of(0), Some("hips"));
        assert_eq!(directory.name_of(1), None);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.bone_count(), 3);
    }

    #[test]
    fn missing_name_is_an_error() {
        let directory =
            BoneDirectory::from_entries([("hips".to_owned(), entry(0))], 1)
                .unwrap();
        assert!(matches!(
            directory.resolve("thumb"),
            Err(BmError::BoneNotFound(name)) if name == "thumb"
        ));
        assert!(!directory.contains("thumb"));
    }

    #[test]
    fn rejects_bad_entries() {
        let out_of_range =
            BoneDirectory::from_entries([("a".to_owned(), entry(4))], 2);
        assert!(matches!(
            out_of_range,
            Err(BmError::InvalidBoneIndex { index: 4, count: 2 })
        ));
        let repeated_index = BoneDirectory::from_entries(
            [("a".to_owned(), entry(1)), ("b".to_owned(), entry(1))],
            2,
        );
        assert!(matches!(repeated_index, Err(BmError::DuplicateBoneIndex(1))));
        let repeated_name = BoneDirectory::from_entries(
            [("a".to_owned(), entry(0)), ("a".to_owned(), entry(1))],
            2,
        );
        assert!(matches!(repeated_name, Err(BmError::DuplicateBoneName(_))));
    }

    #[test]
    fn from_skeleton() {
        let skeleton = Skeleton::from_bind_pose(
            "test",
            &[
                ("hips", None, Trs::default()),
                ("hand", Some(0), Trs::default()),
            ],
        );
        let directory = BoneDirectory::from_skeleton(&skeleton).unwrap();
        let hand = directory.resolve("hand").unwrap();
        assert_eq!(hand.id, 1);
        assert_eq!(hand.offset, skeleton.joints[1].inv_bind);
    }
}
