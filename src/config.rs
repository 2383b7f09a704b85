use crate::{bm_error::BmError, util};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};

/// A hand tuned offset built as `translate * rotate * scale`
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct OffsetConfig {
    pub translation: glm::Vec3,
    pub rotation_degrees: f32,
    pub rotation_axis: glm::Vec3,
    pub scale: f32,
}

impl Default for OffsetConfig {
    /// Seats the prop in the character's right hand
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, -0.05, 0.05),
            rotation_degrees: -90.0,
            rotation_axis: glm::vec3(1.0, 0.0, 0.0),
            scale: 0.5,
        }
    }
}

impl OffsetConfig {
    #[must_use]
    pub fn to_mat4(&self) -> glm::Mat4 {
        util::offset_matrix(
            &self.translation,
            self.rotation_degrees,
            &self.rotation_axis,
            self.scale,
        )
    }
}

/// Tuning values for the prop and the character. Any field missing from a
/// YAML file takes its default.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct AttachConfig {
    /// Bone the prop attaches to
    pub bone_name: String,
    /// Seconds spent floating before the prop attaches
    pub arm_duration: f32,
    /// Prop pose relative to the bone once attached
    pub attach_offset: OffsetConfig,
    /// Prop position relative to the model while floating
    pub float_translation: glm::Vec3,
    pub float_scale: f32,
    /// Model world placement
    pub model_translation: glm::Vec3,
    pub model_scale: f32,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            bone_name: "mixamorig_RightHandThumb3".to_owned(),
            arm_duration: 2.5,
            attach_offset: OffsetConfig::default(),
            float_translation: glm::vec3(0.0, 0.125, 0.08),
            float_scale: 0.005,
            model_translation: glm::vec3(0.0, -0.4, 0.0),
            model_scale: 0.5,
        }
    }
}

impl AttachConfig {
    /// # Errors
    /// May return `BmError`
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BmError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a YAML configuration file
    ///
    /// # Errors
    /// May return `BmError`
    pub fn load(path: &Path) -> Result<Self, BmError> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// # Errors
    /// May return `BmError`
    pub fn to_yaml_string(&self) -> Result<String, BmError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// World matrix of the skinned model
    #[must_use]
    pub fn model_matrix(&self) -> glm::Mat4 {
        util::translate_scale(&self.model_translation, self.model_scale)
    }

    /// Prop matrix relative to the model while floating
    #[must_use]
    pub fn float_matrix(&self) -> glm::Mat4 {
        util::translate_scale(&self.float_translation, self.float_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::AttachConfig;
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0001_f32;

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = AttachConfig::from_yaml_str(
            "bone_name: mixamorig_LeftHand\narm_duration: 1.0\n",
        )
        .unwrap();
        assert_eq!(config.bone_name, "mixamorig_LeftHand");
        assert!((config.arm_duration - 1.0).abs() < EPSILON);
        assert!((config.float_scale - 0.005).abs() < EPSILON);
        assert_eq!(config.attach_offset, super::OffsetConfig::default());
    }

    #[test]
    fn vectors_from_yaml() {
        let config = AttachConfig::from_yaml_str(
            "float_translation: [1.0, 2.0, 3.0]\n\
             attach_offset:\n  scale: 2.0\n",
        )
        .unwrap();
        assert_eq!(config.float_translation, glm::vec3(1.0, 2.0, 3.0));
        assert!((config.attach_offset.scale - 2.0).abs() < EPSILON);
        assert!((config.attach_offset.rotation_degrees + 90.0).abs() < EPSILON);
    }

    #[test]
    fn yaml_round_trip() {
        let config = AttachConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(AttachConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn bad_yaml_is_an_error() {
        assert!(AttachConfig::from_yaml_str("arm_duration: [oops").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::path::Path::new("./does/not/exist.yaml");
        assert!(AttachConfig::load(path).is_err());
    }
}
