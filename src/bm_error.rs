use crate::types::ClipSlot;
use std::{error, fmt};

/// Unified error type
///
/// None of these are fatal to the frame loop. The per-frame paths log them
/// and continue with a fallback, so they mostly surface from construction
/// functions such as `BoneDirectory::from_entries`, `Clip::new` or
/// `AttachConfig::load`.
#[derive(Debug)]
pub enum BmError {
    BoneNotFound(String),
    InvalidBoneIndex { index: usize, count: usize },
    DuplicateBoneName(String),
    DuplicateBoneIndex(usize),
    MalformedClip(String),
    MissingClip(ClipSlot),
    UnknownClip(usize),
    SerdeYamlError(Box<serde_yaml::Error>),
    StdIoError(std::io::Error),
}

impl error::Error for BmError {}

impl fmt::Display for BmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BoneNotFound(name) => {
                write!(f, "bone '{name}' not found in directory")
            }
            Self::InvalidBoneIndex { index, count } => {
                write!(f, "bone index {index} out of range for {count} bones")
            }
            Self::DuplicateBoneName(name) => {
                write!(f, "bone name '{name}' appears more than once")
            }
            Self::DuplicateBoneIndex(index) => {
                write!(f, "bone index {index} appears more than once")
            }
            Self::MalformedClip(reason) => write!(f, "malformed clip: {reason}"),
            Self::MissingClip(slot) => write!(f, "no clip for {slot:?} slot"),
            Self::UnknownClip(id) => write!(f, "clip {id} does not exist"),
            Self::SerdeYamlError(e) => write!(f, "serde_yaml::Error: {e}"),
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
        }
    }
}

impl From<serde_yaml::Error> for BmError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for BmError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}
