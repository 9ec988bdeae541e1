//! Mixamo → VRM animation retargeting.
//!
//! Not a general retargeting engine: a fixed name table, one axis
//! correction on the hip root, and a compatibility report. Clips whose
//! joints the model lacks degrade to fewer tracks, never to errors.

pub mod bones;
pub mod retargeter;
pub mod validator;

pub use bones::{BoneMap, BoneMapCache, MIXAMO_HIPS, MIXAMO_TO_VRM};
pub use retargeter::{RETARGET_SUFFIX, hips_yaw_correction, retarget};
pub use validator::{AuxBoneClassifier, COMPAT_WARN_RATIO, CompatReport, validate_clip};
