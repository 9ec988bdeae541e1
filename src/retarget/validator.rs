use crate::animation::clip::AnimationClip;
use crate::vrm::Avatar;

/// Compatibility ratio below which a clip earns a warning. Playback still
/// proceeds: a partially compatible clip beats a frozen avatar.
pub const COMPAT_WARN_RATIO: f32 = 0.10;

/// Name prefixes of auxiliary bones expected to have no match on a VRM
/// humanoid: spring/secondary physics chains, hair, clothing accessories.
/// Tracks targeting these are excluded from the invalid count.
const DEFAULT_AUX_PREFIXES: [&str; 7] = [
    "J_Sec_",
    "J_Opt_",
    "J_Adj_",
    "Hair",
    "Skirt",
    "Bust",
    "Sleeve",
];

/// Recognizes target-format-specific auxiliary joints by name prefix.
#[derive(Debug, Clone)]
pub struct AuxBoneClassifier {
    prefixes: Vec<String>,
}

impl Default for AuxBoneClassifier {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_AUX_PREFIXES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl AuxBoneClassifier {
    #[must_use]
    pub fn with_prefixes(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    #[must_use]
    pub fn is_auxiliary(&self, joint_name: &str) -> bool {
        self.prefixes.iter().any(|p| joint_name.starts_with(p.as_str()))
    }
}

/// Per-clip track classification counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatReport {
    /// Tracks whose joint exists on the model.
    pub valid: usize,
    /// Tracks whose joint is missing.
    pub invalid: usize,
    /// Tracks targeting auxiliary joints, excluded from the ratio.
    pub ignored: usize,
}

impl CompatReport {
    /// `valid / (valid + invalid)`, in `[0, 1]`. An empty clip (or one
    /// consisting solely of auxiliary tracks) reports 0.0 rather than NaN.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        let total = self.valid + self.invalid;
        if total == 0 {
            0.0
        } else {
            self.valid as f32 / total as f32
        }
    }

    #[must_use]
    pub fn counted(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Classifies every track of `clip` against the joints present on the
/// avatar (scene node names and humanoid bone names both count). A ratio
/// under [`COMPAT_WARN_RATIO`] logs a warning; it is never a hard failure.
#[must_use]
pub fn validate_clip(
    clip: &AnimationClip,
    avatar: &Avatar,
    classifier: &AuxBoneClassifier,
) -> CompatReport {
    let mut report = CompatReport::default();

    for track in &clip.tracks {
        let joint = track.target.node_name.as_str();
        if avatar.has_joint(joint) {
            report.valid += 1;
        } else if classifier.is_auxiliary(joint) {
            report.ignored += 1;
        } else {
            report.invalid += 1;
        }
    }

    if !clip.tracks.is_empty() && report.ratio() < COMPAT_WARN_RATIO {
        log::warn!(
            "clip '{}' barely matches avatar '{}': {}/{} tracks resolve ({} auxiliary ignored)",
            clip.name,
            avatar.name,
            report.valid,
            report.counted(),
            report.ignored
        );
    }

    report
}
