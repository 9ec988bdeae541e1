use crate::animation::clip::{AnimationClip, TargetPath};
use crate::vrm::model::{Avatar, NodeKey};

/// Binds track `track_index` of a clip to a property of an avatar node.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node: NodeKey,
    pub path: TargetPath,
}

/// Resolves each track's target name to a node on the avatar.
///
/// Names resolve first against actual scene node names (retargeted Mixamo
/// clips carry those) and then against the VRM humanoid bone table (VRMA
/// idle clips name humanoid bones directly). Unresolvable tracks are left
/// unbound; the validator has already quantified those.
#[must_use]
pub fn bind(avatar: &Avatar, clip: &AnimationClip) -> Vec<PropertyBinding> {
    let mut bindings = Vec::with_capacity(clip.tracks.len());

    for (track_index, track) in clip.tracks.iter().enumerate() {
        let name = &track.target.node_name;
        let resolved = avatar.node_by_name(name).or_else(|| avatar.humanoid_node(name));

        if let Some(node) = resolved {
            bindings.push(PropertyBinding {
                track_index,
                node,
                path: track.target.path,
            });
        } else {
            log::debug!("clip '{}': no node for track target '{name}'", clip.name);
        }
    }

    bindings
}
