//! Headless wandering demo: loads a VRM avatar plus its animation set and
//! drives the character for a while, printing telemetry when the debug
//! flag is on in the config.

use std::path::Path;
use std::time::Duration;

use hitogata::assets::loader;
use hitogata::assets::manifest::{ClipFormat, ManifestEntry};
use hitogata::config::Config;
use hitogata::errors::Result;
use hitogata::vrm::model::Avatar;
use hitogata::Character;

const FRAME: Duration = Duration::from_millis(16);
const FRAMES: u32 = 600;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = if Path::new(&config_path).exists() {
        Config::from_path(&config_path)?
    } else {
        log::info!("no config at '{config_path}', using defaults");
        Config::default()
    };

    let avatar = Avatar::from_file(&config.model.path)?;
    log::info!(
        "loaded avatar '{}': {} nodes, {} humanoid bones",
        avatar.name,
        avatar.node_count(),
        avatar.humanoid_bones().count()
    );

    let entries = manifest_entries(&config);
    let clips = loader::load_set(&entries, Path::new("."));
    let mut character = Character::new(avatar, clips, &config);

    for frame in 0..FRAMES {
        character.update();
        if config.debug.enabled && frame % 30 == 0 {
            let stats = character.debug_stats();
            println!(
                "[{:>4}] {:?} pos=({:.2}, {:.2}) heading={:.2} clip={} expr={} blink={}",
                frame,
                stats.state,
                stats.position.x,
                stats.position.y,
                stats.heading,
                stats.active_clip.as_deref().unwrap_or("-"),
                stats.active_expressions,
                stats.blinking
            );
        }
        std::thread::sleep(FRAME);
    }

    Ok(())
}

/// Builds loader entries from the config's animation section, sniffing
/// each format from the file extension.
fn manifest_entries(config: &Config) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    if let Some(walk) = &config.animations.walk {
        entries.push(ManifestEntry {
            format: ClipFormat::from_path(&walk.path).unwrap_or(ClipFormat::Fbx),
            path: walk.path.clone(),
            name: walk.name.clone(),
        });
    }
    for idle in &config.animations.idle {
        entries.push(ManifestEntry {
            format: ClipFormat::from_path(&idle.path).unwrap_or(ClipFormat::Vrma),
            path: idle.path.clone(),
            name: idle.name.clone(),
        });
    }
    entries
}
