// Dock item source: a read-only query run once at startup, before the first
// frame. Pinned apps come from dock.json in the config dir; a divider and
// the Downloads/Trash section round out the list, mirroring the usual dock
// grouping. Desktop-environment process enumeration is not attempted here;
// sources that can produce it use the RunningApp kind.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use glyphfall_core::{DockItem, DockItemKind, IconBitmap};

#[derive(Debug, Error)]
pub enum DockConfigError {
    #[error("failed to read dock config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dock config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One pinned-app entry in dock.json.
#[derive(Debug, Deserialize)]
struct PinnedEntry {
    id: String,
    name: String,
    #[serde(default)]
    icon: Option<PathBuf>,
    #[serde(default)]
    path: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("glyphfall").join("dock.json"))
}

fn load_pinned(path: &Path) -> Result<Vec<PinnedEntry>, DockConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Decode an icon image to RGBA8. Failures are isolated per item: the item
/// keeps its layout slot and simply renders nothing.
fn load_icon(path: &Path) -> Option<IconBitmap> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            Some(IconBitmap {
                width: rgba.width(),
                height: rgba.height(),
                rgba: rgba.into_raw(),
            })
        }
        Err(e) => {
            log::warn!("failed to decode icon {}: {}", path.display(), e);
            None
        }
    }
}

/// Build the ordered dock item list. Blocking IO is acceptable here because
/// this runs exactly once during setup.
pub fn fetch_dock_items() -> Vec<DockItem> {
    let mut items = Vec::new();

    if let Some(path) = config_path() {
        match load_pinned(&path) {
            Ok(pinned) => {
                for entry in pinned {
                    let icon = entry.icon.as_deref().and_then(load_icon);
                    let label = entry.name.clone();
                    items.push(DockItem::new(
                        DockItemKind::PinnedApp {
                            app_id: entry.id,
                            name: entry.name,
                            path: entry.path,
                        },
                        icon,
                        label,
                    ));
                }
            }
            Err(DockConfigError::Io(_)) => {
                log::info!("no dock config at {}, pinned section empty", path.display());
            }
            Err(e) => {
                log::warn!("dock config unusable: {}", e);
            }
        }
    }

    items.push(DockItem::divider());

    if let Some(downloads) = dirs::download_dir() {
        items.push(DockItem::new(
            DockItemKind::Folder {
                path: downloads,
                name: "Downloads".into(),
            },
            None,
            "Downloads",
        ));
    }
    items.push(DockItem::new(DockItemKind::Trash, None, "Trash"));

    log::info!("dock source produced {} items", items.len());
    items
}
