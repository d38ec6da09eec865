use std::path::PathBuf;

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ──────────────────────────────────────────────
// Dock display items
// ──────────────────────────────────────────────

/// Decoded RGBA8 icon pixels, row-major from the top-left corner.
#[derive(Debug, Clone)]
pub struct IconBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// What a dock entry *is*. Equality compares only the identity of the entry
/// (app id, pid, folder path), never the display payload: two pinned-app
/// values with the same id but different names or paths are the same entry.
#[derive(Debug, Clone)]
pub enum DockItemKind {
    PinnedApp {
        app_id: String,
        name: String,
        path: Option<PathBuf>,
    },
    RunningApp {
        pid: u32,
        name: String,
    },
    Divider,
    Folder {
        path: PathBuf,
        name: String,
    },
    Trash,
}

impl PartialEq for DockItemKind {
    fn eq(&self, other: &Self) -> bool {
        use DockItemKind::*;
        match (self, other) {
            (PinnedApp { app_id: a, .. }, PinnedApp { app_id: b, .. }) => a == b,
            (RunningApp { pid: a, .. }, RunningApp { pid: b, .. }) => a == b,
            (Divider, Divider) => true,
            (Folder { path: a, .. }, Folder { path: b, .. }) => a == b,
            (Trash, Trash) => true,
            _ => false,
        }
    }
}

impl Eq for DockItemKind {}

/// A displayable dock entry. The icon is optional: items whose image failed
/// to decode still occupy their layout slot and simply render nothing.
#[derive(Debug, Clone)]
pub struct DockItem {
    pub kind: DockItemKind,
    pub icon: Option<IconBitmap>,
    pub label: String,
}

impl DockItem {
    pub fn new(kind: DockItemKind, icon: Option<IconBitmap>, label: impl Into<String>) -> Self {
        Self {
            kind,
            icon,
            label: label.into(),
        }
    }

    pub fn divider() -> Self {
        Self {
            kind: DockItemKind::Divider,
            icon: None,
            label: String::new(),
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self.kind, DockItemKind::Divider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_app_equality_ignores_payload() {
        let a = DockItemKind::PinnedApp {
            app_id: "org.mozilla.firefox".into(),
            name: "Firefox".into(),
            path: Some(PathBuf::from("/usr/bin/firefox")),
        };
        let b = DockItemKind::PinnedApp {
            app_id: "org.mozilla.firefox".into(),
            name: "Firefox Nightly".into(),
            path: None,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn pinned_app_inequality_on_id() {
        let a = DockItemKind::PinnedApp {
            app_id: "org.mozilla.firefox".into(),
            name: "Firefox".into(),
            path: None,
        };
        let b = DockItemKind::PinnedApp {
            app_id: "org.gnome.Terminal".into(),
            name: "Firefox".into(),
            path: None,
        };
        assert_ne!(a, b);
    }

    #[test]
    fn folder_equality_is_by_path() {
        let a = DockItemKind::Folder {
            path: PathBuf::from("/home/u/Downloads"),
            name: "Downloads".into(),
        };
        let b = DockItemKind::Folder {
            path: PathBuf::from("/home/u/Downloads"),
            name: "DL".into(),
        };
        let c = DockItemKind::Folder {
            path: PathBuf::from("/home/u/Music"),
            name: "Downloads".into(),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unit_kinds_compare_by_discriminant() {
        assert_eq!(DockItemKind::Divider, DockItemKind::Divider);
        assert_eq!(DockItemKind::Trash, DockItemKind::Trash);
        assert_ne!(DockItemKind::Divider, DockItemKind::Trash);
    }

    #[test]
    fn running_app_equality_is_by_pid() {
        let a = DockItemKind::RunningApp { pid: 4021, name: "term".into() };
        let b = DockItemKind::RunningApp { pid: 4021, name: "terminal".into() };
        let c = DockItemKind::RunningApp { pid: 4022, name: "term".into() };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
