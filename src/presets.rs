//! Durable watermark presets and last-used preferences.
//!
//! Presets live in a single versioned JSON document on disk. Reading a
//! missing, malformed, or wrong-version document is non-fatal and falls
//! back to defaults; only explicit deletion removes a saved preset.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::watermark::{Anchor, Color, WatermarkSpec};

/// Current on-disk schema version.
const STORE_VERSION: u32 = 1;

/// Visual category of a watermark preset, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    /// Social media handle.
    Social,
    /// Copyright notice.
    Copyright,
    /// Brand mark.
    Brand,
    /// User-defined preset.
    Custom,
}

/// A named, reusable watermark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkPreset {
    /// Unique identifier; user presets get a generated `custom-*` id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display category.
    pub kind: PresetKind,
    /// The watermark this preset applies.
    pub spec: WatermarkSpec,
}

/// The built-in watermark presets, in display order.
#[must_use]
pub fn builtin_presets() -> Vec<WatermarkPreset> {
    vec![
        WatermarkPreset {
            id: "instagram".to_string(),
            name: "Instagram Handle".to_string(),
            kind: PresetKind::Social,
            spec: WatermarkSpec {
                text: "@yourhandle".to_string(),
                anchor: Anchor::BottomRight,
                font_size: 20.0,
                opacity: 80,
                color: Color::WHITE,
            },
        },
        WatermarkPreset {
            id: "copyright".to_string(),
            name: "Copyright Notice".to_string(),
            kind: PresetKind::Copyright,
            spec: WatermarkSpec {
                text: "\u{a9} 2024 Your Name".to_string(),
                anchor: Anchor::BottomLeft,
                font_size: 16.0,
                opacity: 60,
                color: Color::WHITE,
            },
        },
        WatermarkPreset {
            id: "brand".to_string(),
            name: "Brand Watermark".to_string(),
            kind: PresetKind::Brand,
            spec: WatermarkSpec {
                text: "Selfie2Snap".to_string(),
                anchor: Anchor::BottomRight,
                font_size: 24.0,
                opacity: 70,
                color: Color {
                    r: 0xa8,
                    g: 0x55,
                    b: 0xf7,
                },
            },
        },
        WatermarkPreset {
            id: "minimal".to_string(),
            name: "Minimal Signature".to_string(),
            kind: PresetKind::Custom,
            spec: WatermarkSpec {
                text: "\u{2022}".to_string(),
                anchor: Anchor::BottomRight,
                font_size: 32.0,
                opacity: 40,
                color: Color::WHITE,
            },
        },
    ]
}

/// The versioned on-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    presets: Vec<WatermarkPreset>,
    #[serde(default)]
    preferences: Option<WatermarkSpec>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            presets: Vec::new(),
            preferences: None,
        }
    }
}

/// Loaded store contents: user presets plus last-used preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// User-saved presets (built-ins are not persisted).
    pub presets: Vec<WatermarkPreset>,
    /// The last-used watermark settings, or the defaults.
    pub preferences: WatermarkSpec,
}

/// File-backed preset store.
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    /// Create a store over the given JSON file path.
    ///
    /// The file is created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current state, falling back to defaults if the file is
    /// missing, unparseable, or from an unknown schema version.
    #[must_use]
    pub fn load(&self) -> StoreState {
        let doc = self.read_document();
        StoreState {
            presets: doc.presets,
            preferences: doc.preferences.unwrap_or_default(),
        }
    }

    /// Persist a new user preset and return it (with its generated id).
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save_preset(&self, name: &str, spec: &WatermarkSpec) -> Result<WatermarkPreset> {
        let mut doc = self.read_document();
        let preset = WatermarkPreset {
            id: unique_preset_id(&doc.presets),
            name: name.to_string(),
            kind: PresetKind::Custom,
            spec: spec.clone(),
        };
        doc.presets.push(preset.clone());
        self.write_document(&doc)?;
        Ok(preset)
    }

    /// Delete a user preset by id. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written back.
    pub fn delete_preset(&self, id: &str) -> Result<bool> {
        let mut doc = self.read_document();
        let before = doc.presets.len();
        doc.presets.retain(|p| p.id != id);
        let removed = doc.presets.len() != before;
        if removed {
            self.write_document(&doc)?;
        }
        Ok(removed)
    }

    /// Persist the last-used watermark settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save_preferences(&self, spec: &WatermarkSpec) -> Result<()> {
        let mut doc = self.read_document();
        doc.preferences = Some(spec.clone());
        self.write_document(&doc)
    }

    fn read_document(&self) -> StoreDocument {
        let Ok(bytes) = std::fs::read(&self.path) else {
            return StoreDocument::default();
        };
        match serde_json::from_slice::<StoreDocument>(&bytes) {
            Ok(doc) if doc.version == STORE_VERSION => doc,
            _ => StoreDocument::default(),
        }
    }

    fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Generate a `custom-{millis}` id, bumping until it is unique.
fn unique_preset_id(existing: &[WatermarkPreset]) -> String {
    let mut millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    loop {
        let id = format!("custom-{millis}");
        if !existing.iter().any(|p| p.id == id) {
            return id;
        }
        millis += 1;
    }
}
