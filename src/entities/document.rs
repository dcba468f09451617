//! Document: the cue track being edited plus its on-disk identity.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::entities::cue::CueTrack;
use crate::entities::vtt;

/// One open caption document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Document {
    pub track: CueTrack,
    pub path: Option<PathBuf>,
    /// Unsaved changes since load/save.
    #[serde(skip)]
    pub dirty: bool,
    /// Current playhead time in seconds. Playback itself lives outside
    /// this tool; the playhead only drives the active-cue highlight.
    pub playhead: f64,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let track = vtt::parse(&raw).with_context(|| format!("parsing {}", path.display()))?;
        info!("loaded {} cues from {}", track.len(), path.display());
        Ok(Self {
            track,
            path: Some(path.to_path_buf()),
            dirty: false,
            playhead: 0.0,
        })
    }

    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, vtt::format(&self.track))
            .with_context(|| format!("writing {}", path.display()))?;
        info!("saved {} cues to {}", self.track.len(), path.display());
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Index of the cue under the playhead, if any.
    pub fn active_cue(&self) -> Option<usize> {
        self.track.active_cue_at(self.playhead)
    }

    pub fn title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        if self.dirty {
            format!("{}*", name)
        } else {
            name
        }
    }
}
