//! Conversion options.
//!
//! Options can be built in code or read from a YAML document with kebab-case keys:
//!
//! ```yaml
//! id-prefix: "n"
//! group-simultaneous-notes: true
//! skip-harmony-overlay: false
//! tempo-override: 96
//! ```
//!
//! Every key is optional. The camelCase spellings used by JSON callers
//! (`idPrefix`, `groupSimultaneousNotes`, ...) are accepted as well.

use crate::error::TimelineError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ID_PREFIX: &str = "note-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConvertOptions {
    /// Prefix of generated note ids ("note-0", "note-1", ...)
    #[serde(alias = "idPrefix")]
    pub id_prefix: String,
    /// Emit one progression entry per onset instead of one per note
    #[serde(alias = "groupSimultaneousNotes")]
    pub group_simultaneous_notes: bool,
    /// Ignore `<harmony>` labels in the progression
    #[serde(alias = "skipHarmonyOverlay")]
    pub skip_harmony_overlay: bool,
    /// Replace every `tempo="..."` attribute in the source before parsing
    #[serde(alias = "tempoOverride")]
    pub tempo_override: Option<f64>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            group_simultaneous_notes: false,
            skip_harmony_overlay: false,
            tempo_override: None,
        }
    }
}

impl ConvertOptions {
    /// Read options from YAML.
    ///
    /// # Example
    /// ```
    /// use score_timeline::ConvertOptions;
    ///
    /// let options = ConvertOptions::from_yaml("group-simultaneous-notes: true").unwrap();
    /// assert!(options.group_simultaneous_notes);
    /// assert_eq!(options.id_prefix, "note-");
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, TimelineError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: Self =
            serde_yaml::from_str(content).map_err(|e| TimelineError::OptionsError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        match self.tempo_override {
            Some(bpm) if !(bpm.is_finite() && bpm > 0.0) => Err(TimelineError::OptionsError(
                format!("tempo-override must be a positive number, got {}", bpm),
            )),
            _ => Ok(()),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    pub fn grouped(mut self, group: bool) -> Self {
        self.group_simultaneous_notes = group;
        self
    }

    pub fn without_harmony(mut self, skip: bool) -> Self {
        self.skip_harmony_overlay = skip;
        self
    }

    pub fn with_tempo_override(mut self, bpm: Option<f64>) -> Self {
        self.tempo_override = bpm;
        self
    }
}
