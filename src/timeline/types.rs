//! Timeline data type definitions
//!
//! This module defines the serialisable output of the compiler: timed note events
//! for judging and playback, and the chord progression shown alongside them.

use serde::Serialize;

/// Which hand plays a note
///
/// Staff 1 is the right hand and lower staves the left. A pitch sounding on two
/// staves at the same instant is played by both.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
    Both,
}

impl Hand {
    pub fn for_staff(staff: u32) -> Self {
        if staff >= 2 {
            Hand::Left
        } else {
            Hand::Right
        }
    }
}

/// A single sounding note on the timeline
///
/// # Fields
/// - `id`: `"{prefix}{index}"`, the index being the position after sorting
/// - `time`: Onset in seconds from the start of the score
/// - `pitch`: MIDI number
/// - `duration`: Length in seconds; omitted for zero-length notes
/// - `note_name`: Written spelling for notes in the score, grace notes included
///   ("F#4"); key-aware spelling for generated ornament neighbours
/// - `hand`: Left, right, or both
/// - `is_ornament`: Set for notes produced by ornament or grace expansion
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub id: String,
    pub time: f64,
    pub pitch: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub note_name: String,
    pub hand: Hand,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_ornament: bool,
}

/// One onset (or harmony marker) in the chord progression
///
/// # Fields
/// - `bar`: 1-based measure index
/// - `beats`: 1-based beat within the bar, counted in the time signature's beat unit
/// - `content`: What sounds at the onset (see [`EntryContent`]), flattened into
///   the entry when serialised
/// - `text`: Harmony symbol active at this onset
/// - `lyric_display`: Most recent lyric text up to this onset
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionEntry {
    pub bar: u32,
    pub beats: f64,
    #[serde(flatten)]
    pub content: EntryContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyric_display: Option<String>,
}

impl ProgressionEntry {
    pub fn chord(&self) -> &str {
        match &self.content {
            EntryContent::Note { chord, .. }
            | EntryContent::Group { chord, .. }
            | EntryContent::Harmony { chord } => chord,
        }
    }
}

/// Pitch content of a progression entry
///
/// ```text
/// Note    -> {"chord": "C#", "octave": 4}
/// Group   -> {"chord": "C+E+G", "notes": ["C4", "E4", "G4"]}
/// Harmony -> {"chord": "G7"}
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum EntryContent {
    /// A single note: its pitch class and octave
    Note { chord: String, octave: i8 },
    /// Every note at an onset, lowest first, with the pitch classes joined by "+"
    Group { chord: String, notes: Vec<String> },
    /// A harmony marker with no note starting under it
    Harmony { chord: String },
}

/// Both outputs of a single compilation
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub notes: Vec<NoteEvent>,
    pub progression: Vec<ProgressionEntry>,
}

/// Note produced by the walker before sorting and id assignment
#[derive(Debug, Clone, PartialEq)]
pub struct RawNote {
    pub time: f64,
    pub pitch: u8,
    pub name: String,
    /// Seconds
    pub duration: f64,
    pub staff: u32,
    pub is_ornament: bool,
}
