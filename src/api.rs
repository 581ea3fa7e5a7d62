//! # Public API
//!
//! This module contains the main entry points for the score-timeline library.
//!
//! ## Conversion Functions
//!
//! - [`convert_score()`] - MusicXML to sorted note events
//! - [`chord_progression()`] - MusicXML to the chord progression
//! - [`convert()`] - Both outputs from a single parse
//! - [`convert_with_yaml()`] - Same as [`convert()`], options read from YAML
//!
//! Every function is pure: one call takes the whole document and returns a
//! complete result. Calls share no state and may run on any thread.
//!
//! ## Typical Usage
//!
//! ```rust
//! use score_timeline::{convert_score, ConvertOptions, Hand};
//!
//! let xml = r#"<score-partwise><part id="P1"><measure number="1">
//!   <attributes><divisions>1</divisions></attributes>
//!   <sound tempo="60"/>
//!   <note><pitch><step>A</step><octave>4</octave></pitch><duration>2</duration></note>
//! </measure></part></score-partwise>"#;
//!
//! let notes = convert_score(xml, &ConvertOptions::default())?;
//! assert_eq!(notes[0].id, "note-0");
//! assert_eq!(notes[0].pitch, 69);
//! assert_eq!(notes[0].duration, Some(2.0));
//! assert_eq!(notes[0].hand, Hand::Right);
//! # Ok::<(), score_timeline::TimelineError>(())
//! ```
//!
//! ## Forcing a Tempo
//!
//! ```rust
//! use score_timeline::{convert_score, ConvertOptions};
//!
//! let xml = r#"<score-partwise><part id="P1"><measure number="1">
//!   <direction><direction-type><words>Adagio</words></direction-type><sound tempo="40"/></direction>
//!   <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
//! </measure></part></score-partwise>"#;
//!
//! let options = ConvertOptions::default().with_tempo_override(Some(120.0));
//! let notes = convert_score(xml, &options)?;
//! assert_eq!(notes[0].duration, Some(0.5));
//! # Ok::<(), score_timeline::TimelineError>(())
//! ```

use crate::error::TimelineError;
use crate::options::ConvertOptions;
use crate::parser::{force_tempo, override_tempo, parse};
use crate::timeline::{
    build_note_events, build_progression, build_timeline, NoteEvent, ProgressionEntry, Timeline,
};
use crate::ScoreDocument;

/// Apply the tempo override (if any) and parse
fn prepare(xml: &str, options: &ConvertOptions) -> Result<ScoreDocument, TimelineError> {
    options.validate()?;
    match options.tempo_override {
        Some(bpm) => {
            let mut score = parse(&override_tempo(xml, bpm))?;
            force_tempo(&mut score, bpm);
            Ok(score)
        }
        None => parse(xml),
    }
}

/// Convert a MusicXML score into note events.
///
/// # Pipeline
/// 1. Rewrite tempo attributes when `tempo_override` is set
/// 2. Parse the document (metronome marks are forced to the override too)
/// 3. Build the tempo map from the first part
/// 4. Walk every part, expanding graces and ornaments and merging ties
/// 5. Sort by (time, pitch), assign hands and ids
///
/// # Errors
/// Returns [`TimelineError`] if the document is not well-formed partwise
/// MusicXML or the options are invalid. Problems inside individual notes are
/// logged and skipped, never returned.
pub fn convert_score(xml: &str, options: &ConvertOptions) -> Result<Vec<NoteEvent>, TimelineError> {
    let score = prepare(xml, options)?;
    Ok(build_note_events(&score, &options.id_prefix))
}

/// Build the chord progression of a MusicXML score.
///
/// Honours `group_simultaneous_notes` and `skip_harmony_overlay`.
///
/// # Example
/// ```rust
/// use score_timeline::{chord_progression, ConvertOptions};
///
/// let xml = r#"<score-partwise><part id="P1"><measure number="1">
///   <harmony><root><root-step>C</root-step></root><kind>major</kind></harmony>
///   <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
///   <note><chord/><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration></note>
/// </measure></part></score-partwise>"#;
///
/// let options = ConvertOptions::default().grouped(true);
/// let entries = chord_progression(xml, &options)?;
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].chord(), "C+E");
/// assert_eq!(entries[0].text.as_deref(), Some("C"));
/// # Ok::<(), score_timeline::TimelineError>(())
/// ```
pub fn chord_progression(
    xml: &str,
    options: &ConvertOptions,
) -> Result<Vec<ProgressionEntry>, TimelineError> {
    let score = prepare(xml, options)?;
    Ok(build_progression(&score, options))
}

/// Convert a MusicXML score into both note events and chord progression.
pub fn convert(xml: &str, options: &ConvertOptions) -> Result<Timeline, TimelineError> {
    let score = prepare(xml, options)?;
    Ok(build_timeline(&score, options))
}

/// [`convert()`] with options given as a YAML document.
///
/// # Example
/// ```rust
/// use score_timeline::convert_with_yaml;
///
/// let xml = r#"<score-partwise><part id="P1"><measure number="1">
///   <note><pitch><step>D</step><octave>4</octave></pitch><duration>1</duration></note>
/// </measure></part></score-partwise>"#;
///
/// let timeline = convert_with_yaml(xml, "id-prefix: \"n\"")?;
/// assert_eq!(timeline.notes[0].id, "n0");
/// # Ok::<(), score_timeline::TimelineError>(())
/// ```
pub fn convert_with_yaml(xml: &str, options_yaml: &str) -> Result<Timeline, TimelineError> {
    let options = ConvertOptions::from_yaml(options_yaml)?;
    convert(xml, &options)
}
