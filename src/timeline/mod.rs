//! # Timeline Module
//!
//! Turn a parsed score into timed note events and a chord progression.
//!
//! ## Purpose
//! This module converts a [`ScoreDocument`](crate::ast::ScoreDocument) into:
//! 1. **Note events** - every sounding note with an absolute onset and length in
//!    seconds, the hand that plays it, and a stable id
//! 2. **Chord progression** - onsets grouped by bar and beat with harmony and
//!    lyric overlay text, for judging
//!
//! ## Sub-modules
//! - `types` - NoteEvent, ProgressionEntry, Timeline
//! - `tempo` - Tempo map builder and division-to-seconds integrator
//! - `ornament` - Mordent, turn and trill expansion
//! - `grace` - Appoggiatura and acciaccatura expansion
//! - `engine` - The score walker that produces note events
//! - `progression` - The onset walker that produces the chord progression
//!
//! ## Pipeline
//! ```text
//! ScoreDocument
//!   ├── TempoMap::build(first part)      pass 1: tempo events + ramps
//!   ├── engine::build_note_events        pass 2: walk, expand, tie, sort, hands
//!   └── progression::build_progression   independent onset walk
//! ```
//!
//! ## Timing
//!
//! Onsets are measured from the start of each measure. A measure starts where the
//! previous one ended *by its time signature*, so an underfilled or overfilled bar
//! never shifts the bars after it. Inside a measure, `<backup>` and `<forward>`
//! move a cursor so that several voices can be written one after another.
//!
//! ## Example
//! ```rust
//! use score_timeline::parser::parse;
//! use score_timeline::timeline::build_timeline;
//! use score_timeline::ConvertOptions;
//!
//! let xml = r#"<score-partwise><part id="P1"><measure number="1">
//!   <attributes><divisions>1</divisions></attributes>
//!   <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
//!   <note><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration></note>
//! </measure></part></score-partwise>"#;
//!
//! let score = parse(xml).unwrap();
//! let timeline = build_timeline(&score, &ConvertOptions::default());
//!
//! assert_eq!(timeline.notes.len(), 2);
//! assert_eq!(timeline.notes[1].time, 0.5); // 120 BPM
//! ```

pub mod engine;
pub mod grace;
pub mod ornament;
pub mod progression;
pub mod tempo;
mod types;


pub use engine::build_note_events;
pub use progression::build_progression;
pub use tempo::TempoMap;
pub use types::*;

use crate::ast::ScoreDocument;
use crate::options::ConvertOptions;

/// Build both outputs from one parsed score
pub fn build_timeline(score: &ScoreDocument, options: &ConvertOptions) -> Timeline {
    Timeline {
        notes: build_note_events(score, &options.id_prefix),
        progression: build_progression(score, options),
    }
}
