//! # Score Document Types
//!
//! This module defines the in-memory form of a partwise MusicXML score, as produced
//! by the `parser` and consumed by the timeline walkers.
//!
//! ## Type Hierarchy
//! ```text
//! ScoreDocument
//!   └── Vec<Part>
//!         ├── id: String
//!         └── Vec<Measure>
//!               ├── number: String
//!               ├── attributes: Attributes (divisions, time, key; all optional)
//!               └── Vec<MeasureElement> (document order)
//!
//! MeasureElement (enum)
//!   ├── Note
//!   │     ├── pitch: Option<Pitch> (None for rests and unpitched notes)
//!   │     ├── duration: u32 (divisions)
//!   │     ├── chord: bool
//!   │     ├── grace: Option<Grace>
//!   │     ├── voice, staff: u32
//!   │     ├── tie: TieMarks (start/stop)
//!   │     ├── dots: u8
//!   │     ├── ornaments: Vec<OrnamentMark>
//!   │     ├── accidental_marks: Vec<AccidentalMark>
//!   │     └── lyric: Option<String>
//!   ├── Harmony (root, kind, bass)
//!   ├── Direction (words, tempo)
//!   ├── Backup(u32)
//!   └── Forward(u32)
//! ```
//!
//! ## Key Concepts
//!
//! ### Divisions
//! Every duration in a measure is an integer count of *divisions*, the number of
//! which make up one quarter note is declared by `<divisions>`. The value carries
//! over from measure to measure until it is redeclared.
//!
//! ### Chords
//! A note with `chord == true` sounds together with the preceding non-chord note
//! and does not advance the measure cursor.
//!
//! ### Ties
//! - `start` only: first note of a tied chain
//! - `start` and `stop`: middle of a chain
//! - `stop` only: last note of a chain
//!
//! Only the first note of a chain is heard; the others lengthen it.

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Parse a `<step>` value ("C" through "B", case-insensitive)
    pub fn from_letter(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Step::C),
            "D" => Some(Step::D),
            "E" => Some(Step::E),
            "F" => Some(Step::F),
            "G" => Some(Step::G),
            "A" => Some(Step::A),
            "B" => Some(Step::B),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    /// Semitones above C
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }
}

/// Written pitch of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pitch {
    pub step: Step,
    pub alter: i8,
    pub octave: i8,
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

/// Key signature (number of sharps/flats)
/// Positive = sharps, Negative = flats, Zero = C major / A minor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeySignature {
    pub fifths: i8,
}

/// Measure-level attributes. Absent fields inherit from earlier measures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub divisions: Option<u32>,
    pub time: Option<TimeSignature>,
    pub key: Option<KeySignature>,
}

/// `<grace>` marker. Unslashed graces are long appoggiaturas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Grace {
    pub slash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TieMarks {
    pub start: bool,
    pub stop: bool,
}

/// Ornament elements found under `<notations><ornaments>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrnamentMark {
    Mordent { long: bool },
    InvertedMordent { long: bool },
    TrillMark,
    Turn,
    DelayedTurn,
    Shake,
    /// Only `type="start"` wavy lines are kept
    WavyLine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Above,
    Below,
}

/// `<accidental-mark>` attached to an ornament, e.g. a sharp above a trill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccidentalMark {
    /// Chromatic alteration the mark requests (sharp = 1, flat = -1, natural = 0)
    pub semitones: i8,
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub pitch: Option<Pitch>,
    pub duration: u32,
    pub chord: bool,
    pub grace: Option<Grace>,
    pub voice: u32,
    pub staff: u32,
    pub tie: TieMarks,
    pub dots: u8,
    pub ornaments: Vec<OrnamentMark>,
    pub accidental_marks: Vec<AccidentalMark>,
    /// Concatenated text of the first `<lyric>`
    pub lyric: Option<String>,
}

impl Note {
    pub fn is_grace(&self) -> bool {
        self.grace.is_some()
    }

    pub fn is_dotted(&self) -> bool {
        self.dots > 0
    }
}

/// `<harmony>` chord symbol
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Harmony {
    pub root: Option<(Step, i8)>,
    /// `<kind>` value, e.g. "minor-seventh"
    pub kind: String,
    /// `<kind text="...">`, the symbol the engraver printed
    pub kind_text: Option<String>,
    pub bass: Option<(Step, i8)>,
}

impl Harmony {
    /// Render the chord symbol, e.g. "Cm7", "F#", "G7/B".
    ///
    /// The printed `kind text` wins over the suffix derived from `kind`.
    /// Returns `None` when there is neither a root nor a "no chord" kind.
    pub fn label(&self) -> Option<String> {
        if self.kind == "none" {
            return Some("N.C.".to_string());
        }
        let (step, alter) = self.root?;
        let suffix = match &self.kind_text {
            Some(text) => text.clone(),
            None => kind_suffix(&self.kind).to_string(),
        };
        let mut label = format!("{}{}{}", step.letter(), accidental_suffix(alter), suffix);
        if let Some((bass_step, bass_alter)) = self.bass {
            label.push('/');
            label.push(bass_step.letter());
            label.push_str(accidental_suffix(bass_alter));
        }
        Some(label)
    }
}

fn accidental_suffix(alter: i8) -> &'static str {
    match alter {
        a if a >= 2 => "##",
        1 => "#",
        -1 => "b",
        a if a <= -2 => "bb",
        _ => "",
    }
}

fn kind_suffix(kind: &str) -> &'static str {
    match kind {
        "minor" => "m",
        "augmented" => "aug",
        "diminished" => "dim",
        "dominant" => "7",
        "major-seventh" => "maj7",
        "minor-seventh" => "m7",
        "diminished-seventh" => "dim7",
        "augmented-seventh" => "aug7",
        "half-diminished" => "m7b5",
        "major-minor" => "m(maj7)",
        "major-sixth" => "6",
        "minor-sixth" => "m6",
        "dominant-ninth" => "9",
        "major-ninth" => "maj9",
        "minor-ninth" => "m9",
        "dominant-11th" => "11",
        "minor-11th" => "m11",
        "dominant-13th" => "13",
        "suspended-second" => "sus2",
        "suspended-fourth" => "sus4",
        "power" => "5",
        _ => "",
    }
}

/// `<direction>` or standalone `<sound>`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Direction {
    /// Every `<words>` text, in order
    pub words: Vec<String>,
    /// Quarter-note BPM from `<sound tempo>` or, failing that, `<metronome>`
    pub tempo: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasureElement {
    Note(Note),
    Harmony(Harmony),
    Direction(Direction),
    Backup(u32),
    Forward(u32),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measure {
    pub number: String,
    pub attributes: Attributes,
    pub elements: Vec<MeasureElement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub id: String,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreDocument {
    pub parts: Vec<Part>,
}
