//! # Tempo Map
//!
//! Collects tempo changes and gradual tempo ramps from a part, and converts spans
//! of divisions into seconds.
//!
//! ## Positions
//! A *position* is an absolute offset in divisions from the start of the part:
//! the sum of the nominal spans of the preceding measures plus the cursor inside
//! the current one. Nominal spans come from the time signature
//! (`beats * (4 / beat_type) * divisions`), not from the notes written in the bar.
//!
//! ## Ramps
//! A word direction such as "rit." or "accel." opens a region at the current
//! tempo. The next explicit tempo closes it at that tempo; "a tempo" closes it at
//! the tempo that was in force before the ramp. A ramp still open at the end of
//! the part closes there at 70% of its start tempo (or start / 0.7 when
//! accelerating).
//!
//! ## Example
//! ```
//! use score_timeline::timeline::tempo::TempoMap;
//!
//! let map = TempoMap::default();
//! // Two quarter notes at 120 BPM with one division per quarter
//! assert_eq!(map.seconds(0.0, 2.0, 120.0, 1.0), 1.0);
//! ```

use crate::ast::{MeasureElement, Part, TimeSignature};

pub const DEFAULT_TEMPO: f64 = 120.0;

/// End tempo of a ritardando that is never cancelled, as a fraction of its start
pub const UNTERMINATED_RAMP_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEvent {
    pub position: f64,
    pub bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampKind {
    Ritardando,
    Accelerando,
}

/// Span `[start, end)` over which the tempo moves linearly from `start_tempo`
/// to `end_tempo`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RitardandoRegion {
    pub kind: RampKind,
    pub start: f64,
    pub end: f64,
    pub start_tempo: f64,
    pub end_tempo: f64,
}

impl RitardandoRegion {
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && start < self.end
    }

    /// Interpolated tempo at `position`
    pub fn tempo_at(&self, position: f64) -> f64 {
        let length = self.end - self.start;
        if length <= 0.0 {
            return self.start_tempo;
        }
        let progress = ((position - self.start) / length).clamp(0.0, 1.0);
        self.start_tempo + (self.end_tempo - self.start_tempo) * progress
    }
}

/// What a `<words>` direction means for tempo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoCue {
    Ramp(RampKind),
    /// "a tempo" or "tempo primo"
    Resume,
}

const RESUME_WORDS: [&str; 2] = ["a tempo", "tempo primo"];
const RITARDANDO_WORDS: [&str; 8] = [
    "rit", "ritard", "ritardando", "ritenuto", "rall", "rallentando", "allargando", "slentando",
];
const ACCELERANDO_WORDS: [&str; 3] = ["accel", "accelerando", "stringendo"];

/// Classify a word direction, case-insensitively.
///
/// "a tempo" is checked before the ramp words so that "a tempo (rit. ends)"
/// still reads as a resume.
pub fn classify_words(text: &str) -> Option<TempoCue> {
    let lower = text.to_lowercase();
    if RESUME_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(TempoCue::Resume);
    }
    let has_word = |candidates: &[&str]| {
        lower
            .split(|c: char| !c.is_alphabetic())
            .any(|token| candidates.contains(&token))
    };
    if has_word(&RITARDANDO_WORDS[..]) {
        Some(TempoCue::Ramp(RampKind::Ritardando))
    } else if has_word(&ACCELERANDO_WORDS[..]) {
        Some(TempoCue::Ramp(RampKind::Accelerando))
    } else {
        None
    }
}

/// Nominal length of a measure in divisions
pub fn measure_span(time: &TimeSignature, divisions: u32) -> f64 {
    time.beats as f64 * (4.0 / time.beat_type as f64) * divisions as f64
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TempoMap {
    /// Sorted by position
    pub events: Vec<TempoEvent>,
    pub regions: Vec<RitardandoRegion>,
}

#[derive(Debug, Clone, Copy)]
struct OpenRamp {
    kind: RampKind,
    start: f64,
    tempo: f64,
}

impl OpenRamp {
    fn close(self, end: f64, end_tempo: f64) -> Option<RitardandoRegion> {
        (end > self.start).then_some(RitardandoRegion {
            kind: self.kind,
            start: self.start,
            end,
            start_tempo: self.tempo,
            end_tempo,
        })
    }
}

/// Accumulator threaded through the measures of a part
#[derive(Debug, Clone)]
struct ScanState {
    position: f64,
    divisions: u32,
    time: TimeSignature,
    tempo: f64,
    open: Option<OpenRamp>,
    events: Vec<TempoEvent>,
    regions: Vec<RitardandoRegion>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            position: 0.0,
            divisions: 1,
            time: TimeSignature::default(),
            tempo: DEFAULT_TEMPO,
            open: None,
            events: Vec::new(),
            regions: Vec::new(),
        }
    }
}

impl ScanState {
    fn close_open(&mut self, position: f64, end_tempo: f64) {
        if let Some(region) = self.open.take().and_then(|r| r.close(position, end_tempo)) {
            self.regions.push(region);
        }
    }

    fn scan_measure(mut self, measure: &crate::ast::Measure) -> Self {
        if let Some(divisions) = measure.attributes.divisions {
            self.divisions = divisions;
        }
        if let Some(time) = measure.attributes.time {
            self.time = time;
        }

        let mut cursor = 0.0;
        for element in &measure.elements {
            match element {
                MeasureElement::Direction(direction) => {
                    let position = self.position + cursor;
                    if let Some(bpm) = direction.tempo {
                        self.tempo = bpm;
                        self.events.push(TempoEvent { position, bpm });
                        self.close_open(position, bpm);
                    }
                    for words in &direction.words {
                        match classify_words(words) {
                            Some(TempoCue::Ramp(kind)) if self.open.is_none() => {
                                self.open = Some(OpenRamp {
                                    kind,
                                    start: position,
                                    tempo: self.tempo,
                                });
                            }
                            Some(TempoCue::Resume) => self.close_open(position, self.tempo),
                            _ => {}
                        }
                    }
                }
                MeasureElement::Backup(d) => cursor = (cursor - *d as f64).max(0.0),
                MeasureElement::Forward(d) => cursor += *d as f64,
                MeasureElement::Note(note) if !note.chord && !note.is_grace() => {
                    cursor += note.duration as f64
                }
                _ => {}
            }
        }

        self.position += measure_span(&self.time, self.divisions);
        self
    }

    fn finish(mut self) -> TempoMap {
        if let Some(open) = self.open {
            let end_tempo = match open.kind {
                RampKind::Ritardando => open.tempo * UNTERMINATED_RAMP_FACTOR,
                RampKind::Accelerando => open.tempo / UNTERMINATED_RAMP_FACTOR,
            };
            log::warn!(
                "closing unterminated tempo ramp at position {} ({} -> {} BPM)",
                self.position,
                open.tempo,
                end_tempo
            );
            self.close_open(self.position, end_tempo);
        }
        self.events
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        TempoMap {
            events: self.events,
            regions: self.regions,
        }
    }
}

impl TempoMap {
    /// Scan one part for tempo events and ramps
    pub fn build(part: &Part) -> Self {
        part.measures
            .iter()
            .fold(ScanState::default(), ScanState::scan_measure)
            .finish()
    }

    /// Explicit tempo in force at `position` (ramps not applied)
    pub fn tempo_at(&self, position: f64) -> f64 {
        self.events
            .iter()
            .take_while(|e| e.position <= position)
            .last()
            .map_or(DEFAULT_TEMPO, |e| e.bpm)
    }

    /// Tempo at `position` with ramps applied, `base` outside any ramp
    pub fn local_tempo(&self, position: f64, base: f64) -> f64 {
        self.regions
            .iter()
            .find(|r| r.contains(position))
            .map_or(base, |r| r.tempo_at(position))
    }

    /// Seconds taken by `count` divisions starting at absolute `start`.
    ///
    /// Outside ramps this is `count * 60 / (tempo * divisions)`. A span touching a
    /// ramp is summed one division at a time, each unit (and the final partial
    /// unit) at the tempo found at its start.
    pub fn seconds(&self, start: f64, count: f64, tempo: f64, divisions: f64) -> f64 {
        if count <= 0.0 || tempo <= 0.0 || divisions <= 0.0 {
            return 0.0;
        }
        let end = start + count;
        if !self.regions.iter().any(|r| r.overlaps(start, end)) {
            return count * 60.0 / (tempo * divisions);
        }

        let mut elapsed = 0.0;
        let mut position = start;
        while position < end {
            let step = (end - position).min(1.0);
            let local = self.local_tempo(position, tempo);
            elapsed += step * 60.0 / (local * divisions);
            position += step;
        }
        elapsed
    }
}
