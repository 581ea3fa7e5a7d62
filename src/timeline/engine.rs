//! Note event generation engine
//!
//! Walks every part measure by measure and emits timed notes, expanding grace
//! runs and ornaments and merging tied notes along the way.

use super::grace::{self, GraceNote};
use super::ornament::{self, OrnamentSpec, SubNote};
use super::tempo::{measure_span, TempoMap, DEFAULT_TEMPO};
use super::types::{Hand, NoteEvent, RawNote};
use crate::ast::*;
use crate::pitch::{midi_to_name, prefers_flats};
use std::collections::HashMap;

/// Ornament units per quarter note (a unit is a thirty-second)
const UNITS_PER_QUARTER: f64 = 8.0;

/// Offsets closer than this are the same point in the measure
const POSITION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    /// Divisions from the start of the measure
    offset: f64,
    bpm: f64,
}

/// Notes are joined into a tie chain only when pitch, voice and staff all match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TieKey {
    pitch: u8,
    voice: u32,
    staff: u32,
}

/// Build sorted, identified note events for a whole score.
///
/// The tempo map is taken from the first part and shared by all parts.
pub fn build_note_events(score: &ScoreDocument, id_prefix: &str) -> Vec<NoteEvent> {
    let tempo_map = score.parts.first().map(TempoMap::build).unwrap_or_default();
    let raw = score
        .parts
        .iter()
        .flat_map(|part| walk_part(part, &tempo_map))
        .collect();
    assign_ids(raw, id_prefix)
}

/// Emit the raw notes of one part, in document order
pub fn walk_part(part: &Part, tempo_map: &TempoMap) -> Vec<RawNote> {
    part.measures
        .iter()
        .fold(PartWalker::new(tempo_map), PartWalker::walk_measure)
        .finish(&part.id)
}

struct PartWalker<'a> {
    tempo_map: &'a TempoMap,
    /// Seconds at the start of the current measure
    base_time: f64,
    /// Absolute divisions at the start of the current measure
    base_position: f64,
    divisions: u32,
    time: TimeSignature,
    key: KeySignature,
    /// Tempo changes of the current measure, sorted by offset. The first
    /// segment also covers offsets before the measure.
    segments: Vec<TempoSegment>,
    ties: HashMap<TieKey, usize>,
    notes: Vec<RawNote>,
}

impl<'a> PartWalker<'a> {
    fn new(tempo_map: &'a TempoMap) -> Self {
        Self {
            tempo_map,
            base_time: 0.0,
            base_position: 0.0,
            divisions: 1,
            time: TimeSignature::default(),
            key: KeySignature::default(),
            segments: vec![TempoSegment {
                offset: 0.0,
                bpm: DEFAULT_TEMPO,
            }],
            ties: HashMap::new(),
            notes: Vec::new(),
        }
    }

    fn finish(self, part_id: &str) -> Vec<RawNote> {
        if !self.ties.is_empty() {
            log::debug!(
                "part {:?}: {} tie(s) still open at the end",
                part_id,
                self.ties.len()
            );
        }
        self.notes
    }

    /// Start a tempo segment at `offset`, replacing one already there
    fn set_tempo(&mut self, offset: f64, bpm: f64) {
        let found = self
            .segments
            .iter()
            .position(|s| s.offset > offset - POSITION_EPSILON);
        match found {
            Some(i) if (self.segments[i].offset - offset).abs() < POSITION_EPSILON => {
                self.segments[i].bpm = bpm
            }
            Some(i) => self.segments.insert(i, TempoSegment { offset, bpm }),
            None => self.segments.push(TempoSegment { offset, bpm }),
        }
    }

    /// Tempo segments of the measure starting at the current position: the
    /// tempo in force there plus every change the tempo map records inside it
    fn seed_segments(&mut self, span: f64) {
        let start = self.base_position;
        self.segments = vec![TempoSegment {
            offset: 0.0,
            bpm: self.tempo_map.tempo_at(start),
        }];
        let inside: Vec<TempoSegment> = self
            .tempo_map
            .events
            .iter()
            .filter(|e| e.position > start && e.position < start + span)
            .map(|e| TempoSegment {
                offset: e.position - start,
                bpm: e.bpm,
            })
            .collect();
        for segment in inside {
            self.set_tempo(segment.offset, segment.bpm);
        }
    }

    /// Seconds for `length` divisions starting at `offset` in the current
    /// measure, each piece timed at the tempo of its segment
    fn span_seconds(&self, offset: f64, length: f64) -> f64 {
        let end = offset + length;
        self.segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let from = if i == 0 {
                    offset
                } else {
                    offset.max(segment.offset)
                };
                let to = self
                    .segments
                    .get(i + 1)
                    .map_or(end, |next| end.min(next.offset));
                // Keep the exact length when the span lies in one segment
                let count = if from == offset && to == end {
                    length
                } else {
                    to - from
                };
                if to > from {
                    self.tempo_map.seconds(
                        self.base_position + from,
                        count,
                        segment.bpm,
                        self.divisions as f64,
                    )
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Absolute time of `offset` in the current measure. Negative offsets reach
    /// back into the previous measure.
    fn time_at(&self, offset: f64) -> f64 {
        if offset >= 0.0 {
            self.base_time + self.span_seconds(0.0, offset)
        } else {
            self.base_time - self.span_seconds(offset, -offset)
        }
    }

    fn walk_measure(mut self, measure: &Measure) -> Self {
        let attributes = &measure.attributes;
        if let Some(divisions) = attributes.divisions {
            self.divisions = divisions;
        }
        if let Some(time) = attributes.time {
            self.time = time;
        }
        if let Some(key) = attributes.key {
            self.key = key;
        }
        let span = measure_span(&self.time, self.divisions);
        self.seed_segments(span);

        let mut cursor = 0.0;
        let mut chord_anchor = 0.0;

        for (index, element) in measure.elements.iter().enumerate() {
            match element {
                MeasureElement::Backup(d) => cursor = (cursor - *d as f64).max(0.0),
                MeasureElement::Forward(d) => cursor += *d as f64,
                MeasureElement::Direction(direction) => {
                    if let Some(bpm) = direction.tempo {
                        self.set_tempo(cursor, bpm);
                    }
                }
                MeasureElement::Harmony(_) => {}
                // Grace notes are placed together with their principal note
                MeasureElement::Note(note) if note.is_grace() => {}
                MeasureElement::Note(note) => {
                    // Chord members share the onset of the note they are stacked on
                    let position = if note.chord {
                        chord_anchor
                    } else {
                        chord_anchor = cursor;
                        cursor += note.duration as f64;
                        chord_anchor
                    };

                    if let Some(pitch) = note.pitch {
                        let graces = preceding_graces(&measure.elements, index);
                        self.place_note(note, pitch, position, &graces);
                    }
                }
            }
        }

        log::debug!(
            "measure {:?}: starts at {:.3}s, {} divisions, {} tempo segment(s)",
            measure.number,
            self.base_time,
            span,
            self.segments.len()
        );
        self.base_time += self.span_seconds(0.0, span);
        self.base_position += span;
        self
    }

    fn place_note(&mut self, note: &Note, pitch: Pitch, position: f64, graces: &[GraceNote]) {
        let midi = pitch.midi();
        let duration = note.duration as f64;
        let tie_key = TieKey {
            pitch: midi,
            voice: note.voice,
            staff: note.staff,
        };

        if note.tie.stop {
            match self.ties.get(&tie_key).copied() {
                Some(index) => {
                    let extension = self.span_seconds(position, duration);
                    self.notes[index].duration += extension;
                    if !note.tie.start {
                        self.ties.remove(&tie_key);
                    }
                    return;
                }
                None if !note.tie.start => {
                    log::warn!(
                        "dropping tied {} with no open tie (voice {}, staff {})",
                        pitch.display_name(),
                        note.voice,
                        note.staff
                    );
                    return;
                }
                None => log::warn!(
                    "tied {} continues no open tie; starting a new chain",
                    pitch.display_name()
                ),
            }
        }

        let unit = self.divisions as f64 / UNITS_PER_QUARTER;
        let mut main_start = position;
        let mut available = duration;

        if !graces.is_empty() {
            let mut expansion = grace::expand(graces, duration, note.is_dotted(), unit);
            if !expansion.on_beat && self.time_at(position - expansion.stolen) < 0.0 {
                expansion = expansion.on_beat();
            }

            let group_start = if expansion.on_beat {
                position
            } else {
                position - expansion.stolen
            };
            for grace_note in &expansion.notes {
                let offset = group_start + grace_note.offset;
                let time = self.time_at(offset);
                let seconds = self.span_seconds(offset, grace_note.duration);
                self.notes.push(RawNote {
                    time,
                    pitch: grace_note.pitch,
                    name: grace_note.name.clone(),
                    duration: seconds,
                    staff: note.staff,
                    is_ornament: true,
                });
            }

            if expansion.on_beat {
                main_start += expansion.stolen;
            }
            available -= expansion.stolen;
        }

        let sub_notes = match OrnamentSpec::from_marks(&note.ornaments, &note.accidental_marks) {
            Some(spec) => ornament::expand(&spec, midi, available, self.key.fifths, unit),
            None => vec![SubNote {
                pitch: midi,
                offset: 0.0,
                duration: available,
                ornamental: false,
            }],
        };

        let written_name = pitch.display_name();
        let flats = prefers_flats(self.key.fifths);
        for sub in sub_notes {
            let offset = main_start + sub.offset;
            let name = if sub.pitch == midi {
                written_name.clone()
            } else {
                midi_to_name(sub.pitch, flats)
            };
            let time = self.time_at(offset);
            let seconds = self.span_seconds(offset, sub.duration);
            self.notes.push(RawNote {
                time,
                pitch: sub.pitch,
                name,
                duration: seconds,
                staff: note.staff,
                is_ornament: sub.ornamental,
            });
        }

        // Ties lengthen the last sounding note of the expansion
        if note.tie.start {
            self.ties.insert(tie_key, self.notes.len() - 1);
        }
    }
}

/// Pitched grace notes immediately before `index`, in written order
fn preceding_graces(elements: &[MeasureElement], index: usize) -> Vec<GraceNote> {
    let mut graces: Vec<GraceNote> = elements[..index]
        .iter()
        .rev()
        .map_while(|element| match element {
            MeasureElement::Note(note) if note.is_grace() => Some(note),
            _ => None,
        })
        .filter_map(|note| {
            let pitch = note.pitch?;
            Some(GraceNote {
                pitch: pitch.midi(),
                name: pitch.display_name(),
                slashed: note.grace.map_or(false, |g| g.slash),
            })
        })
        .collect();
    graces.reverse();
    graces
}

/// Onset rounded to the millisecond, used to find notes sounding together
fn instant(note: &RawNote) -> (i64, u8) {
    ((note.time * 1000.0).round() as i64, note.pitch)
}

/// Sort by (time, pitch), decide hands, and number the notes
pub fn assign_ids(mut raw: Vec<RawNote>, id_prefix: &str) -> Vec<NoteEvent> {
    // Stable: equal (time, pitch) keep document order
    raw.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.pitch.cmp(&b.pitch)));

    let mut staves: HashMap<(i64, u8), Vec<u32>> = HashMap::new();
    for note in &raw {
        staves.entry(instant(note)).or_default().push(note.staff);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, note)| {
            let unison = staves
                .get(&instant(&note))
                .map_or(false, |s| s.iter().any(|&staff| staff != note.staff));
            let hand = if unison {
                Hand::Both
            } else {
                Hand::for_staff(note.staff)
            };
            NoteEvent {
                id: format!("{}{}", id_prefix, index),
                time: note.time.max(0.0),
                pitch: note.pitch,
                duration: (note.duration > 0.0).then_some(note.duration),
                note_name: note.name,
                hand,
                is_ornament: note.is_ornament,
            }
        })
        .collect()
}
