//! Chord-progression projection
//!
//! A second, coarser walk over the score. Notes are bucketed by onset (bar and
//! position within the bar) rather than timed in seconds, and each onset becomes
//! one or more [`ProgressionEntry`] values carrying harmony and lyric overlay text.
//!
//! Lyric text sticks: once seen it is repeated on every later entry until the
//! next lyric replaces it.

use super::types::{EntryContent, ProgressionEntry};
use crate::ast::*;
use crate::options::ConvertOptions;
use std::collections::BTreeMap;

/// Measure index and position in thousandths of a division
type OnsetKey = (usize, i64);

#[derive(Debug, Clone)]
struct OnsetNote {
    midi: u8,
    class: String,
    octave: i8,
    name: String,
}

#[derive(Debug, Clone, Default)]
struct Onset {
    beats: f64,
    notes: Vec<OnsetNote>,
    harmony: Option<String>,
    lyric: Option<String>,
}

/// Build the chord progression for a whole score
pub fn build_progression(score: &ScoreDocument, options: &ConvertOptions) -> Vec<ProgressionEntry> {
    let mut onsets = BTreeMap::new();
    for part in &score.parts {
        collect_part(part, options.skip_harmony_overlay, &mut onsets);
    }
    project(onsets, options.group_simultaneous_notes)
}

fn collect_part(part: &Part, skip_harmony: bool, onsets: &mut BTreeMap<OnsetKey, Onset>) {
    let mut divisions = 1u32;
    let mut time = TimeSignature::default();

    for (measure_index, measure) in part.measures.iter().enumerate() {
        if let Some(d) = measure.attributes.divisions {
            divisions = d;
        }
        if let Some(t) = measure.attributes.time {
            time = t;
        }

        let mut cursor = 0.0;
        let mut chord_anchor = 0.0;
        for element in &measure.elements {
            match element {
                MeasureElement::Backup(d) => cursor = (cursor - *d as f64).max(0.0),
                MeasureElement::Forward(d) => cursor += *d as f64,
                MeasureElement::Harmony(harmony) if !skip_harmony => {
                    if let Some(label) = harmony.label() {
                        onset_at(onsets, measure_index, cursor, divisions, &time).harmony =
                            Some(label);
                    }
                }
                MeasureElement::Note(note) if !note.is_grace() => {
                    let position = if note.chord {
                        chord_anchor
                    } else {
                        chord_anchor = cursor;
                        cursor += note.duration as f64;
                        chord_anchor
                    };

                    // Rests and tie continuations start nothing new
                    let Some(pitch) = note.pitch else { continue };
                    if note.tie.stop {
                        continue;
                    }

                    let (class, octave) = pitch.spelling();
                    let onset = onset_at(onsets, measure_index, position, divisions, &time);
                    onset.notes.push(OnsetNote {
                        midi: pitch.midi(),
                        name: format!("{}{}", class, octave),
                        class,
                        octave,
                    });
                    if let Some(lyric) = note.lyric.as_ref().filter(|l| !l.is_empty()) {
                        onset.lyric = Some(lyric.clone());
                    }
                }
                _ => {}
            }
        }
    }
}

fn onset_at<'a>(
    onsets: &'a mut BTreeMap<OnsetKey, Onset>,
    measure_index: usize,
    position: f64,
    divisions: u32,
    time: &TimeSignature,
) -> &'a mut Onset {
    let key = (measure_index, (position * 1000.0).round() as i64);
    onsets.entry(key).or_insert_with(|| Onset {
        // Counted in the time signature's own beat unit
        beats: 1.0 + position / divisions as f64 * time.beat_type as f64 / 4.0,
        ..Default::default()
    })
}

fn project(onsets: BTreeMap<OnsetKey, Onset>, group: bool) -> Vec<ProgressionEntry> {
    let mut entries = Vec::new();
    let mut last_lyric: Option<String> = None;

    for ((measure_index, _), onset) in onsets {
        if onset.lyric.is_some() {
            last_lyric = onset.lyric;
        }
        let bar = measure_index as u32 + 1;

        if onset.notes.is_empty() {
            if let Some(label) = onset.harmony {
                entries.push(ProgressionEntry {
                    bar,
                    beats: onset.beats,
                    content: EntryContent::Harmony {
                        chord: label.clone(),
                    },
                    text: Some(label),
                    lyric_display: last_lyric.clone(),
                });
            }
            continue;
        }

        let mut notes = onset.notes;
        notes.sort_by_key(|n| n.midi);

        if group {
            let mut classes: Vec<&str> = Vec::new();
            for note in &notes {
                if !classes.contains(&note.class.as_str()) {
                    classes.push(&note.class);
                }
            }
            entries.push(ProgressionEntry {
                bar,
                beats: onset.beats,
                content: EntryContent::Group {
                    chord: classes.join("+"),
                    notes: notes.iter().map(|n| n.name.clone()).collect(),
                },
                text: onset.harmony,
                lyric_display: last_lyric.clone(),
            });
        } else {
            for note in notes {
                entries.push(ProgressionEntry {
                    bar,
                    beats: onset.beats,
                    content: EntryContent::Note {
                        chord: note.class,
                        octave: note.octave,
                    },
                    text: onset.harmony.clone(),
                    lyric_display: last_lyric.clone(),
                });
            }
        }
    }

    entries
}
