//! Ornament expansion.
//!
//! An ornamented note is replaced by a short figure of sub-notes that exactly
//! fills the note's length. Each figure note lasts one *ornament unit* (a
//! thirty-second note, `divisions / 8`), shrunk when the note is too short to
//! hold the whole figure. Neighbour pitches follow the key signature unless an
//! accidental mark asks for a chromatic one.
//!
//! | Ornament           | Figure                                        |
//! |--------------------|-----------------------------------------------|
//! | mordent            | main, lower, main (+ lower, main when long)   |
//! | inverted mordent   | main, upper, main (+ upper, main when long)   |
//! | turn               | upper, main, lower, main                      |
//! | delayed turn       | main (held), upper, main, lower, main         |
//! | trill, shake, wavy | main, upper, main, ... (odd count, at least 5) |

use crate::ast::{AccidentalMark, OrnamentMark, Placement};
use crate::pitch::{chromatic_neighbor, lower_neighbor, upper_neighbor};

/// Smallest number of notes in a trill
const MIN_TRILL_NOTES: usize = 5;

/// A recognised ornament with the accidental alteration requested for each of
/// its neighbour notes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrnamentSpec {
    Mordent { long: bool, lower: Option<i8> },
    InvertedMordent { long: bool, upper: Option<i8> },
    TrillMark { upper: Option<i8> },
    WavyLine { upper: Option<i8> },
    Shake { upper: Option<i8> },
    Turn { upper: Option<i8>, lower: Option<i8> },
    DelayedTurn { upper: Option<i8>, lower: Option<i8> },
}

impl OrnamentSpec {
    /// Ornament to perform for the first recognised mark on a note.
    ///
    /// For turns a mark placed below applies to the lower neighbour and any other
    /// mark to the upper one. Single-neighbour ornaments take the first mark
    /// regardless of placement.
    pub fn from_marks(marks: &[OrnamentMark], accidentals: &[AccidentalMark]) -> Option<Self> {
        let first_mark = accidentals.first().map(|a| a.semitones);
        let below = accidentals
            .iter()
            .find(|a| a.placement == Some(Placement::Below))
            .map(|a| a.semitones);
        let above = accidentals
            .iter()
            .find(|a| a.placement != Some(Placement::Below))
            .map(|a| a.semitones);

        let spec = match marks.first()? {
            OrnamentMark::Mordent { long } => OrnamentSpec::Mordent {
                long: *long,
                lower: first_mark,
            },
            OrnamentMark::InvertedMordent { long } => OrnamentSpec::InvertedMordent {
                long: *long,
                upper: first_mark,
            },
            OrnamentMark::TrillMark => OrnamentSpec::TrillMark { upper: first_mark },
            OrnamentMark::WavyLine => OrnamentSpec::WavyLine { upper: first_mark },
            OrnamentMark::Shake => OrnamentSpec::Shake { upper: first_mark },
            OrnamentMark::Turn => OrnamentSpec::Turn { upper: above, lower: below },
            OrnamentMark::DelayedTurn => OrnamentSpec::DelayedTurn { upper: above, lower: below },
        };
        Some(spec)
    }
}

/// One note of an expanded ornament. `offset` and `duration` are in divisions,
/// relative to the start of the ornamented note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubNote {
    pub pitch: u8,
    pub offset: f64,
    pub duration: f64,
    pub ornamental: bool,
}

fn upper(main: u8, mark: Option<i8>, fifths: i8) -> u8 {
    match mark {
        Some(semitones) => chromatic_neighbor(main, semitones, true),
        None => upper_neighbor(main, fifths),
    }
}

fn lower(main: u8, mark: Option<i8>, fifths: i8) -> u8 {
    match mark {
        Some(semitones) => chromatic_neighbor(main, semitones, false),
        None => lower_neighbor(main, fifths),
    }
}

/// Expand an ornamented note of `available` divisions.
///
/// The durations of the returned sub-notes sum to `available`. The last sub-note
/// carries the written pitch and is not ornamental, except for the delayed turn
/// where the held first note is the written one.
pub fn expand(spec: &OrnamentSpec, main: u8, available: f64, fifths: i8, unit: f64) -> Vec<SubNote> {
    match *spec {
        OrnamentSpec::Mordent { long, lower: mark } => {
            let neighbor = lower(main, mark, fifths);
            lead_figure(&alternation(main, neighbor, long), main, available, unit)
        }
        OrnamentSpec::InvertedMordent { long, upper: mark } => {
            let neighbor = upper(main, mark, fifths);
            lead_figure(&alternation(main, neighbor, long), main, available, unit)
        }
        OrnamentSpec::Turn { upper: up, lower: down } => {
            let figure = [upper(main, up, fifths), main, lower(main, down, fifths)];
            lead_figure(&figure, main, available, unit)
        }
        OrnamentSpec::DelayedTurn { upper: up, lower: down } => {
            let figure = [upper(main, up, fifths), main, lower(main, down, fifths), main];
            delayed_figure(&figure, main, available, unit)
        }
        OrnamentSpec::TrillMark { upper: mark }
        | OrnamentSpec::WavyLine { upper: mark }
        | OrnamentSpec::Shake { upper: mark } => {
            trill(main, upper(main, mark, fifths), available, unit)
        }
    }
}

/// main, neighbor (, main, neighbor)
fn alternation(main: u8, neighbor: u8, long: bool) -> Vec<u8> {
    let mut figure = vec![main, neighbor];
    if long {
        figure.extend([main, neighbor]);
    }
    figure
}

/// Figure notes one unit each, then the written pitch for the remainder
fn lead_figure(figure: &[u8], main: u8, available: f64, unit: f64) -> Vec<SubNote> {
    let slice = unit.min(available / (figure.len() + 1) as f64);
    let mut notes = Vec::with_capacity(figure.len() + 1);
    let mut offset = 0.0;
    for &pitch in figure {
        notes.push(SubNote {
            pitch,
            offset,
            duration: slice,
            ornamental: true,
        });
        offset += slice;
    }
    notes.push(SubNote {
        pitch: main,
        offset,
        duration: available - offset,
        ornamental: false,
    });
    notes
}

/// Written pitch held first, figure squeezed into the last units
fn delayed_figure(figure: &[u8], main: u8, available: f64, unit: f64) -> Vec<SubNote> {
    let slice = unit.min(available / (figure.len() + 1) as f64);
    let held = available - slice * figure.len() as f64;
    let mut notes = vec![SubNote {
        pitch: main,
        offset: 0.0,
        duration: held,
        ornamental: false,
    }];
    let mut offset = held;
    for (i, &pitch) in figure.iter().enumerate() {
        let duration = if i + 1 == figure.len() {
            available - offset
        } else {
            slice
        };
        notes.push(SubNote {
            pitch,
            offset,
            duration,
            ornamental: true,
        });
        offset += duration;
    }
    notes
}

fn trill(main: u8, neighbor: u8, available: f64, unit: f64) -> Vec<SubNote> {
    let mut count = if unit > 0.0 {
        (available / unit).floor() as usize
    } else {
        0
    };
    if count % 2 == 0 {
        count = count.saturating_sub(1);
    }
    let count = count.max(MIN_TRILL_NOTES);
    let slice = available / count as f64;

    let mut notes = Vec::with_capacity(count);
    let mut offset = 0.0;
    for i in 0..count {
        let last = i + 1 == count;
        let duration = if last { available - offset } else { slice };
        notes.push(SubNote {
            pitch: if i % 2 == 0 { main } else { neighbor },
            offset,
            duration,
            ornamental: !last,
        });
        offset += duration;
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(notes: &[SubNote]) -> f64 {
        notes.iter().map(|n| n.duration).sum()
    }

    fn pitches(notes: &[SubNote]) -> Vec<u8> {
        notes.iter().map(|n| n.pitch).collect()
    }

    #[test]
    fn test_mordent_quarter_note() {
        // divisions = 8, unit = 1
        let spec = OrnamentSpec::Mordent { long: false, lower: None };
        let notes = expand(&spec, 72, 8.0, 0, 1.0);
        assert_eq!(pitches(&notes), vec![72, 71, 72]);
        assert_eq!(notes[0].duration, 1.0);
        assert_eq!(notes[1].duration, 1.0);
        assert_eq!(notes[2].duration, 6.0);
        assert!(notes[0].ornamental && notes[1].ornamental);
        assert!(!notes[2].ornamental);
    }

    #[test]
    fn test_long_mordent_doubles_alternation() {
        let spec = OrnamentSpec::InvertedMordent { long: true, upper: None };
        let notes = expand(&spec, 60, 8.0, 0, 1.0);
        assert_eq!(pitches(&notes), vec![60, 62, 60, 62, 60]);
        assert_eq!(total(&notes), 8.0);
    }

    #[test]
    fn test_short_note_shrinks_unit() {
        let spec = OrnamentSpec::Mordent { long: false, lower: None };
        let notes = expand(&spec, 60, 1.5, 0, 1.0);
        assert_eq!(notes.len(), 3);
        assert!((notes[0].duration - 0.5).abs() < 1e-9);
        assert!((total(&notes) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_turn() {
        let spec = OrnamentSpec::Turn { upper: None, lower: None };
        let notes = expand(&spec, 64, 8.0, 0, 1.0);
        assert_eq!(pitches(&notes), vec![65, 64, 62, 64]);
        assert_eq!(notes[3].duration, 5.0);
        assert_eq!(notes[3].offset, 3.0);
    }

    #[test]
    fn test_turn_accidental_marks() {
        let marks = [OrnamentMark::Turn];
        let accidentals = [
            AccidentalMark { semitones: -1, placement: Some(Placement::Below) },
            AccidentalMark { semitones: 1, placement: Some(Placement::Above) },
        ];
        let spec = OrnamentSpec::from_marks(&marks, &accidentals).unwrap();
        assert_eq!(spec, OrnamentSpec::Turn { upper: Some(1), lower: Some(-1) });

        let notes = expand(&spec, 60, 8.0, 0, 1.0);
        assert_eq!(pitches(&notes), vec![61, 60, 59, 60]);
    }

    #[test]
    fn test_delayed_turn() {
        let spec = OrnamentSpec::DelayedTurn { upper: None, lower: None };
        let notes = expand(&spec, 60, 16.0, 0, 1.0);
        assert_eq!(pitches(&notes), vec![60, 62, 60, 59, 60]);
        assert_eq!(notes[0].duration, 12.0);
        assert!(!notes[0].ornamental);
        assert!(notes[1..].iter().all(|n| n.ornamental));
        assert_eq!(notes[1].offset, 12.0);
        assert_eq!(total(&notes), 16.0);
    }

    #[test]
    fn test_trill_half_note() {
        // 16 units -> 15 notes
        let spec = OrnamentSpec::TrillMark { upper: None };
        let notes = expand(&spec, 67, 16.0, 0, 1.0);
        assert_eq!(notes.len(), 15);
        assert_eq!(notes[0].pitch, 67);
        assert_eq!(notes[1].pitch, 69);
        assert_eq!(notes[14].pitch, 67);
        assert!(!notes[14].ornamental);
        assert!((total(&notes) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_trill_minimum_notes() {
        let spec = OrnamentSpec::Shake { upper: Some(1) };
        let notes = expand(&spec, 60, 2.0, 0, 1.0);
        assert_eq!(notes.len(), 5);
        assert_eq!(notes[1].pitch, 61);
        assert!((total(&notes) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_trill_neighbor_follows_key() {
        // E in G major trills to F#
        let spec = OrnamentSpec::WavyLine { upper: None };
        let notes = expand(&spec, 64, 8.0, 1, 1.0);
        assert_eq!(notes[1].pitch, 66);
    }

    #[test]
    fn test_mordent_takes_any_mark() {
        let accidentals = [AccidentalMark { semitones: 1, placement: Some(Placement::Above) }];
        let spec =
            OrnamentSpec::from_marks(&[OrnamentMark::Mordent { long: false }], &accidentals).unwrap();
        assert_eq!(spec, OrnamentSpec::Mordent { long: false, lower: Some(1) });
    }

    #[test]
    fn test_no_marks() {
        assert_eq!(OrnamentSpec::from_marks(&[], &[]), None);
    }
}
