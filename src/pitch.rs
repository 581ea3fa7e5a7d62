//! Pitch arithmetic: MIDI numbers, note names and diatonic neighbours.
//!
//! Note names use sharps unless the caller prefers flats (flat keys). Written
//! pitches keep their own spelling where it is a simple one (`C#4`, `Bb3`);
//! double accidentals and the white-key enharmonics (`E#`, `B#`, `Cb`, `Fb`) are
//! respelled from their MIDI number.

use crate::ast::{Pitch, Step};

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Semitone offsets of the major scale from its tonic
const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Convert a written pitch to a MIDI number, clamped to 0..=127.
///
/// # Example
/// ```
/// use score_timeline::ast::Step;
/// use score_timeline::pitch::pitch_to_midi;
///
/// assert_eq!(pitch_to_midi(Step::C, 0, 4), 60);
/// assert_eq!(pitch_to_midi(Step::B, -1, 3), 58);
/// ```
pub fn pitch_to_midi(step: Step, alter: i8, octave: i8) -> u8 {
    let midi = step.semitone() + alter as i32 + (octave as i32 + 1) * 12;
    midi.clamp(0, 127) as u8
}

/// Octave number of a MIDI pitch (60 is in octave 4)
pub fn octave_of(midi: u8) -> i8 {
    (midi / 12) as i8 - 1
}

/// Pitch-class name without octave, e.g. "F#" or "Gb"
pub fn pitch_class_name(midi: u8, prefer_flats: bool) -> &'static str {
    let index = (midi % 12) as usize;
    if prefer_flats {
        FLAT_NAMES[index]
    } else {
        SHARP_NAMES[index]
    }
}

/// Full note name, e.g. `midi_to_name(61, false) == "C#4"`
pub fn midi_to_name(midi: u8, prefer_flats: bool) -> String {
    format!("{}{}", pitch_class_name(midi, prefer_flats), octave_of(midi))
}

/// Flat keys spell generated pitches with flats
pub fn prefers_flats(fifths: i8) -> bool {
    fifths < 0
}

/// Whether a MIDI pitch belongs to the major scale of the given key signature
/// (which is also the pitch set of its relative minor).
pub fn is_diatonic(midi: u8, fifths: i8) -> bool {
    let tonic = (fifths as i32 * 7).rem_euclid(12);
    let degree = (midi as i32 - tonic).rem_euclid(12);
    MAJOR_SCALE.contains(&degree)
}

/// Nearest scale tone 1 to 3 semitones above `midi`; a whole step if none is found.
pub fn upper_neighbor(midi: u8, fifths: i8) -> u8 {
    (1..=3)
        .map(|step| midi as i32 + step)
        .take_while(|&candidate| candidate <= 127)
        .find(|&candidate| is_diatonic(candidate as u8, fifths))
        .map(|candidate| candidate as u8)
        .unwrap_or_else(|| shift(midi, 2))
}

/// Nearest scale tone 1 to 3 semitones below `midi`; a whole step if none is found.
pub fn lower_neighbor(midi: u8, fifths: i8) -> u8 {
    (1..=3)
        .map(|step| midi as i32 - step)
        .take_while(|&candidate| candidate >= 0)
        .find(|&candidate| is_diatonic(candidate as u8, fifths))
        .map(|candidate| candidate as u8)
        .unwrap_or_else(|| shift(midi, -2))
}

/// Neighbour requested by an accidental mark: a half step for a single sharp or
/// flat, a whole step otherwise.
pub fn chromatic_neighbor(midi: u8, semitones: i8, upward: bool) -> u8 {
    let size = if semitones.abs() == 1 { 1 } else { 2 };
    shift(midi, if upward { size } else { -size })
}

fn shift(midi: u8, semitones: i32) -> u8 {
    (midi as i32 + semitones).clamp(0, 127) as u8
}

impl Pitch {
    pub fn midi(&self) -> u8 {
        pitch_to_midi(self.step, self.alter, self.octave)
    }

    /// Pitch-class spelling and octave as written, simplified where needed
    pub fn spelling(&self) -> (String, i8) {
        let awkward = matches!(
            (self.step, self.alter),
            (Step::E, 1) | (Step::B, 1) | (Step::F, -1) | (Step::C, -1)
        );
        if (-1..=1).contains(&self.alter) && !awkward {
            let accidental = match self.alter {
                1 => "#",
                -1 => "b",
                _ => "",
            };
            (format!("{}{}", self.step.letter(), accidental), self.octave)
        } else {
            let midi = self.midi();
            (
                pitch_class_name(midi, self.alter < 0).to_string(),
                octave_of(midi),
            )
        }
    }

    /// Display name such as "C4", "F#5" or "Bb3"
    pub fn display_name(&self) -> String {
        let (class, octave) = self.spelling();
        format!("{}{}", class, octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(step: Step, alter: i8, octave: i8) -> Pitch {
        Pitch { step, alter, octave }
    }

    #[test]
    fn test_pitch_to_midi() {
        assert_eq!(pitch_to_midi(Step::C, 0, 4), 60);
        assert_eq!(pitch_to_midi(Step::A, 0, 4), 69);
        assert_eq!(pitch_to_midi(Step::C, 0, -1), 0);
        assert_eq!(pitch_to_midi(Step::C, -1, -1), 0); // clamped
        assert_eq!(pitch_to_midi(Step::G, 1, 9), 127); // clamped
    }

    #[test]
    fn test_midi_to_name() {
        assert_eq!(midi_to_name(60, false), "C4");
        assert_eq!(midi_to_name(61, false), "C#4");
        assert_eq!(midi_to_name(61, true), "Db4");
        assert_eq!(midi_to_name(58, true), "Bb3");
        assert_eq!(midi_to_name(0, false), "C-1");
    }

    #[test]
    fn test_written_spelling() {
        assert_eq!(pitch(Step::F, 1, 5).display_name(), "F#5");
        assert_eq!(pitch(Step::B, -1, 3).display_name(), "Bb3");
        assert_eq!(pitch(Step::B, 1, 3).display_name(), "C4");
        assert_eq!(pitch(Step::C, -1, 4).display_name(), "B3");
        assert_eq!(pitch(Step::G, 2, 4).display_name(), "A4");
        assert_eq!(pitch(Step::E, -2, 4).display_name(), "D4");
    }

    #[test]
    fn test_is_diatonic() {
        // C major
        assert!(is_diatonic(60, 0));
        assert!(!is_diatonic(61, 0));
        // G major has F#
        assert!(is_diatonic(66, 1));
        assert!(!is_diatonic(65, 1));
        // F major has Bb
        assert!(is_diatonic(70, -1));
        assert!(!is_diatonic(71, -1));
    }

    #[test]
    fn test_neighbors_in_c_major() {
        assert_eq!(upper_neighbor(60, 0), 62); // C -> D
        assert_eq!(upper_neighbor(64, 0), 65); // E -> F
        assert_eq!(lower_neighbor(60, 0), 59); // C -> B
        assert_eq!(lower_neighbor(62, 0), 60); // D -> C
    }

    #[test]
    fn test_neighbors_follow_key() {
        // In G major the step above E is F#
        assert_eq!(upper_neighbor(64, 1), 66);
        // In F major the step below C is Bb
        assert_eq!(lower_neighbor(72, -1), 70);
    }

    #[test]
    fn test_neighbor_of_chromatic_note() {
        // C# in C major: D is one semitone up, C one semitone down
        assert_eq!(upper_neighbor(61, 0), 62);
        assert_eq!(lower_neighbor(61, 0), 60);
    }

    #[test]
    fn test_chromatic_neighbor() {
        assert_eq!(chromatic_neighbor(60, 1, true), 61);
        assert_eq!(chromatic_neighbor(60, -1, false), 59);
        assert_eq!(chromatic_neighbor(60, 0, true), 62);
        assert_eq!(chromatic_neighbor(60, 2, false), 58);
    }
}
