//! Grace-note expansion.
//!
//! A run of grace notes borrows time from the principal note that follows it.
//!
//! - **Long appoggiatura** (any unslashed grace in the run): played on the beat,
//!   taking half the principal note (two thirds if it is dotted), split evenly.
//!   The principal note starts late and is shortened by the same amount.
//! - **Acciaccatura** (all graces slashed): played before the beat, one ornament
//!   unit per grace but never more than a quarter of the principal note. The
//!   principal note keeps its written onset and is shortened by the stolen time.

/// One grace note of a run, in written order
#[derive(Debug, Clone, PartialEq)]
pub struct GraceNote {
    pub pitch: u8,
    pub name: String,
    pub slashed: bool,
}

/// A grace note placed relative to the start of its group, in divisions
#[derive(Debug, Clone, PartialEq)]
pub struct GraceSubNote {
    pub pitch: u8,
    pub name: String,
    pub offset: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraceExpansion {
    pub notes: Vec<GraceSubNote>,
    /// Divisions taken from the principal note
    pub stolen: f64,
    /// Whether the group starts on the principal note's beat
    pub on_beat: bool,
}

impl GraceExpansion {
    /// Play an acciaccatura on the beat instead. Used when the group would
    /// otherwise start before the score does.
    pub fn on_beat(mut self) -> Self {
        self.on_beat = true;
        self
    }
}

/// Lay out a grace run in front of a principal note of `main_duration` divisions
pub fn expand(group: &[GraceNote], main_duration: f64, dotted: bool, unit: f64) -> GraceExpansion {
    if group.is_empty() {
        return GraceExpansion {
            notes: Vec::new(),
            stolen: 0.0,
            on_beat: false,
        };
    }

    let count = group.len() as f64;
    let long = group.iter().any(|g| !g.slashed);

    let (per_note, on_beat) = if long {
        let fraction = if dotted { 2.0 / 3.0 } else { 0.5 };
        let target = main_duration * fraction;
        let whole = (target / count).floor();
        (if whole > 0.0 { whole } else { target / count }, true)
    } else {
        let stolen = (main_duration / 4.0).min(count * unit);
        (stolen / count, false)
    };

    let notes = group
        .iter()
        .enumerate()
        .map(|(i, grace)| GraceSubNote {
            pitch: grace.pitch,
            name: grace.name.clone(),
            offset: per_note * i as f64,
            duration: per_note,
        })
        .collect();

    GraceExpansion {
        notes,
        stolen: per_note * count,
        on_beat,
    }
}
