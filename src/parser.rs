//! # MusicXML Reader
//!
//! Turns partwise MusicXML text into a [`ScoreDocument`].
//!
//! Reading happens in two steps:
//! 1. `quick_xml` events are assembled into a small element tree, which is where
//!    malformed XML (mismatched or unclosed tags, bad entities) is rejected.
//! 2. The tree is mapped onto the score types in [`crate::ast`]. This step never
//!    fails on musical content: unknown elements are skipped, and unparseable
//!    numbers fall back to defaults with a `log::warn!`.
//!
//! [`override_tempo`] is a separate text-level pass that rewrites every
//! `tempo="..."` attribute before parsing, and [`force_tempo`] applies the
//! same override to an already parsed score.

use crate::ast::*;
use crate::error::TimelineError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::str::FromStr;

/// Parse a partwise MusicXML document.
///
/// # Errors
/// - [`TimelineError::XmlError`] when the text is not well-formed XML
/// - [`TimelineError::InvalidDocument`] when the root is not `<score-partwise>`
///   or the score has no `<part>`
pub fn parse(xml: &str) -> Result<ScoreDocument, TimelineError> {
    let root = read_tree(xml)?;

    match root.name.as_str() {
        "score-partwise" => {}
        "score-timewise" => {
            return Err(TimelineError::InvalidDocument(
                "timewise scores are not supported".to_string(),
            ))
        }
        other => {
            return Err(TimelineError::InvalidDocument(format!(
                "expected <score-partwise>, found <{}>",
                other
            )))
        }
    }

    let parts: Vec<Part> = root.children_named("part").map(parse_part).collect();
    if parts.is_empty() {
        return Err(TimelineError::InvalidDocument(
            "score has no <part>".to_string(),
        ));
    }

    Ok(ScoreDocument { parts })
}

/// Replace the value of every `tempo="..."` attribute with `bpm`.
///
/// Whitespace around `=` is allowed. Only attributes are rewritten; the
/// conversion entry points also force `<metronome>` marks when
/// [`crate::ConvertOptions::tempo_override`] is set.
///
/// # Example
/// ```
/// use score_timeline::parser::override_tempo;
///
/// let xml = r#"<sound tempo="72"/><sound tempo = '100.5'/>"#;
/// assert_eq!(override_tempo(xml, 96.0), r#"<sound tempo="96"/><sound tempo = '96'/>"#);
/// ```
pub fn override_tempo(xml: &str, bpm: f64) -> String {
    const NAME: &str = "tempo";
    let replacement = format_bpm(bpm);
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(found) = rest.find(NAME) {
        let (before, after) = rest.split_at(found);
        out.push_str(before);
        out.push_str(NAME);
        let value = &after[NAME.len()..];

        let is_attribute = before
            .chars()
            .last()
            .map_or(false, char::is_whitespace);
        match attribute_value(value).filter(|_| is_attribute) {
            Some((lead, quote, tail)) => {
                out.push_str(lead);
                out.push(quote);
                out.push_str(&replacement);
                out.push(quote);
                rest = tail;
            }
            None => rest = value,
        }
    }

    out.push_str(rest);
    out
}

/// Split `text` following an attribute name into the part up to the opening
/// quote, the quote, and whatever follows the closing quote
fn attribute_value(text: &str) -> Option<(&str, char, &str)> {
    let value = text.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let close = value[1..].find(quote)?;
    let lead = &text[..text.len() - value.len()];
    Some((lead, quote, &value[close + 2..]))
}

/// Force every tempo directive of `score` to `bpm`, metronome marks included,
/// and state `bpm` at the start of each part so unmarked scores follow it too.
pub fn force_tempo(score: &mut ScoreDocument, bpm: f64) {
    for part in &mut score.parts {
        for measure in &mut part.measures {
            for element in &mut measure.elements {
                if let MeasureElement::Direction(direction) = element {
                    if direction.tempo.is_some() {
                        direction.tempo = Some(bpm);
                    }
                }
            }
        }
        if let Some(first) = part.measures.first_mut() {
            first.elements.insert(
                0,
                MeasureElement::Direction(Direction {
                    words: Vec::new(),
                    tempo: Some(bpm),
                }),
            );
        }
    }
}

fn format_bpm(bpm: f64) -> String {
    if bpm.fract() == 0.0 {
        format!("{:.0}", bpm)
    } else {
        bpm.to_string()
    }
}

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

impl XmlNode {
    fn open(start: &BytesStart, position: usize) -> Result<Self, TimelineError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(position, e))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(position, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

fn xml_error(position: usize, error: impl std::fmt::Display) -> TimelineError {
    TimelineError::XmlError {
        position,
        message: error.to_string(),
    }
}

fn read_tree(xml: &str) -> Result<XmlNode, TimelineError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(XmlNode::open(&e, position)?),
            Ok(Event::Empty(e)) => {
                let node = XmlNode::open(&e, position)?;
                attach(&mut stack, &mut root, node, position)?;
            }
            Ok(Event::End(e)) => {
                let node = stack.pop().ok_or_else(|| {
                    xml_error(
                        position,
                        format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        ),
                    )
                })?;
                attach(&mut stack, &mut root, node, position)?;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| xml_error(position, e))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => return Err(xml_error(reader.buffer_position(), e)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(
            reader.buffer_position(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| TimelineError::InvalidDocument("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
    position: usize,
) -> Result<(), TimelineError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(xml_error(
                position,
                format!("second root element <{}>", node.name),
            ))
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tree -> score
// ---------------------------------------------------------------------------

/// Parse a number, warning (and using `default`) when present but malformed
fn number_or<T: FromStr>(text: Option<&str>, field: &str, default: T) -> T {
    match text.map(str::trim) {
        None | Some("") => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable <{}> value {:?}", field, raw);
            default
        }),
    }
}

/// Durations are integral division counts, but some exporters write "2.0"
fn division_count(text: Option<&str>, field: &str) -> u32 {
    let value: f64 = number_or(text, field, 0.0);
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

fn parse_part(node: &XmlNode) -> Part {
    let id = node.attr("id").unwrap_or_default().to_string();
    let measures = node.children_named("measure").map(parse_measure).collect();
    Part { id, measures }
}

fn parse_measure(node: &XmlNode) -> Measure {
    let mut measure = Measure {
        number: node.attr("number").unwrap_or_default().to_string(),
        ..Default::default()
    };

    for child in &node.children {
        match child.name.as_str() {
            "attributes" => merge_attributes(&mut measure.attributes, child),
            "note" => measure.elements.push(MeasureElement::Note(parse_note(child))),
            "backup" => measure.elements.push(MeasureElement::Backup(division_count(
                child.child_text("duration"),
                "duration",
            ))),
            "forward" => measure.elements.push(MeasureElement::Forward(division_count(
                child.child_text("duration"),
                "duration",
            ))),
            "direction" => measure
                .elements
                .push(MeasureElement::Direction(parse_direction(child))),
            "sound" => {
                if let Some(tempo) = sound_tempo(child) {
                    measure.elements.push(MeasureElement::Direction(Direction {
                        words: Vec::new(),
                        tempo: Some(tempo),
                    }));
                }
            }
            "harmony" => measure
                .elements
                .push(MeasureElement::Harmony(parse_harmony(child))),
            _ => {}
        }
    }

    log::debug!(
        "measure {:?}: {} elements",
        measure.number,
        measure.elements.len()
    );
    measure
}

fn merge_attributes(attributes: &mut Attributes, node: &XmlNode) {
    if let Some(text) = node.child_text("divisions") {
        let divisions = division_count(Some(text), "divisions");
        if divisions > 0 {
            attributes.divisions = Some(divisions);
        } else {
            log::warn!("ignoring non-positive <divisions> {:?}", text);
        }
    }

    if let Some(time) = node.child("time") {
        let beats = time
            .child_text("beats")
            .map(|text| {
                // Compound signatures such as "3+2"
                text.split('+')
                    .map(|part| number_or(Some(part), "beats", 0u32))
                    .sum::<u32>()
            })
            .unwrap_or(0);
        let beat_type = number_or(time.child_text("beat-type"), "beat-type", 0u32);
        if beats > 0 && beat_type > 0 {
            attributes.time = Some(TimeSignature { beats, beat_type });
        } else {
            log::warn!("ignoring incomplete <time> signature");
        }
    }

    if let Some(key) = node.child("key") {
        let fifths = number_or(key.child_text("fifths"), "fifths", 0i8);
        attributes.key = Some(KeySignature { fifths });
    }
}

fn parse_note(node: &XmlNode) -> Note {
    let pitch = node.child("pitch").and_then(|p| {
        let step = p.child_text("step").and_then(Step::from_letter);
        if step.is_none() {
            log::warn!("skipping pitch without a valid <step>");
        }
        step.map(|step| Pitch {
            step,
            alter: number_or(p.child_text("alter"), "alter", 0.0f64).round() as i8,
            octave: number_or(p.child_text("octave"), "octave", 4i8),
        })
    });

    let grace = node.child("grace").map(|g| Grace {
        slash: g.attr("slash") == Some("yes"),
    });

    let mut tie = TieMarks::default();
    let notations: Vec<&XmlNode> = node.children_named("notations").collect();
    let tied = notations.iter().flat_map(|n| n.children_named("tied"));
    for mark in node.children_named("tie").chain(tied) {
        match mark.attr("type") {
            Some("start") => tie.start = true,
            Some("stop") => tie.stop = true,
            Some("continue") => {
                tie.start = true;
                tie.stop = true;
            }
            _ => {}
        }
    }

    let mut ornaments = Vec::new();
    let mut accidental_marks = Vec::new();
    for group in notations.iter().flat_map(|n| n.children_named("ornaments")) {
        for mark in &group.children {
            let long = mark.attr("long") == Some("yes");
            match mark.name.as_str() {
                "mordent" => ornaments.push(OrnamentMark::Mordent { long }),
                "inverted-mordent" => ornaments.push(OrnamentMark::InvertedMordent { long }),
                "trill-mark" => ornaments.push(OrnamentMark::TrillMark),
                "turn" => ornaments.push(OrnamentMark::Turn),
                "delayed-turn" => ornaments.push(OrnamentMark::DelayedTurn),
                "shake" => ornaments.push(OrnamentMark::Shake),
                "wavy-line" => {
                    if mark.attr("type") == Some("start") {
                        ornaments.push(OrnamentMark::WavyLine);
                    }
                }
                "accidental-mark" => match accidental_semitones(mark.text.trim()) {
                    Some(semitones) => accidental_marks.push(AccidentalMark {
                        semitones,
                        placement: match mark.attr("placement") {
                            Some("above") => Some(Placement::Above),
                            Some("below") => Some(Placement::Below),
                            _ => None,
                        },
                    }),
                    None => log::warn!("ignoring accidental-mark {:?}", mark.text.trim()),
                },
                other => log::warn!("ignoring unsupported ornament <{}>", other),
            }
        }
    }

    let lyric = node.child("lyric").map(|l| {
        l.children_named("text")
            .map(|t| t.text.trim())
            .collect::<Vec<_>>()
            .concat()
    });

    Note {
        pitch,
        duration: division_count(node.child_text("duration"), "duration"),
        chord: node.has_child("chord"),
        grace,
        voice: number_or(node.child_text("voice"), "voice", 1u32),
        staff: number_or(node.child_text("staff"), "staff", 1u32),
        tie,
        dots: node.children_named("dot").count() as u8,
        ornaments,
        accidental_marks,
        lyric,
    }
}

fn accidental_semitones(text: &str) -> Option<i8> {
    match text {
        "sharp" => Some(1),
        "flat" => Some(-1),
        "natural" => Some(0),
        "double-sharp" | "sharp-sharp" => Some(2),
        "flat-flat" | "double-flat" => Some(-2),
        _ => None,
    }
}

fn sound_tempo(node: &XmlNode) -> Option<f64> {
    let raw = node.attr("tempo")?;
    match raw.trim().parse::<f64>() {
        Ok(bpm) if bpm.is_finite() && bpm > 0.0 => Some(bpm),
        _ => {
            log::warn!("ignoring invalid sound tempo {:?}", raw);
            None
        }
    }
}

/// Quarter-note BPM from a `<metronome>` mark, e.g. dotted quarter = 60 -> 90
fn metronome_tempo(node: &XmlNode) -> Option<f64> {
    let per_minute: f64 = node
        .child_text("per-minute")?
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .find(|s| !s.is_empty())?
        .parse()
        .ok()?;
    let quarters = match node.child_text("beat-unit")? {
        "whole" => 4.0,
        "half" => 2.0,
        "quarter" => 1.0,
        "eighth" => 0.5,
        "16th" => 0.25,
        "32nd" => 0.125,
        _ => return None,
    };
    let dotted = if node.has_child("beat-unit-dot") { 1.5 } else { 1.0 };
    let bpm = per_minute * quarters * dotted;
    (bpm > 0.0).then_some(bpm)
}

fn parse_direction(node: &XmlNode) -> Direction {
    let types: Vec<&XmlNode> = node.children_named("direction-type").collect();

    let words = types
        .iter()
        .flat_map(|t| t.children_named("words"))
        .map(|w| w.text.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();

    let tempo = node.child("sound").and_then(sound_tempo).or_else(|| {
        types
            .iter()
            .flat_map(|t| t.children_named("metronome"))
            .find_map(metronome_tempo)
    });

    Direction { words, tempo }
}

fn parse_harmony(node: &XmlNode) -> Harmony {
    let spelled = |parent: &str, step: &str, alter: &str| {
        node.child(parent).and_then(|p| {
            let step = p.child_text(step).and_then(Step::from_letter)?;
            let alter = number_or(p.child_text(alter), alter, 0.0f64).round() as i8;
            Some((step, alter))
        })
    };

    let kind = node.child("kind");
    Harmony {
        root: spelled("root", "root-step", "root-alter"),
        kind: kind.map(|k| k.text.trim().to_string()).unwrap_or_default(),
        kind_text: kind.and_then(|k| k.attr("text")).map(str::to_string),
        bass: spelled("bass", "bass-step", "bass-alter"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(measures: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Piano</part-name></score-part></part-list>
  <part id="P1">{}</part>
</score-partwise>"#,
            measures
        )
    }

    fn first_measure(xml: &str) -> Measure {
        let score = parse(xml).unwrap();
        score.parts[0].measures[0].clone()
    }

    #[test]
    fn test_parse_basic_note() {
        let xml = wrap(
            r#"<measure number="1">
                <attributes><divisions>2</divisions><key><fifths>-1</fifths><mode>minor</mode></key>
                  <time><beats>3</beats><beat-type>4</beat-type></time></attributes>
                <note><pitch><step>B</step><alter>-1</alter><octave>3</octave></pitch>
                  <duration>2</duration><voice>1</voice><staff>2</staff></note>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        assert_eq!(measure.number, "1");
        assert_eq!(measure.attributes.divisions, Some(2));
        assert_eq!(measure.attributes.key, Some(KeySignature { fifths: -1 }));
        assert_eq!(
            measure.attributes.time,
            Some(TimeSignature { beats: 3, beat_type: 4 })
        );

        match &measure.elements[0] {
            MeasureElement::Note(note) => {
                assert_eq!(
                    note.pitch,
                    Some(Pitch { step: Step::B, alter: -1, octave: 3 })
                );
                assert_eq!(note.duration, 2);
                assert_eq!(note.staff, 2);
                assert!(!note.chord);
            }
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rest_chord_and_ties() {
        let xml = wrap(
            r#"<measure number="1">
                <note><rest/><duration>1</duration></note>
                <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration>
                  <tie type="start"/></note>
                <note><chord/><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration>
                  <notations><tied type="stop"/></notations></note>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        let notes: Vec<&Note> = measure
            .elements
            .iter()
            .filter_map(|e| match e {
                MeasureElement::Note(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(notes.len(), 3);
        assert!(notes[0].pitch.is_none());
        assert!(notes[1].tie.start && !notes[1].tie.stop);
        assert!(notes[2].chord);
        assert!(notes[2].tie.stop && !notes[2].tie.start);
    }

    #[test]
    fn test_parse_ornaments_and_grace() {
        let xml = wrap(
            r#"<measure number="1">
                <note><grace slash="yes"/><pitch><step>D</step><octave>5</octave></pitch></note>
                <note><pitch><step>C</step><octave>5</octave></pitch><duration>4</duration>
                  <notations><ornaments>
                    <mordent long="yes"/>
                    <accidental-mark placement="below">flat</accidental-mark>
                    <wavy-line type="stop"/>
                    <schleifer/>
                  </ornaments></notations></note>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        match (&measure.elements[0], &measure.elements[1]) {
            (MeasureElement::Note(grace), MeasureElement::Note(main)) => {
                assert_eq!(grace.grace, Some(Grace { slash: true }));
                assert_eq!(grace.duration, 0);
                assert_eq!(main.ornaments, vec![OrnamentMark::Mordent { long: true }]);
                assert_eq!(
                    main.accidental_marks,
                    vec![AccidentalMark {
                        semitones: -1,
                        placement: Some(Placement::Below)
                    }]
                );
            }
            other => panic!("unexpected elements {:?}", other),
        }
    }

    #[test]
    fn test_parse_directions() {
        let xml = wrap(
            r#"<measure number="1">
                <direction><direction-type><words>rit.</words></direction-type></direction>
                <direction><direction-type><metronome><beat-unit>quarter</beat-unit>
                  <beat-unit-dot/><per-minute>60</per-minute></metronome></direction-type></direction>
                <direction><direction-type><words>a tempo</words></direction-type>
                  <sound tempo="100"/></direction>
                <sound tempo="90"/>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        let directions: Vec<&Direction> = measure
            .elements
            .iter()
            .filter_map(|e| match e {
                MeasureElement::Direction(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(directions.len(), 4);
        assert_eq!(directions[0].words, vec!["rit.".to_string()]);
        assert_eq!(directions[0].tempo, None);
        assert_eq!(directions[1].tempo, Some(90.0));
        assert_eq!(directions[2].tempo, Some(100.0));
        assert_eq!(directions[3].tempo, Some(90.0));
    }

    #[test]
    fn test_parse_harmony_and_lyric() {
        let xml = wrap(
            r#"<measure number="1">
                <harmony><root><root-step>G</root-step></root><kind>dominant</kind>
                  <bass><bass-step>B</bass-step></bass></harmony>
                <note><pitch><step>G</step><octave>4</octave></pitch><duration>1</duration>
                  <lyric number="1"><syllabic>begin</syllabic><text>Hal</text></lyric>
                  <lyric number="2"><text>ignored</text></lyric></note>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        match &measure.elements[0] {
            MeasureElement::Harmony(h) => assert_eq!(h.label().as_deref(), Some("G7/B")),
            other => panic!("expected harmony, got {:?}", other),
        }
        match &measure.elements[1] {
            MeasureElement::Note(n) => assert_eq!(n.lyric.as_deref(), Some("Hal")),
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_duration_recovers() {
        let xml = wrap(
            r#"<measure number="1">
                <note><pitch><step>C</step><octave>4</octave></pitch><duration>abc</duration></note>
            </measure>"#,
        );
        let measure = first_measure(&xml);
        match &measure.elements[0] {
            MeasureElement::Note(n) => assert_eq!(n.duration, 0),
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let result = parse("<score-partwise><part id=\"P1\"><measure></part></score-partwise>");
        assert!(matches!(result, Err(TimelineError::XmlError { .. })));

        let result = parse("<score-partwise><part id=\"P1\">");
        assert!(matches!(result, Err(TimelineError::XmlError { .. })));
    }

    #[test]
    fn test_wrong_root_is_invalid() {
        let result = parse("<html><body/></html>");
        assert!(matches!(result, Err(TimelineError::InvalidDocument(_))));

        let result = parse("<score-partwise version=\"3.1\"></score-partwise>");
        assert!(matches!(result, Err(TimelineError::InvalidDocument(_))));
    }

    #[test]
    fn test_override_tempo() {
        let xml = r#"<direction><sound tempo="72"/></direction><sound dynamics="80" tempo="60"/>"#;
        let rewritten = override_tempo(xml, 140.0);
        assert_eq!(
            rewritten,
            r#"<direction><sound tempo="140"/></direction><sound dynamics="80" tempo="140"/>"#
        );
    }

    #[test]
    fn test_override_tempo_allows_spaces_around_equals() {
        let xml = "<sound tempo = \"72\"/><sound\ttempo\n=\n'60'/>";
        assert_eq!(
            override_tempo(xml, 90.0),
            "<sound tempo = \"90\"/><sound\ttempo\n=\n'90'/>"
        );
    }

    #[test]
    fn test_force_tempo_replaces_metronome_marks() {
        let xml = r#"<score-partwise><part id="P1"><measure number="1">
          <direction><direction-type><metronome><beat-unit>quarter</beat-unit><per-minute>60</per-minute></metronome></direction-type></direction>
          <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
        </measure><measure number="2">
          <direction><direction-type><words>Lento</words></direction-type></direction>
        </measure></part></score-partwise>"#;
        let mut score = parse(xml).unwrap();
        force_tempo(&mut score, 120.0);

        let tempos: Vec<Option<f64>> = score.parts[0]
            .measures
            .iter()
            .flat_map(|m| &m.elements)
            .filter_map(|e| match e {
                MeasureElement::Direction(d) => Some(d.tempo),
                _ => None,
            })
            .collect();
        assert_eq!(tempos, vec![Some(120.0), Some(120.0), None]);
    }

    #[test]
    fn test_override_tempo_leaves_other_text() {
        let xml = "<words>tempo=fast</words><sound xtempo=\"1\"/>";
        assert_eq!(override_tempo(xml, 90.0), xml);
    }
}
