use score_timeline::{ConvertOptions, TimelineError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct ConvertError {
    kind: &'static str,
    message: String,
    position: Option<usize>,
}

fn error_to_convert_error(e: TimelineError) -> ConvertError {
    match e {
        TimelineError::XmlError { position, message } => ConvertError {
            kind: "xml",
            message,
            position: Some(position),
        },
        TimelineError::InvalidDocument(message) => ConvertError {
            kind: "document",
            message,
            position: None,
        },
        TimelineError::OptionsError(message) => ConvertError {
            kind: "options",
            message,
            position: None,
        },
    }
}

fn to_js_error(e: TimelineError) -> JsValue {
    let error = error_to_convert_error(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Options arrive as a JSON object (camelCase or kebab-case keys); empty means defaults
fn parse_options(options_json: &str) -> Result<ConvertOptions, JsValue> {
    if options_json.trim().is_empty() {
        return Ok(ConvertOptions::default());
    }
    serde_json::from_str(options_json)
        .map_err(|e| to_js_error(TimelineError::OptionsError(e.to_string())))
}

/// MusicXML to a JSON array of note events
#[wasm_bindgen]
pub fn convert_score(xml: &str, options_json: &str) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let notes = score_timeline::convert_score(xml, &options).map_err(to_js_error)?;
    to_json(&notes)
}

/// MusicXML to a JSON array of progression entries
#[wasm_bindgen]
pub fn chord_progression(xml: &str, options_json: &str) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let entries = score_timeline::chord_progression(xml, &options).map_err(to_js_error)?;
    to_json(&entries)
}

/// MusicXML to `{"notes": [...], "progression": [...]}`
#[wasm_bindgen]
pub fn convert(xml: &str, options_json: &str) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let timeline = score_timeline::convert(xml, &options).map_err(to_js_error)?;
    to_json(&timeline)
}

/// Rewrite every tempo attribute, for callers that render the score themselves
#[wasm_bindgen]
pub fn override_tempo(xml: &str, bpm: f64) -> String {
    score_timeline::override_tempo(xml, bpm)
}
