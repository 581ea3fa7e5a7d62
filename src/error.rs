//! # Error Types
//!
//! This module defines all error types for the score-timeline compiler.
//!
//! Only structural problems are errors. Everything the compiler can recover from
//! (a missing `<divisions>`, an unparseable duration, an unmatched tie) is logged
//! through the `log` facade and compilation continues with defaults.
//!
//! ## Error Types
//! - `XmlError` - The input is not well-formed XML (byte offset included)
//! - `InvalidDocument` - Well-formed XML that is not a partwise MusicXML score
//! - `OptionsError` - A YAML options document could not be read
//!
//! ## Usage
//! ```rust
//! use score_timeline::{convert_score, ConvertOptions, TimelineError};
//!
//! let xml = "<score-partwise><part id=\"P1\">";
//! match convert_score(xml, &ConvertOptions::default()) {
//!     Ok(notes) => println!("{} notes", notes.len()),
//!     Err(TimelineError::XmlError { position, message }) => {
//!         eprintln!("Malformed XML at byte {}: {}", position, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// The document could not be read as XML.
    ///
    /// Raised for mismatched or unclosed tags, bad entities, and anything else
    /// the XML reader rejects. `position` is the byte offset where reading stopped.
    ///
    /// # Example
    /// ```
    /// # use score_timeline::TimelineError;
    /// let err = TimelineError::XmlError {
    ///     position: 42,
    ///     message: "unclosed element <measure>".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed XML at byte 42: unclosed element <measure>");
    /// ```
    #[error("Malformed XML at byte {position}: {message}")]
    XmlError { position: usize, message: String },

    /// The XML is well formed but is not a score the compiler understands.
    ///
    /// # Example
    /// ```
    /// # use score_timeline::TimelineError;
    /// let err = TimelineError::InvalidDocument("expected <score-partwise>, found <html>".to_string());
    /// assert_eq!(err.to_string(), "Invalid document: expected <score-partwise>, found <html>");
    /// ```
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Conversion options could not be parsed.
    ///
    /// # Example
    /// ```
    /// # use score_timeline::TimelineError;
    /// let err = TimelineError::OptionsError("tempo-override: invalid type".to_string());
    /// assert_eq!(err.to_string(), "Invalid options: tempo-override: invalid type");
    /// ```
    #[error("Invalid options: {0}")]
    OptionsError(String),
}
