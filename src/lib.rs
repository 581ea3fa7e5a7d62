pub mod api;
pub mod ast;
pub mod error;
pub mod options;
pub mod parser;
pub mod pitch;
pub mod timeline;

pub use api::{chord_progression, convert, convert_score, convert_with_yaml};
pub use ast::*;
pub use error::*;
pub use options::ConvertOptions;
pub use parser::{force_tempo, override_tempo, parse};
pub use timeline::{EntryContent, Hand, NoteEvent, ProgressionEntry, Timeline};
