// Row parsing core
//
// The yearbook sheet intermixes titles, subtitles, table headers, data rows
// and noise in one flat column. Parsing is an ordered rule table: the first
// rule whose conditions accept a row classifies it, its extractor folds the
// row's fields into the running context, and the record builder emits flat
// records for the data-carrying row kinds.

pub mod classify;
pub mod context;
pub mod dispatch;
pub mod extract;

pub use classify::{classify, RowKind};
pub use context::ParseContext;
pub use dispatch::RowParser;
pub use extract::ParseError;
