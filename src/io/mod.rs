mod format;
mod input;

pub use format::DocumentFormat;
pub use input::{parse_document_str, read_document};
