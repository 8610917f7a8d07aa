// Document I/O: control lists in, annotated sheets out

pub mod annotate;
pub mod backup;
pub mod csv;
pub mod document;
pub mod error;
pub mod layout;
pub mod xlsx;

pub use annotate::{annotate, AnnotatedSheet, AnnotationColumns};
pub use document::{read_sheets, select_sheet, Document, Format};
pub use error::IoError;
