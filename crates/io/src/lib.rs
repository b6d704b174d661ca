// File I/O around the reconciliation engine

pub mod csv;
pub mod document;
pub mod error;
pub mod export;
pub mod worksheet;
pub mod xlsx;

pub use document::read_document_text;
pub use error::IoError;
pub use export::{write_bucket_csvs, write_json, write_records_file};
pub use worksheet::{load_worksheet_file, read_worksheet_grid};
