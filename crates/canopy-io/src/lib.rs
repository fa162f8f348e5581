//! CSV reading and writing for canopy datasets.

mod error;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::CsvReader;
pub use writer::DatasetWriter;
