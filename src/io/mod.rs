//! I/O module: fixed-column records, the parameter-field codec, and the
//! IGES reader/writer

pub mod params;
pub mod record;
pub mod reader;
pub mod writer;

pub use reader::{IgesReader, IgesReaderConfiguration};
pub use writer::IgesWriter;
