//! stream/mod.rs
//! Streaming writer and reader, I/O adapters and the reencode entry points.

pub mod io;
pub mod writer;
pub mod reader;
pub mod core;

pub use io::{open_input, open_output, InputSource, OpenedOutput, OutputSink};
pub use writer::{CptvWriter, WriterPhase};
pub use reader::CptvReader;
pub use self::core::{reencode, reencode_stream, ReencodeReport};
