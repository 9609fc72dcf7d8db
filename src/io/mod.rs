//! Destinations for verbose solver output.
//!
//! Solver progress tables are written to a [`PrintTarget`].   Besides the
//! usual stdout, file, stream and buffer targets, output can be forwarded
//! line by line to `tracing` so that it lands wherever the application
//! already collects its logs.

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

/// Target used for `tracing` events emitted by [`PrintTarget::Tracing`]
pub const TRACING_TARGET: &str = "mathprog::output";

/// Destination for verbose solver output
#[derive(Default)]
pub enum PrintTarget {
    #[default]
    Stdout,
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
    /// one `tracing` event per complete line; holds the partial line
    Tracing(Vec<u8>),
    Sink,
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrintTarget::Stdout => "Stdout",
            PrintTarget::File(_) => "File",
            PrintTarget::Buffer(_) => "Buffer",
            PrintTarget::Stream(_) => "Stream",
            PrintTarget::Tracing(_) => "Tracing",
            PrintTarget::Sink => "Sink",
        };
        write!(f, "PrintTarget::{}", name)
    }
}

fn emit_line(line: &[u8]) {
    let line = String::from_utf8_lossy(line);
    tracing::info!(target: TRACING_TARGET, "{}", line.trim_end());
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout => std::io::stdout().write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Tracing(pending) => {
                pending.extend_from_slice(buf);
                while let Some(end) = pending.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=end).collect();
                    emit_line(&line);
                }
                Ok(buf.len())
            }
            PrintTarget::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout => std::io::stdout().flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Stream(stream) => stream.flush(),
            PrintTarget::Tracing(pending) => {
                if !pending.is_empty() {
                    emit_line(pending);
                    pending.clear();
                }
                Ok(())
            }
            PrintTarget::Buffer(_) | PrintTarget::Sink => Ok(()),
        }
    }
}

/// Implemented by anything that owns a [`PrintTarget`]
pub trait ConfigurablePrintTarget {
    fn print_to_stdout(&mut self);
    fn print_to_file(&mut self, file: File);
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// forward output to `tracing` at info level
    fn print_to_tracing(&mut self);
    /// discard all output
    fn print_to_sink(&mut self);
    /// collect output in memory, see [`get_print_buffer`](Self::get_print_buffer)
    fn print_to_buffer(&mut self);
    /// contents of the buffer set up by [`print_to_buffer`](Self::print_to_buffer)
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout;
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_tracing(&mut self) {
        *self = PrintTarget::Tracing(Vec::new());
    }

    fn print_to_sink(&mut self) {
        *self = PrintTarget::Sink;
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            _ => Err(Error::new(ErrorKind::Other, "output is not being buffered")),
        }
    }
}
