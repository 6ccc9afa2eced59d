use crate::utils::Result;
use flate2::{write::GzEncoder, Compression};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Destination of an output file; gzip streams need an explicit finish.
pub enum OutputSink {
    Plain(Box<dyn Write + Send>),
    Gzip(GzEncoder<File>),
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            OutputSink::Plain(w) => w.write(buf),
            OutputSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            OutputSink::Plain(w) => w.flush(),
            OutputSink::Gzip(w) => w.flush(),
        }
    }
}

pub type OutputWriter = BufWriter<OutputSink>;

pub fn create_writer<T, F>(output_prefix: &str, output_suffix: &str, f: F) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    let output_path = format!("{}.{}", output_prefix, output_suffix);
    f(&output_path)
}

/// Opens `path` for writing, gzip-compressing when it ends in `.gz`; `-` is stdout.
pub fn open_output(path: &str) -> Result<OutputWriter> {
    if path == "-" {
        return Ok(BufWriter::new(OutputSink::Plain(Box::new(std::io::stdout()))));
    }
    let file = File::create(path).map_err(|e| format!("{}: {}", path, e))?;
    let sink = if path.ends_with(".gz") {
        OutputSink::Gzip(GzEncoder::new(file, Compression::default()))
    } else {
        OutputSink::Plain(Box::new(file))
    };
    Ok(BufWriter::new(sink))
}

/// Flushes buffered output and writes the gzip trailer, reporting any IO error.
pub fn close_output(writer: OutputWriter) -> Result<()> {
    let sink = writer.into_inner().map_err(|e| e.to_string())?;
    match sink {
        OutputSink::Plain(mut w) => w.flush().map_err(|e| e.to_string()),
        OutputSink::Gzip(encoder) => encoder
            .finish()
            .and_then(|mut file| file.flush())
            .map_err(|e| e.to_string()),
    }
}
