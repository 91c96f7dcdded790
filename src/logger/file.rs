/// Plain-text log file output
///
/// Lines are buffered and flushed on `flush_file_logging`, on error lines,
/// and when the buffer fills.
use once_cell::sync::Lazy;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

/// Open (append) the log file; failures are reported on stderr and logging
/// continues console-only
pub fn init_file_logging(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory {}: {}", parent.display(), e);
                return;
            }
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            if let Ok(mut sink) = LOG_FILE.lock() {
                *sink = Some(BufWriter::new(file));
            }
        }
        Err(e) => eprintln!("Failed to open log file {}: {}", path, e),
    }
}

pub fn write_to_file(line: &str, flush: bool) {
    if let Ok(mut sink) = LOG_FILE.lock() {
        if let Some(writer) = sink.as_mut() {
            let _ = writeln!(writer, "{}", line);
            if flush {
                let _ = writer.flush();
            }
        }
    }
}

pub fn flush_file_logging() {
    if let Ok(mut sink) = LOG_FILE.lock() {
        if let Some(writer) = sink.as_mut() {
            let _ = writer.flush();
        }
    }
}
