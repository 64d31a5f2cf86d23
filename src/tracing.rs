//! Process-wide log subscriber. `log` records are bridged into `tracing`
//! and written to stderr, and additionally to a log file once one is set.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

type FileSlot = Arc<RwLock<Option<File>>>;

#[derive(Clone)]
struct TeeWriter {
    file: FileSlot,
}

struct TeeHandle {
    file: FileSlot,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for TeeWriter {
    type Writer = TeeHandle;

    fn make_writer(&'a self) -> Self::Writer {
        TeeHandle {
            file: self.file.clone(),
        }
    }
}

impl Write for TeeHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        if let Ok(mut slot) = self.file.write() {
            if let Some(file) = slot.as_mut() {
                let _ = file.write_all(&buf[..written]);
            }
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Ok(mut slot) = self.file.write() {
            if let Some(file) = slot.as_mut() {
                let _ = file.flush();
            }
        }
        Ok(())
    }
}

static WRITER: OnceLock<TeeWriter> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Calling it again only swaps the log file.
pub fn init(log_file: Option<&Path>) {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let writer = WRITER
        .get_or_init(|| TeeWriter {
            file: Arc::new(RwLock::new(None)),
        })
        .clone();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();

    set_log_file(log_file);
}

/// Starts (or stops, with `None`) copying log lines to `log_file`. Missing
/// parent directories are created; a file that cannot be opened is reported
/// and logging continues on stderr only.
pub fn set_log_file(log_file: Option<&Path>) {
    let Some(writer) = WRITER.get() else {
        return;
    };

    let file = match log_file {
        Some(path) => match open_append(path) {
            Ok(file) => Some(file),
            Err(err) => {
                log::warn!("Cannot open log file {}: {}", path.display(), err);
                None
            }
        },
        None => None,
    };

    if let Ok(mut slot) = writer.file.write() {
        *slot = file;
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
