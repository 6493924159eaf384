//! Swallowed failures must still leave a log line naming the path involved.

use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

use patchfs::{replace, unpack_packed_archive};

/// Appends written bytes into a shared Vec<u8>.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a scoped subscriber and return everything it logged at `level`.
fn capture(level: &str, f: impl FnOnce()) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new(level)).with(layer);
    let dispatch = tracing::Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, f);

    let bytes = buf.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn unpack_failure_logs_archive_path() {
    let td = tempdir().unwrap();
    let packed = td.path().join("broken-payload.pack.gz");
    fs::write(&packed, b"not gzip").unwrap();
    let target = td.path().join("out.jar");

    let logs = capture("warn", || {
        assert!(!unpack_packed_archive(&packed, &target));
    });
    assert!(logs.contains("Failed to unpack packed archive"), "logs: {logs}");
    assert!(logs.contains("broken-payload.pack.gz"), "logs: {logs}");
}

#[test]
fn replace_success_is_quiet_at_warn_level() {
    let td = tempdir().unwrap();
    let src = td.path().join("s");
    let dest = td.path().join("d");
    fs::write(&src, b"x").unwrap();

    let logs = capture("warn", || {
        assert!(replace(&src, &dest));
    });
    assert!(logs.is_empty(), "unexpected logs: {logs}");
}

#[test]
fn replace_reports_strategy_at_info_level() {
    let td = tempdir().unwrap();
    let src = td.path().join("s");
    let dest = td.path().join("d");
    fs::write(&src, b"x").unwrap();

    let logs = capture("info", || {
        assert!(replace(&src, &dest));
    });
    assert!(logs.contains("direct-rename"), "logs: {logs}");
}
