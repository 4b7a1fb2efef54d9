//! `log` sink: logcat on Android, stderr elsewhere.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CoreLogger;

static LOGGER: CoreLogger = CoreLogger;

/// Installs the core logger once; later calls (or a logger installed by the
/// host) are left alone.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        let level = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        log::set_max_level(level);
    }
}

impl Log for CoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("{}: {}", record.target(), record.args());
        write_line(record.level(), &msg);
    }

    fn flush(&self) {}
}

#[cfg(target_os = "android")]
fn write_line(level: Level, msg: &str) {
    use android_log_sys::LogPriority;
    use std::ffi::CString;

    let priority = match level {
        Level::Error => LogPriority::ERROR,
        Level::Warn => LogPriority::WARN,
        Level::Info => LogPriority::INFO,
        Level::Debug => LogPriority::DEBUG,
        Level::Trace => LogPriority::VERBOSE,
    };
    let c_msg = match CString::new(msg) {
        Ok(c) => c,
        Err(_) => CString::new(msg.replace('\0', "?")).unwrap_or_default(),
    };
    unsafe {
        let tag = b"fieldsign\0";
        android_log_sys::__android_log_print(
            priority as _,
            tag.as_ptr() as *const _,
            b"%s\0".as_ptr() as *const _,
            c_msg.as_ptr(),
        );
    }
}

#[cfg(not(target_os = "android"))]
fn write_line(level: Level, msg: &str) {
    eprintln!("[{level}] {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        assert!(log::max_level() >= LevelFilter::Info);
    }
}
