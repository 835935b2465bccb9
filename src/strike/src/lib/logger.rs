use slog::{Drain, Level, Logger};
use std::fs::File;
use std::path::PathBuf;

/// Where log records go.
pub enum LoggingMode {
    /// Undecorated output to STDERR.
    Stderr,

    /// STDERR plus a copy in a file, like `strike ... |& tee file`.
    Tee(PathBuf),

    /// Full records to a file; STDERR stays quiet.
    File(PathBuf),
}

/// Prints the message only, prefixed with the level for warnings and worse.
pub struct StrikeFormat<D>
where
    D: slog_term::Decorator,
{
    decorator: D,
}

impl<D: slog_term::Decorator> StrikeFormat<D> {
    pub fn new(decorator: D) -> StrikeFormat<D> {
        StrikeFormat { decorator }
    }
}

impl<D: slog_term::Decorator> slog::Drain for StrikeFormat<D> {
    type Ok = ();
    type Err = std::io::Error;

    fn log(
        &self,
        record: &slog::Record<'_>,
        values: &slog::OwnedKVList,
    ) -> Result<Self::Ok, Self::Err> {
        self.decorator.with_record(record, values, |decorator| {
            if record.level() <= slog::Level::Warning {
                decorator.start_level()?;
                write!(decorator, "{}: ", record.level().as_str())?;
                decorator.start_whitespace()?;
            }

            decorator.start_msg()?;
            write!(decorator, "{}", record.msg())?;

            decorator.start_whitespace()?;
            writeln!(decorator)?;

            decorator.flush()?;
            Ok(())
        })
    }
}

fn create_drain(mode: LoggingMode) -> std::io::Result<Logger> {
    let logger = match mode {
        LoggingMode::Stderr => {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = StrikeFormat::new(decorator).fuse();
            let async_drain = slog_async::Async::new(drain).build().fuse();
            Logger::root(async_drain, slog::o!())
        }
        LoggingMode::File(out) => {
            let file = File::create(out)?;
            let decorator = slog_term::PlainDecorator::new(file);
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            Logger::root(slog_async::Async::new(drain).build().fuse(), slog::o!())
        }
        LoggingMode::Tee(out) => Logger::root(
            slog::Duplicate::new(
                create_drain(LoggingMode::Stderr)?,
                create_drain(LoggingMode::File(out))?,
            )
            .fuse(),
            slog::o!(),
        ),
    };
    Ok(logger)
}

/// `None` discards everything.
pub fn log_level(verbose_level: i64) -> Option<Level> {
    match verbose_level {
        -3 => Some(Level::Critical),
        -2 => Some(Level::Error),
        -1 => Some(Level::Warning),
        0 => Some(Level::Info),
        1 => Some(Level::Debug),
        x if x > 0 => Some(Level::Trace),
        _ => None,
    }
}

/// A negative `verbose_level` is quiet mode: warnings go first, then errors.
pub fn create_root_logger(verbose_level: i64, mode: LoggingMode) -> std::io::Result<Logger> {
    let Some(log_level) = log_level(verbose_level) else {
        return Ok(Logger::root(slog::Discard, slog::o!()));
    };
    let drain = slog::LevelFilter::new(create_drain(mode)?, log_level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(Logger::root(
        drain,
        slog::o!("version" => env!("CARGO_PKG_VERSION")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(log_level(0), Some(Level::Info));
        assert_eq!(log_level(2), Some(Level::Trace));
        assert_eq!(log_level(5), Some(Level::Trace));
        assert_eq!(log_level(-2), Some(Level::Error));
        assert_eq!(log_level(-4), None);
    }

    #[test]
    fn file_mode_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strike.log");
        {
            let log = create_root_logger(1, LoggingMode::File(path.clone())).unwrap();
            slog::debug!(log, "resolved action");
        }
        // Dropping the async drains joins their workers.
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("resolved action"));
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("strike.log");
        assert!(create_root_logger(0, LoggingMode::File(path)).is_err());
    }
}
