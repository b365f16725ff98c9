//! Application logger binding.
//!
//! The registry carries an `Arc<dyn Logger>` so embedders can decide where
//! application-level messages go. The default is [`NullLogger`]: nothing is
//! logged unless a host binds something else. [`TracingLogger`] forwards to
//! the `tracing` subscriber the binary installs.

use tracing::Level;

/// Where the application reports noteworthy events.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

/// Discards everything. The default binding.
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Forwards to the process-wide `tracing` subscriber.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        if level == Level::ERROR {
            tracing::error!("{message}");
        } else if level == Level::WARN {
            tracing::warn!("{message}");
        } else if level == Level::INFO {
            tracing::info!("{message}");
        } else if level == Level::DEBUG {
            tracing::debug!("{message}");
        } else {
            tracing::trace!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<(Level, String)>>);

    impl Logger for Capture {
        fn log(&self, level: Level, message: &str) {
            self.0.lock().unwrap().push((level, message.to_owned()));
        }
    }

    #[test]
    fn default_methods_pick_the_level() {
        let capture = Capture(Mutex::new(Vec::new()));
        capture.error("bad");
        capture.info("fine");

        let seen = capture.0.into_inner().unwrap();
        assert_eq!(seen[0], (Level::ERROR, "bad".to_owned()));
        assert_eq!(seen[1], (Level::INFO, "fine".to_owned()));
    }

    #[test]
    fn null_logger_swallows_everything() {
        NullLogger.error("nobody hears this");
    }
}
