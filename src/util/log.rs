//! Extension logging (sqlite3_log).
//!
//! A host may install its own callback, the way `SQLITE_CONFIG_LOG` does.
//! Without one, messages are emitted as `tracing` events.

use std::sync::Mutex;

/// Log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warning = 2,
    Notice = 3,
}

type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

static LOG_CALLBACK: Mutex<Option<LogCallback>> = Mutex::new(None);

/// Log a message.
pub fn ext_log(level: LogLevel, message: &str) {
    if let Ok(guard) = LOG_CALLBACK.lock() {
        if let Some(ref callback) = *guard {
            callback(level, message);
            return;
        }
    }
    match level {
        LogLevel::Error => tracing::error!(target: "rustql_ext", "{}", message),
        LogLevel::Warning => tracing::warn!(target: "rustql_ext", "{}", message),
        LogLevel::Notice => tracing::info!(target: "rustql_ext", "{}", message),
    }
}

/// Configure the log callback.
pub fn config_log(callback: impl Fn(LogLevel, &str) + Send + Sync + 'static) {
    if let Ok(mut guard) = LOG_CALLBACK.lock() {
        *guard = Some(Box::new(callback));
    }
}

/// Clear the log callback.
pub fn clear_log_callback() {
    if let Ok(mut guard) = LOG_CALLBACK.lock() {
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[test]
    fn test_callback_receives_messages() {
        let seen: Arc<StdMutex<Vec<(LogLevel, String)>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        config_log(move |level, msg| {
            sink.lock().unwrap().push((level, msg.to_string()));
        });
        ext_log(LogLevel::Warning, "codec detached");
        clear_log_callback();
        ext_log(LogLevel::Notice, "not captured");

        let seen = seen.lock().unwrap();
        assert!(seen
            .iter()
            .any(|(l, m)| *l == LogLevel::Warning && m == "codec detached"));
        assert!(!seen.iter().any(|(_, m)| m == "not captured"));
    }
}
