//! Leveled emission macros routed to the default dispatcher.
//!
//! Each macro takes a format string with its positional arguments, then
//! optionally `;` and a flat key/value field list:
//!
//! ```ignore
//! log_info!("served {} in {}ms", path, elapsed; "status", 200, "cached", false);
//! ```
//!
//! Field values go through `json!`, so anything `Serialize` works.

#[doc(hidden)]
#[macro_export]
macro_rules! __loglane_emit {
    ($kind:ident, $fmt:literal $(, $arg:expr)* $(; $($field:expr),* $(,)?)?) => {
        $crate::default_dispatcher().emit_fmt(
            $crate::Kind::$kind,
            ::std::format_args!($fmt $(, $arg)*),
            ::std::vec![$($($crate::json!($field)),*)?],
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::__loglane_emit!(Debug, $($t)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => { $crate::__loglane_emit!(Info, $($t)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($t:tt)*) => { $crate::__loglane_emit!(Warn, $($t)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::__loglane_emit!(Error, $($t)*) };
}

/// Statistic event, labeled `STAT` and routed at Info
#[macro_export]
macro_rules! log_stat {
    ($($t:tt)*) => { $crate::__loglane_emit!(Stat, $($t)*) };
}

/// Dispatch, shut every sink down, then exit with status 1
#[macro_export]
macro_rules! log_fatal {
    ($($t:tt)*) => {{
        $crate::__loglane_emit!(Fatal, $($t)*);
        ::std::process::exit(1)
    }};
}

/// Dispatch, then panic with the formatted message
#[macro_export]
macro_rules! log_panic {
    ($($t:tt)*) => {{
        $crate::__loglane_emit!(Panic, $($t)*);
        ::std::unreachable!()
    }};
}

#[cfg(test)]
mod tests {
    use crate::global::{set_default, TEST_GUARD};
    use crate::testing::Recorder;
    use crate::Dispatcher;
    use loglane_core::{json, FileOptions, Level, SinkConfig};
    use loglane_output::build_sink;
    use std::panic::{self, AssertUnwindSafe};
    use std::process::Command;
    use std::sync::PoisonError;

    const FATAL_CHILD_LOG: &str = "LOGLANE_TEST_FATAL_MACRO_LOG";

    #[test]
    fn test_macros_route_to_default() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(PoisonError::into_inner);

        let recorder = Recorder::new(Level::Debug);
        let dispatcher = Dispatcher::new();
        dispatcher.add_sink(recorder.clone());
        let previous = set_default(dispatcher);

        let path = "/health";
        log_debug!("plain");
        log_info!("served {} in {}ms", path, 12; "status", 200, "cached", false);
        log_warn!("retrying"; "attempt", 2);
        log_error!("failed {}", path);
        log_stat!("queue"; "depth", 17, "ratio", 0.5);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            log_panic!("corrupt index {}", 4; "shard", "a");
        }));
        assert!(result.is_err());

        set_default(previous);

        let events = recorder.events();
        let labels: Vec<&str> = events.iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["DBUG", "INFO", "WARN", "EROR", "STAT", "PANC"]);

        assert_eq!(events[1].message(), "served /health in 12ms");
        assert_eq!(events[1].field("status"), Some(&json!(200)));
        assert_eq!(events[1].field("cached"), Some(&json!(false)));
        assert_eq!(events[2].field("attempt"), Some(&json!(2)));
        assert!(events[3].fields().is_empty());
        assert_eq!(events[4].field("ratio"), Some(&json!(0.5)));
        assert_eq!(events[5].message(), "corrupt index 4");
        assert_eq!(events[5].field("shard"), Some(&json!("a")));
    }

    #[test]
    fn test_log_fatal_flushes_default_then_exits() {
        if let Ok(path) = std::env::var(FATAL_CHILD_LOG) {
            let dispatcher = Dispatcher::new();
            let sink = build_sink(&SinkConfig::File(FileOptions::new(path))).unwrap();
            dispatcher.add_sink(sink);
            set_default(dispatcher);
            log_fatal!("out of {}", "memory"; "free", 0);
        }

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fatal.log");
        let status = Command::new(std::env::current_exe().unwrap())
            .args([
                "--exact",
                "macros::tests::test_log_fatal_flushes_default_then_exits",
                "--test-threads=1",
            ])
            .env(FATAL_CHILD_LOG, &path)
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(1));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"level\":\"FTAL\""));
        assert!(content.contains("\"msg\":\"out of memory\""));
    }
}
