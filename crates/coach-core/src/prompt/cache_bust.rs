//! Process-wide strictly increasing timestamp source for dev-mode prompts.
//!
//! Wall-clock reads can repeat (coarse clocks, fast successive calls), so
//! each stamp is `max(now, last + 1)` in nanoseconds. Two stamps taken in
//! the same process are never equal.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

static LAST_STAMP_NANOS: AtomicI64 = AtomicI64::new(0);

/// Next unique stamp in nanoseconds since the Unix epoch.
pub fn next_stamp_nanos() -> i64 {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    let mut last = LAST_STAMP_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_STAMP_NANOS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// One cache-busting comment line, e.g.
/// `<!-- cache-bust: 2025-01-01T00:00:00.000000001Z -->`.
pub fn cache_bust_line() -> String {
    let stamp = DateTime::<Utc>::from_timestamp_nanos(next_stamp_nanos());
    format!(
        "<!-- cache-bust: {} -->",
        stamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    )
}

/// Whether `line` is a cache-busting comment.
pub fn is_cache_bust_line(line: &str) -> bool {
    line.starts_with("<!-- cache-bust:") && line.ends_with("-->")
}
