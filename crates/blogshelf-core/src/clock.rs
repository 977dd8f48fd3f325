//! Timestamp source for generated article ids and slug suffixes.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current Unix time in milliseconds, strictly increasing within the process.
///
/// Two calls in the same millisecond return consecutive values, so ids built
/// from it never collide inside one server.
pub fn unique_millis() -> i64 {
  let now = Utc::now().timestamp_millis();
  let prev = LAST_MILLIS
    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
      Some(now.max(prev + 1))
    })
    .unwrap_or_else(|prev| prev);
  now.max(prev + 1)
}
