use time::{Duration, OffsetDateTime};

/// True while `saved_at` is younger than `ttl` at `now`. Timestamps ahead of `now` are stale.
pub fn is_fresh(saved_at: OffsetDateTime, ttl: Duration, now: OffsetDateTime) -> bool {
    let age = now - saved_at;
    !age.is_negative() && age < ttl
}

pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_epoch_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}
