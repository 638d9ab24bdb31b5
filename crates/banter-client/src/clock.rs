//! Wall-clock display stamps for outbound messages.
//!
//! The wire carries human-facing `HH:MM` strings, not machine timestamps;
//! peers render them verbatim.

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Two-digit hour:minute format used on the wire.
const HH_MM: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Format a moment as the display stamp carried on TALK frames.
pub fn display_time(moment: OffsetDateTime) -> String {
    moment.format(HH_MM).unwrap_or_default()
}

/// Current wall-clock stamp, in local time when the offset is known.
///
/// Falls back to UTC when the local offset cannot be determined (the
/// `time` crate refuses to guess in multi-threaded processes).
pub fn now_display_time() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    display_time(now)
}
