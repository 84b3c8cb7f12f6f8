//! HTTP date parsing and formatting.
//!
//! RFC 9110 §5.6.7 admits three date formats on the wire: the preferred
//! IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`), the obsolete RFC 850
//! form (`Sunday, 06-Nov-94 08:49:37 GMT`), and ANSI C `asctime()`
//! (`Sun Nov  6 08:49:37 1994`). Senders must emit the first; receivers
//! must accept all three.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, NaiveDateTime, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parses an HTTP date in any of the three RFC 9110 formats.
///
/// Returns `None` for unrecognized input or dates before the Unix epoch.
/// All three formats carry GMT (explicitly or by convention), so no
/// timezone conversion is involved.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// let t = cachet::http::date::parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(t, SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777));
/// ```
pub fn parse(value: &str) -> Option<SystemTime> {
    let parsed = [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())?;

    let timestamp = parsed.and_utc().timestamp();
    if timestamp < 0 {
        return None;
    }
    Some(SystemTime::UNIX_EPOCH + Duration::from_secs(timestamp as u64))
}

/// Formats a `SystemTime` as an IMF-fixdate string, the format HTTP
/// requires on output.
///
/// Times before the Unix epoch format as the epoch itself; sub-second
/// precision is truncated, as HTTP dates carry whole seconds only.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// let t = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
/// assert_eq!(cachet::http::date::format(t), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn format(time: SystemTime) -> String {
    let since_epoch = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let utc = DateTime::<Utc>::from_timestamp(since_epoch.as_secs() as i64, 0).unwrap_or_default();
    utc.format(IMF_FIXDATE).to_string()
}
