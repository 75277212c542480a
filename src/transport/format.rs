/// Render milliseconds as `m:s`, or `h:m:s` from one hour up. Fields are not
/// zero-padded.
pub fn readable_time(ms: u64) -> String {
    let hrs = ms / 3_600_000;
    let min = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1000;
    if hrs < 1 {
        format!("{min}:{secs}")
    } else {
        format!("{hrs}:{min}:{secs}")
    }
}
