//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00][01:15.00] Repeated chorus
//!
//! Only `[MM:SS.ff]`-style tags (one to three fraction digits) count as
//! timestamps. Lines without one, and lines whose text is empty once tags are
//! removed, are dropped.

/// A single line of lyrics with timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub time: f64,
    /// The lyrics text, never empty
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// Parse raw LRC text into lines sorted by time.
///
/// Lines sharing a timestamp keep the order they were emitted in.
pub fn parse(content: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in content.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.is_empty() {
            continue;
        }

        let (times, text) = split_tags(raw);
        if times.is_empty() {
            continue;
        }
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        lines.extend(times.into_iter().map(|t| LyricLine::new(t, text)));
    }

    // Vec::sort_by is stable.
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

/// Collect every timestamp tag in the line, in order, and return the line with
/// those tags removed.
fn split_tags(line: &str) -> (Vec<f64>, String) {
    let mut times = Vec::new();
    let mut text = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(open) = rest.find('[') {
        text.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match parse_tag(candidate) {
            Some((secs, len)) => {
                times.push(secs);
                rest = &candidate[len..];
            }
            None => {
                text.push('[');
                rest = &candidate[1..];
            }
        }
    }
    text.push_str(rest);

    (times, text)
}

/// Parse a tag at the start of `s`. Returns seconds and the tag's byte length.
///
/// Accepts `[MM:SS.f]`, `[MM:SS.ff]` or `[MM:SS.fff]` with two-digit minutes and
/// seconds. The fraction is tenths, hundredths or milliseconds by its width.
fn parse_tag(s: &str) -> Option<(f64, usize)> {
    let b = s.as_bytes();
    if b.first() != Some(&b'[') || b.get(3) != Some(&b':') || b.get(6) != Some(&b'.') {
        return None;
    }
    let minutes = two_digits(b.get(1..3)?)?;
    let seconds = two_digits(b.get(4..6)?)?;

    let frac_len = b[7..].iter().take_while(|c| c.is_ascii_digit()).count();
    if !(1..=3).contains(&frac_len) || b.get(7 + frac_len) != Some(&b']') {
        return None;
    }
    let frac = b[7..7 + frac_len]
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
    let ms = frac * 10u32.pow(3 - frac_len as u32);

    let time = f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(ms) / 1000.0;
    Some((time, 8 + frac_len))
}

fn two_digits(pair: &[u8]) -> Option<u32> {
    match pair {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}
