//! WebVTT reading and writing.
//!
//! Covers the subset this tool edits: the `WEBVTT` header, cue blocks with
//! `HH:MM:SS.mmm --> HH:MM:SS.mmm` timing lines and plain text payloads.
//! Optional cue identifiers are accepted and dropped (cues are addressed
//! by index), cue settings after the end timestamp are ignored, and
//! NOTE/STYLE/REGION blocks are skipped.

use std::fmt;

use crate::entities::cue::{Cue, CueTrack};

#[derive(Debug)]
pub enum VttError {
    MissingHeader,
    BadTimestamp { line: usize, found: String },
    BadTimingLine { line: usize },
    InvalidInterval { line: usize, start: f64, end: f64 },
}

impl fmt::Display for VttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VttError::MissingHeader => write!(f, "missing WEBVTT header"),
            VttError::BadTimestamp { line, found } => {
                write!(f, "line {}: bad timestamp '{}'", line, found)
            }
            VttError::BadTimingLine { line } => {
                write!(f, "line {}: expected 'start --> end' timing line", line)
            }
            VttError::InvalidInterval { line, start, end } => {
                write!(
                    f,
                    "line {}: cue start {:.3} must be before end {:.3}",
                    line, start, end
                )
            }
        }
    }
}

impl std::error::Error for VttError {}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub fn parse_timestamp(text: &str, line: usize) -> Result<f64, VttError> {
    let bad = || VttError::BadTimestamp {
        line,
        found: text.to_string(),
    };

    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(bad());
    }

    let mut secs = 0.0f64;
    for (i, part) in parts.iter().enumerate() {
        let value: f64 = if i == parts.len() - 1 {
            part.parse().map_err(|_| bad())?
        } else {
            part.parse::<u32>().map_err(|_| bad())? as f64
        };
        if value < 0.0 {
            return Err(bad());
        }
        secs = secs * 60.0 + value;
    }
    Ok(secs)
}

/// Format seconds as `HH:MM:SS.mmm` (rounded to milliseconds).
pub fn format_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let s = (total_ms / 1000) % 60;
    let m = (total_ms / 60_000) % 60;
    let h = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Parse a WebVTT document into a cue track.
pub fn parse(input: &str) -> Result<CueTrack, VttError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.lines().enumerate().peekable();

    match lines.next() {
        Some((_, first)) if first.trim_end().starts_with("WEBVTT") => {}
        _ => return Err(VttError::MissingHeader),
    }

    let mut track = CueTrack::default();
    while let Some((line_no, line)) = lines.next() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        // Skip non-cue blocks entirely.
        if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
            for (_, l) in lines.by_ref() {
                if l.trim().is_empty() {
                    break;
                }
            }
            continue;
        }

        // Either a timing line, or a cue identifier followed by one.
        let (timing_no, timing) = if line.contains("-->") {
            (line_no, line.to_string())
        } else {
            match lines.next() {
                Some((n, l)) if l.contains("-->") => (n, l.trim_end().to_string()),
                _ => return Err(VttError::BadTimingLine { line: line_no + 1 }),
            }
        };

        let (start_text, rest) = timing
            .split_once("-->")
            .ok_or(VttError::BadTimingLine { line: timing_no + 1 })?;
        // Cue settings (e.g. "line:0 align:start") trail the end timestamp.
        let end_text = rest.trim().split_whitespace().next().unwrap_or("");
        let start = parse_timestamp(start_text, timing_no + 1)?;
        let end = parse_timestamp(end_text, timing_no + 1)?;
        if start >= end {
            return Err(VttError::InvalidInterval {
                line: timing_no + 1,
                start,
                end,
            });
        }

        let mut text_lines: Vec<&str> = Vec::new();
        while let Some((_, l)) = lines.peek() {
            if l.trim().is_empty() {
                break;
            }
            text_lines.push(l.trim_end());
            lines.next();
        }

        track.push(Cue {
            start,
            end,
            text: text_lines.join("\n"),
        });
    }

    Ok(track)
}

/// Serialize a cue track as a WebVTT document.
pub fn format(track: &CueTrack) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for cue in track.iter() {
        out.push_str(&format_timestamp(cue.start));
        out.push_str(" --> ");
        out.push_str(&format_timestamp(cue.end));
        out.push('\n');
        out.push_str(&cue.text);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nfirst cue\n\n2\n00:00:05.500 --> 00:01:00.250 align:start\nsecond cue\nsecond line\n";

    #[test]
    fn test_parse_basic_document() {
        let track = parse(SAMPLE).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.get(0).unwrap().start, 1.0);
        assert_eq!(track.get(0).unwrap().end, 4.0);
        assert_eq!(track.get(0).unwrap().text, "first cue");
        assert_eq!(track.get(1).unwrap().start, 5.5);
        assert_eq!(track.get(1).unwrap().end, 60.25);
        assert_eq!(track.get(1).unwrap().text, "second cue\nsecond line");
    }

    #[test]
    fn test_parse_requires_header() {
        assert!(matches!(
            parse("00:00:01.000 --> 00:00:02.000\nhi\n"),
            Err(VttError::MissingHeader)
        ));
    }

    #[test]
    fn test_parse_accepts_bom_and_header_suffix() {
        let doc = "\u{feff}WEBVTT - notes\n\n00:01.000 --> 00:02.000\nhi\n";
        let track = parse(doc).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track.get(0).unwrap().start, 1.0);
    }

    #[test]
    fn test_parse_skips_note_blocks() {
        let doc = "WEBVTT\n\nNOTE this is a comment\nmore comment\n\n00:00:01.000 --> 00:00:02.000\nhi\n";
        let track = parse(doc).unwrap();
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_parse_rejects_inverted_interval() {
        let doc = "WEBVTT\n\n00:00:05.000 --> 00:00:02.000\nhi\n";
        assert!(matches!(
            parse(doc),
            Err(VttError::InvalidInterval { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage_timestamp() {
        let doc = "WEBVTT\n\nabc --> 00:00:02.000\nhi\n";
        assert!(matches!(parse(doc), Err(VttError::BadTimestamp { .. })));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        assert_eq!(parse_timestamp("01:02:03.456", 1).unwrap(), 3723.456);
        assert_eq!(format_timestamp(3723.456), "01:02:03.456");
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(parse_timestamp("05:00.500", 1).unwrap(), 300.5);
    }

    #[test]
    fn test_format_then_parse_preserves_cues() {
        let track = parse(SAMPLE).unwrap();
        let reparsed = parse(&format(&track)).unwrap();
        assert_eq!(track, reparsed);
    }
}
