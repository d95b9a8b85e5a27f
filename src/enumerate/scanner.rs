//! Existing-entry scan used to resume a length

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use super::engine::StopSignal;
use crate::error::{ComboForgeError, Result};

/// Collect the distinct lines of `path` that are exactly `length` characters long.
///
/// The file is streamed line by line. A missing file yields an empty set, and
/// invalid UTF-8 inside a line is dropped rather than rejecting the line.
/// Returns `None` when `stop` is triggered before the scan reaches the end.
pub fn scan_existing(path: &Path, length: usize, stop: &StopSignal) -> Result<Option<HashSet<String>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(HashSet::new())),
        Err(e) => return Err(ComboForgeError::io_at(e, path)),
    };

    let mut reader = BufReader::new(file);
    let mut existing = HashSet::new();
    let mut buf = Vec::new();
    let mut lines = 0u64;

    loop {
        if stop.is_triggered() {
            tracing::debug!(path = %path.display(), length, lines, "Scan interrupted");
            return Ok(None);
        }

        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ComboForgeError::io_at(e, path))?;
        if read == 0 {
            break;
        }
        lines += 1;

        let line = decode_ignoring_invalid(trim_line_ending(&buf));
        if line.chars().count() == length {
            existing.insert(line);
        }
    }

    tracing::debug!(
        path = %path.display(),
        length,
        lines,
        matched = existing.len(),
        "Scanned existing entries"
    );

    Ok(Some(existing))
}

fn trim_line_ending(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = bytes {
        bytes = rest;
    }
    bytes
}

/// Keep every valid UTF-8 run and skip the malformed bytes between them
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scan(path: &Path, length: usize) -> HashSet<String> {
        scan_existing(path, length, &StopSignal::new()).unwrap().unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = scan(&dir.path().join("nope.txt"), 2);
        assert!(found.is_empty());
    }

    #[test]
    fn test_filters_by_length_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.txt");
        fs::write(&path, "a\nab\nba\nab\nabc\n\n").unwrap();

        let found = scan(&path, 2);
        assert_eq!(found.len(), 2);
        assert!(found.contains("ab"));
        assert!(found.contains("ba"));

        let singles = scan(&path, 1);
        assert_eq!(singles.len(), 1);
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.txt");
        fs::write(&path, "xy\r\nzw").unwrap();

        let found = scan(&path, 2);
        assert!(found.contains("xy"));
        assert!(found.contains("zw"));
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.txt");
        fs::write(&path, b"a\xffb\n\xfe\xfe\nok\n").unwrap();

        let found = scan(&path, 2);
        assert!(found.contains("ab"));
        assert!(found.contains("ok"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.txt");
        fs::write(&path, "éü\n").unwrap();

        assert!(scan(&path, 2).contains("éü"));
        assert!(scan(&path, 4).is_empty());
    }

    #[test]
    fn test_triggered_stop_abandons_scan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.txt");
        fs::write(&path, "ab\nba\n").unwrap();

        let stop = StopSignal::new();
        stop.trigger();
        assert!(scan_existing(&path, 2, &stop).unwrap().is_none());
    }
}
