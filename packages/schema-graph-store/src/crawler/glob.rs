//! Minimal glob matching for crawl file-set resolution.
//!
//! Supports the two constructs the Crawler's default patterns need: `**`
//! (matches zero or more path segments) and `*` within a segment (matches
//! any run of characters except the path separator). No crate in this
//! workspace's dependency tree provides glob matching, and the predicate
//! below is small enough that pulling one in would be the outlier, not the
//! idiomatic choice.

use std::path::Path;

pub fn matches(pattern: &str, relative_path: &Path) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<String> = relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    match_segments(&pattern_segments, &path_segments)
}

fn match_segments(pattern: &[&str], path: &[String]) -> bool {
    match pattern.first() {
        None => path.is_empty(),
        Some(&"**") => {
            // ** matches zero or more path segments.
            if match_segments(&pattern[1..], path) {
                return true;
            }
            if !path.is_empty() && match_segments(pattern, &path[1..]) {
                return true;
            }
            false
        }
        Some(seg) => {
            if path.is_empty() {
                return false;
            }
            match_segment(seg, &path[0]) && match_segments(&pattern[1..], &path[1..])
        }
    }
}

fn match_segment(pattern: &str, text: &str) -> bool {
    // Simple '*' wildcard matcher within one path segment.
    let pattern_bytes = pattern.as_bytes();
    let text_bytes = text.as_bytes();
    match_bytes(pattern_bytes, text_bytes)
}

fn match_bytes(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(b'*') => {
            for i in 0..=text.len() {
                if match_bytes(&pattern[1..], &text[i..]) {
                    return true;
                }
            }
            false
        }
        Some(&c) => {
            if text.first() == Some(&c) {
                match_bytes(&pattern[1..], &text[1..])
            } else {
                false
            }
        }
    }
}
