//! Download-completion banner detection.

use std::sync::OnceLock;

use regex::Regex;

/// Get the completion banner pattern.
///
/// Matches the installer's success line, with or without the parenthesized
/// six-digit revision, e.g.:
///
/// - `Chromium downloaded to /home/ci/.local-chromium/linux-123456`
/// - `Chromium (123456) downloaded to /home/ci/.local-chromium/linux-123456`
fn completion_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // ^ anchors at the start of the chunk, not of each line.
        Regex::new(r"^Chromium( \([0-9]{6}\))* downloaded to").unwrap()
    })
}

/// Test one stdout chunk for the completion banner.
///
/// Matching is per-chunk: a banner split across two chunks is not detected.
/// This mirrors the installer protocol, which emits the banner as a single
/// write; when the split does happen, the exit status still settles the
/// outcome correctly.
pub fn is_completion_chunk(chunk: &str) -> bool {
    completion_pattern().is_match(chunk)
}

/// One-shot settlement latch for the completion banner.
///
/// The first matching chunk wins; every later chunk, matching or not, is
/// ignored. Single writer, so a plain bool suffices.
#[derive(Debug, Default)]
pub(crate) struct MarkerLatch {
    latched: bool,
}

impl MarkerLatch {
    /// Test a chunk against the banner pattern.
    ///
    /// Returns `true` only for the first matching chunk.
    pub fn observe(&mut self, chunk: &str) -> bool {
        if self.latched || !is_completion_chunk(chunk) {
            return false;
        }
        self.latched = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_banner_detected() {
        assert!(is_completion_chunk("Chromium downloaded to /x\n"));
    }

    #[test]
    fn test_banner_with_revision_detected() {
        assert!(is_completion_chunk(
            "Chromium (123456) downloaded to /path\n"
        ));
    }

    #[test]
    fn test_banner_split_across_chunks_not_detected() {
        assert!(!is_completion_chunk("Chrom"));
        assert!(!is_completion_chunk("ium downloaded to /x\n"));
    }

    #[test]
    fn test_banner_not_at_chunk_start_not_detected() {
        assert!(!is_completion_chunk(
            "progress 100%\nChromium downloaded to /x\n"
        ));
    }

    #[test]
    fn test_short_revision_not_detected() {
        assert!(!is_completion_chunk("Chromium (123) downloaded to /x\n"));
    }

    #[test]
    fn test_unrelated_output_not_detected() {
        assert!(!is_completion_chunk("Downloading Chromium r123456...\n"));
    }

    #[test]
    fn test_latch_fires_once_for_duplicate_chunks() {
        let chunk = "Chromium (123456) downloaded to /path\n";
        let mut latch = MarkerLatch::default();

        assert!(latch.observe(chunk));
        assert!(!latch.observe(chunk));
    }

    #[test]
    fn test_latch_ignores_non_matching_chunks() {
        let mut latch = MarkerLatch::default();

        assert!(!latch.observe("progress 50%\n"));
        assert!(latch.observe("Chromium downloaded to /x\n"));
    }
}
