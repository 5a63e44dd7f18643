//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ```text
//! photo.jpg → compressed-1c9f….webp
//!     2.4 MiB → 180.3 KiB (92.7% smaller)
//!     quality 60, 3 attempts
//! ```

use crate::solver::CompressionResult;
use std::path::Path;

/// Render a byte count with a binary-unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format the report for one finished compression job.
pub fn format_result(
    input: &Path,
    destination: &Path,
    result: &CompressionResult,
    target_size: Option<u64>,
) -> Vec<String> {
    let mut lines = vec![
        format!("{} → {}", file_name(input), file_name(destination)),
        format!(
            "    {} → {} ({:.1}% {})",
            format_bytes(result.original_bytes),
            format_bytes(result.compressed_bytes),
            result.savings_percent().abs(),
            if result.compressed_bytes <= result.original_bytes {
                "smaller"
            } else {
                "larger"
            },
        ),
        format!(
            "    quality {}, {} attempt{}",
            result.final_quality,
            result.attempts_used,
            if result.attempts_used == 1 { "" } else { "s" },
        ),
    ];

    if let Some(target) = target_size
        && !result.target_met
    {
        lines.push(format!(
            "    target {} not met — best attempt kept",
            format_bytes(target)
        ));
    }

    lines
}

pub fn print_result(
    input: &Path,
    destination: &Path,
    result: &CompressionResult,
    target_size: Option<u64>,
) {
    for line in format_result(input, destination, result, target_size) {
        println!("{line}");
    }
}

/// Format the closing summary for a batch run.
pub fn format_batch_summary(
    succeeded: usize,
    failed: usize,
    original_bytes: u64,
    compressed_bytes: u64,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Compressed {succeeded} image{}, {} → {}",
        if succeeded == 1 { "" } else { "s" },
        format_bytes(original_bytes),
        format_bytes(compressed_bytes),
    )];
    if failed > 0 {
        lines.push(format!("{failed} failed"));
    }
    lines
}

pub fn print_batch_summary(
    succeeded: usize,
    failed: usize,
    original_bytes: u64,
    compressed_bytes: u64,
) {
    for line in format_batch_summary(succeeded, failed, original_bytes, compressed_bytes) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use std::path::PathBuf;

    fn result(compressed: u64, attempts: u32, target_met: bool) -> CompressionResult {
        CompressionResult {
            output: PathBuf::from("/work/compressed/compressed-abc.webp"),
            final_quality: Quality::new(60),
            original_bytes: 1_000_000,
            compressed_bytes: compressed,
            attempts_used: attempts,
            target_met,
        }
    }

    #[test]
    fn bytes_pick_sensible_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn result_report_shows_sizes_and_attempts() {
        let lines = format_result(
            Path::new("/in/photo.jpg"),
            Path::new("/out/photo.webp"),
            &result(250_000, 3, true),
            Some(300_000),
        );

        assert_eq!(lines[0], "photo.jpg → photo.webp");
        assert!(lines[1].contains("smaller"));
        assert!(lines[2].contains("quality 60, 3 attempts"));
        // Target met: no warning line
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn result_report_flags_missed_target() {
        let lines = format_result(
            Path::new("photo.jpg"),
            Path::new("photo.webp"),
            &result(900_000, 8, false),
            Some(1000),
        );
        assert!(lines.last().unwrap().contains("not met"));
    }

    #[test]
    fn result_report_singular_attempt() {
        let lines = format_result(
            Path::new("a.png"),
            Path::new("a.webp"),
            &result(500, 1, true),
            None,
        );
        assert!(lines[2].ends_with("1 attempt"));
    }

    #[test]
    fn grown_output_reported_as_larger() {
        let lines = format_result(
            Path::new("a.png"),
            Path::new("a.png"),
            &result(2_000_000, 1, true),
            None,
        );
        assert!(lines[1].contains("larger"));
    }

    #[test]
    fn batch_summary_mentions_failures_only_when_present() {
        let clean = format_batch_summary(3, 0, 3_000_000, 900_000);
        assert_eq!(clean.len(), 1);
        assert!(clean[0].starts_with("Compressed 3 images"));

        let dirty = format_batch_summary(2, 1, 2_000_000, 600_000);
        assert_eq!(dirty.len(), 2);
        assert_eq!(dirty[1], "1 failed");
    }
}
