//! Byte-size classification of WEB_STATIC content.

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

/// Above this many bytes content is flagged as large but still savable (100 KB)
pub const SIZE_SOFT_LIMIT: usize = 100 * 1024;

/// Above this many bytes content is rejected (500 KB)
pub const SIZE_HARD_LIMIT: usize = 500 * 1024;

/// Severity of the size check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SizeLevel {
    Ok,
    Warning,
    Error,
}

/// Result of classifying one content blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    /// UTF-8 encoded length
    pub bytes: usize,
    /// False only when the hard limit is exceeded
    pub valid: bool,
    pub level: SizeLevel,
    pub message: String,
}

fn kilobytes(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}

/// Classify by UTF-8 byte length, not character count.
pub fn classify_size(content: &str) -> SizeReport {
    classify_bytes(content.len())
}

pub fn classify_bytes(bytes: usize) -> SizeReport {
    let kb = kilobytes(bytes);

    let (valid, level, message) = if bytes > SIZE_HARD_LIMIT {
        (
            false,
            SizeLevel::Error,
            format!(
                "Content too large: {kb:.1} KB (maximum: {} KB)",
                SIZE_HARD_LIMIT / 1024
            ),
        )
    } else if bytes > SIZE_SOFT_LIMIT {
        (
            true,
            SizeLevel::Warning,
            format!("Large content: {kb:.1} KB. Optimization recommended."),
        )
    } else {
        (true, SizeLevel::Ok, format!("Size: {kb:.1} KB"))
    };

    SizeReport {
        bytes,
        valid,
        level,
        message,
    }
}
