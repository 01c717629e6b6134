// Version information for the LPR Node

/// Full version string with feature description
pub const VERSION: &str = "v0.3.0-plate-pipeline-2026-08-07";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.3.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-07";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "plate-detection",
    "plate-ocr",
    "multipart-upload",
    "base64-upload",
    "jwt-auth",
    "sqlite-persistence",
    "confidence-threshold",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("LPR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(VERSION.contains(VERSION_NUMBER));
        assert!(FEATURES.contains(&"plate-detection"));
        assert!(FEATURES.contains(&"plate-ocr"));
    }

    #[test]
    fn test_version_string() {
        let version = get_version_string();
        assert!(version.contains("0.3.0"));
        assert!(version.contains(BUILD_DATE));
    }
}
