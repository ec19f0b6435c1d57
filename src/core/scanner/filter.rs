//! File filtering logic for the scanner.

use super::ImageFormat;
use std::path::Path;

/// Decides which files the scanner enumerates.
///
/// Unlike the format check in the sanitizer, this filter never looks at
/// extensions: unsupported files must still appear in the report, as
/// skipped. It only applies the hidden-file policy.
pub struct FileFilter {
    /// Whether to include hidden files
    include_hidden: bool,
}

impl FileFilter {
    /// Create a new filter with the default policy (hidden files excluded)
    pub fn new() -> Self {
        Self {
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be enumerated
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }
        true
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new()
    }
}
