//! File discovery for directory scans.
//!
//! This module walks a scan target and turns matching source files
//! into code units, respecting configuration for extensions,
//! excludes, and file size limits.

use crate::models::CodeUnit;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (e.g., ["rs", "py", "js"])
    pub extensions: Vec<String>,
    /// Patterns to exclude (e.g., ["node_modules", "target", ".git"])
    pub excludes: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: usize,
    /// Maximum number of files to scan
    pub max_files: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "c", "cpp", "h", "hpp",
                "cs", "rb", "php", "swift", "kt", "scala", "vue", "svelte",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excludes: vec![
                ".git",
                "target",
                "node_modules",
                "vendor",
                "dist",
                "build",
                "__pycache__",
                ".venv",
                "venv",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_file_size: 100 * 1024, // 100KB
            max_files: None,
        }
    }
}

impl From<&crate::config::ScanSettings> for ScanConfig {
    fn from(settings: &crate::config::ScanSettings) -> Self {
        Self {
            extensions: settings.extensions.clone(),
            excludes: settings.excludes.clone(),
            max_file_size: settings.max_file_size,
            max_files: Some(settings.max_files),
        }
    }
}

/// Returns the language for a source path, detected from its extension.
///
/// Unknown extensions pass through as the language name; files without
/// an extension are treated as plain text.
pub fn language_for(path: &Path) -> String {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return "text".to_string(),
    };

    match ext.as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "vue" => "vue",
        "svelte" => "svelte",
        other => other,
    }
    .to_string()
}

/// Reads a single file into a code unit.
pub fn read_unit(path: &Path) -> Result<CodeUnit> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut unit = CodeUnit::new(code, language_for(path));
    unit.filepath = Some(path.display().to_string());
    Ok(unit)
}

/// File scanner for discovering source files under a directory.
pub struct FileScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    /// Collect all matching source files as code units.
    ///
    /// Unreadable entries are skipped with a log line rather than
    /// failing the whole scan.
    pub fn collect_units(&self) -> Result<Vec<CodeUnit>> {
        let mut units = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !self.is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(max) = self.config.max_files {
                if units.len() >= max {
                    warn!("Reached the {} file limit, stopping the walk", max);
                    break;
                }
            }
            if !self.matches(&entry) {
                continue;
            }

            let path = entry.path();
            match fs::read_to_string(path) {
                Ok(code) => {
                    let rel_path = path.strip_prefix(&self.root).unwrap_or(path);
                    let mut unit = CodeUnit::new(code, language_for(path));
                    unit.filepath = Some(rel_path.to_string_lossy().to_string());
                    units.push(unit);
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        Ok(units)
    }

    /// Check if a walked file matches the scan criteria.
    fn matches(&self, entry: &walkdir::DirEntry) -> bool {
        let path = entry.path();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !self.config.extensions.iter().any(|e| e == ext) {
            return false;
        }

        match entry.metadata() {
            Ok(metadata) => metadata.len() <= self.config.max_file_size as u64,
            Err(_) => false,
        }
    }

    /// Check if a name matches exclusion patterns.
    fn is_excluded(&self, name: &str) -> bool {
        // Hidden files
        if name.starts_with('.') {
            return true;
        }

        // Explicit excludes
        self.config.excludes.iter().any(|pattern| name == pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(dir: &Path) {
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::create_dir_all(dir.join("node_modules/pkg")).unwrap();
        fs::write(dir.join("src/app.py"), "print('hello')\n").unwrap();
        fs::write(dir.join("src/lib.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.join("node_modules/pkg/index.js"), "module.exports = 1\n").unwrap();
        fs::write(dir.join("README.md"), "# readme\n").unwrap();
        fs::write(dir.join(".secret.py"), "token = 1\n").unwrap();
    }

    #[test]
    fn test_collects_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let scanner = FileScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        let units = scanner.collect_units().unwrap();

        assert_eq!(units.len(), 2);
        let paths: Vec<_> = units.iter().map(|u| u.filepath.clone().unwrap()).collect();
        assert!(paths.iter().any(|p| p.ends_with("app.py")));
        assert!(paths.iter().any(|p| p.ends_with("lib.rs")));
        // node_modules, hidden files, and non-source extensions are out.
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
        assert!(!paths.iter().any(|p| p.contains("secret")));
    }

    #[test]
    fn test_detects_languages() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let scanner = FileScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        let units = scanner.collect_units().unwrap();

        let languages: Vec<_> = units.iter().map(|u| u.language.as_str()).collect();
        assert!(languages.contains(&"python"));
        assert!(languages.contains(&"rust"));
    }

    #[test]
    fn test_size_limit_filters_large_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x = 1\n".repeat(100)).unwrap();
        fs::write(dir.path().join("small.py"), "x = 1\n").unwrap();

        let config = ScanConfig {
            max_file_size: 64,
            ..ScanConfig::default()
        };
        let scanner = FileScanner::new(dir.path().to_path_buf(), config);
        let units = scanner.collect_units().unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].filepath.as_deref(), Some("small.py"));
    }

    #[test]
    fn test_max_files_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("f{}.py", i)), "x = 1\n").unwrap();
        }

        let config = ScanConfig {
            max_files: Some(3),
            ..ScanConfig::default()
        };
        let scanner = FileScanner::new(dir.path().to_path_buf(), config);
        let units = scanner.collect_units().unwrap();

        assert_eq!(units.len(), 3);
    }

    #[test]
    fn test_read_unit_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handler.py");
        fs::write(&path, "def handler(event):\n    return event\n").unwrap();

        let unit = read_unit(&path).unwrap();
        assert_eq!(unit.language, "python");
        assert!(unit.code.contains("def handler"));
        assert_eq!(unit.filepath.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_read_unit_missing_file() {
        assert!(read_unit(Path::new("does/not/exist.py")).is_err());
    }

    #[test]
    fn test_language_for_paths() {
        assert_eq!(language_for(Path::new("a/b.rs")), "rust");
        assert_eq!(language_for(Path::new("component.tsx")), "typescript");
        assert_eq!(language_for(Path::new("Makefile")), "text");
        assert_eq!(language_for(Path::new("query.sql")), "sql");
    }
}
