use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const CONFIG_FILE_NAME: &str = "linkpress.json";

pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] = ["node_modules", "target", ".git", "dist"];

/// Find every `linkpress.json` under `dir`, skipping paths whose part below
/// `dir` contains any ignore pattern. Results are sorted so merge order is stable.
pub fn find_config_files(dir: &Path, ignore_patterns: &[&str]) -> Vec<PathBuf> {
    let mut config_files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let should_ignore = ignore_patterns
            .iter()
            .any(|pattern| relative.to_string_lossy().contains(pattern));
        if should_ignore {
            continue;
        }

        if path
            .file_name()
            .is_some_and(|name| name == CONFIG_FILE_NAME)
        {
            config_files.push(path.to_path_buf());
        }
    }

    config_files.sort();
    config_files
}
