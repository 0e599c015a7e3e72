//! Shared helpers for CLI commands.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use uac::config::Options;
use uac::{debug, log};

/// An input page and where its output goes, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFile {
    pub source: PathBuf,
    pub relative: PathBuf,
}

/// Load options from `path`; a missing file means defaults.
pub fn load_options(path: &Path) -> Result<Options> {
    if !path.exists() {
        debug!("config"; "{} not found, using defaults", path.display());
        return Ok(Options::default());
    }
    let options = Options::from_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    log!("config"; "loaded {}", path.display());
    Ok(options)
}

/// Expand files and directories into HTML files, in a stable order.
pub fn collect_html_files(paths: &[PathBuf]) -> Result<Vec<HtmlFile>> {
    // Handle stdin case: read paths from stdin when `-` is passed
    let paths: Vec<PathBuf> = if paths.len() == 1 && paths[0].as_os_str() == "-" {
        read_paths_from_stdin()?
    } else {
        paths.to_vec()
    };

    let mut files = Vec::new();
    for path in &paths {
        if path.is_file() {
            let name = path
                .file_name()
                .map(PathBuf::from)
                .with_context(|| format!("not a file path: {}", path.display()))?;
            files.push(HtmlFile {
                source: path.clone(),
                relative: name,
            });
        } else if path.is_dir() {
            files.extend(collect_dir(path));
        } else {
            bail!("Path not found: {}", path.display());
        }
    }
    Ok(files)
}

fn collect_dir(dir: &Path) -> Vec<HtmlFile> {
    let mut files: Vec<HtmlFile> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| is_html(path))
        .filter_map(|source| {
            let relative = source.strip_prefix(dir).ok()?.to_path_buf();
            Some(HtmlFile { source, relative })
        })
        .collect();
    files.sort_by(|a, b| a.source.cmp(&b.source));
    files
}

pub fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Read file paths from stdin, one per line
pub fn read_paths_from_stdin() -> Result<Vec<PathBuf>> {
    let stdin = io::stdin();
    let mut paths = Vec::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

/// `1 file`, `3 files`
pub fn plural_count(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}
