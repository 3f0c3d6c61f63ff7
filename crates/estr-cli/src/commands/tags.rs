//! Tags command - writes a ctags-style tag file

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use estr_core::parser::ParsedFile;
use estr_core::tags::{Tag, extract_tags, tag_file};
use rayon::prelude::*;
use walkdir::WalkDir;

use super::{configure_colors, load_config};

const SUPPORTED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Files or directories to index
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Also tag function-valued member assignments and object properties
    #[arg(long)]
    pub classic: bool,

    /// Tag file to write [default: tags]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl TagsArgs {
    pub fn run(&self) -> Result<bool> {
        configure_colors();
        let config = load_config(self.paths.first().map_or(Path::new("."), PathBuf::as_path));
        let classic = self.classic || config.tags.classic;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.tags.output));

        let mut files = Vec::new();
        for path in &self.paths {
            files.extend(discover_files(path, &config.tags.exclude)?);
        }

        let results: Vec<(PathBuf, Result<Vec<Tag>, String>)> = files
            .par_iter()
            .map(|file| (file.clone(), tags_for_file(file, classic)))
            .collect();

        let mut tags = Vec::new();
        for (file, result) in results {
            match result {
                Ok(file_tags) => tags.extend(file_tags),
                Err(message) => {
                    tracing::warn!(file = %file.display(), "{message}");
                    eprintln!(
                        "{} skipping {}: {}",
                        "warning:".yellow().bold(),
                        file.display(),
                        message
                    );
                }
            }
        }

        let count = tags.len();
        fs::write(&output, tag_file(tags))
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!(
            "Wrote {} tags from {} files to {}",
            count.to_string().bold(),
            files.len(),
            output.display()
        );

        Ok(true)
    }
}

fn tags_for_file(file: &Path, classic: bool) -> Result<Vec<Tag>, String> {
    let content = fs::read_to_string(file).map_err(|e| e.to_string())?;
    let parsed = ParsedFile::from_source(&file.to_string_lossy(), &content);
    extract_tags(&parsed, classic).map_err(|e| e.to_string())
}

fn discover_files(path: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let files: Vec<PathBuf> = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e, exclude))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_supported_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    Ok(files)
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn is_skipped(entry: &walkdir::DirEntry, exclude: &[String]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| {
            name.starts_with('.')
                || name == "node_modules"
                || (entry.file_type().is_dir() && exclude.iter().any(|e| e == name))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn discover_files_recurses_and_filters() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        File::create(dir.path().join("root.js")).unwrap();
        File::create(src.join("nested.mjs")).unwrap();
        File::create(src.join("notes.md")).unwrap();

        let files = discover_files(dir.path(), &[]).unwrap();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn discover_files_skips_hidden_node_modules_and_excluded() {
        let dir = tempdir().unwrap();
        for sub in [".git", "node_modules", "vendor", "lib"] {
            let path = dir.path().join(sub);
            fs::create_dir(&path).unwrap();
            File::create(path.join("file.js")).unwrap();
        }

        let files = discover_files(dir.path(), &["vendor".to_string()]).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().contains("lib"));
    }

    #[test]
    fn discover_files_accepts_explicit_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("script.txt");
        File::create(&file).unwrap();

        assert_eq!(discover_files(&file, &[]).unwrap(), vec![file]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempdir().unwrap();

        assert!(discover_files(&dir.path().join("absent"), &[]).is_err());
    }

    #[test]
    fn run_writes_sorted_tag_file_and_skips_broken_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "function zeta() {}\nvar alpha;").unwrap();
        fs::write(dir.path().join("broken.js"), "var = ;").unwrap();
        let output = dir.path().join("tags");

        let args = TagsArgs {
            paths: vec![dir.path().to_path_buf()],
            classic: false,
            output: Some(output.clone()),
        };

        assert!(args.run().unwrap());
        let content = fs::read_to_string(&output).unwrap();
        let names: Vec<&str> = content
            .lines()
            .filter(|line| !line.starts_with("!_TAG_"))
            .filter_map(|line| line.split('\t').next())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn classic_mode_from_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("estr.toml"), "[tags]\nclassic = true\n").unwrap();
        fs::write(dir.path().join("a.js"), "obj.run = function() {};").unwrap();
        let output = dir.path().join("out.tags");

        let args = TagsArgs {
            paths: vec![dir.path().to_path_buf()],
            classic: false,
            output: Some(output.clone()),
        };

        assert!(args.run().unwrap());
        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("run\t"));
        assert!(content.contains("\tfa\t"));
    }
}
