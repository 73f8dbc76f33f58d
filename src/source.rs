use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;
use ignore::{Walk, WalkBuilder};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub files_only: bool,
    pub absolute: bool,
    pub limit: usize,
    pub prune: GlobSet,
}

/// Builds the candidate list from positional values and piped lines, falling
/// back to walking `root` when both are empty.
pub fn collect<R: BufRead>(
    values: Vec<String>,
    piped: Option<R>,
    root: &Path,
    options: &SourceOptions,
) -> Result<Vec<String>> {
    let mut raw = values;
    if let Some(reader) = piped {
        for line in reader.lines() {
            let line = line.context("failed to read candidates from stdin")?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                raw.push(trimmed.to_string());
            }
        }
    }

    let mut candidates = Vec::new();
    if raw.is_empty() {
        let walk = PrunedWalk::new(root, &options.prune);
        push_paths(&mut candidates, walk, options);
    } else if options.files_only {
        for item in raw {
            if candidates.len() >= options.limit {
                break;
            }
            let path = PathBuf::from(&item);
            if path.is_dir() {
                push_paths(&mut candidates, PrunedWalk::new(&path, &options.prune), options);
            } else if path.is_file() {
                push_paths(&mut candidates, [path], options);
            }
        }
    } else {
        for item in raw.into_iter().take(options.limit) {
            if options.absolute {
                candidates.push(absolutize(Path::new(&item)));
            } else {
                candidates.push(item);
            }
        }
    }

    info!(count = candidates.len(), limit = options.limit, "candidates collected");
    Ok(candidates)
}

fn push_paths(
    candidates: &mut Vec<String>,
    paths: impl IntoIterator<Item = PathBuf>,
    options: &SourceOptions,
) {
    let room = options.limit.saturating_sub(candidates.len());
    for path in paths.into_iter().take(room) {
        let text = if options.absolute {
            absolutize(&path)
        } else {
            path.to_string_lossy().into_owned()
        };
        candidates.push(text);
    }
}

fn absolutize(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Depth-first walk yielding files, skipping entries whose name matches the
/// prune set. Within a directory, files come before subdirectories and each
/// group is in name order. Walking `.` yields paths without the `./` prefix.
pub struct PrunedWalk {
    walk: Walk,
    strip_dot: bool,
}

impl PrunedWalk {
    pub fn new(root: &Path, prune: &GlobSet) -> Self {
        let prune = prune.clone();
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .sort_by_file_path(|a, b| {
                (a.is_dir(), a.file_name()).cmp(&(b.is_dir(), b.file_name()))
            })
            .filter_entry(move |entry| {
                // the root itself is never pruned, `.` would match `.*`
                entry.depth() == 0 || !prune.is_match(entry.file_name())
            });

        Self {
            walk: builder.build(),
            strip_dot: root == Path::new("."),
        }
    }
}

impl Iterator for PrunedWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() == 0 || !entry.path().is_file() {
                continue;
            }
            let path = entry.into_path();
            if self.strip_dot {
                if let Ok(relative) = path.strip_prefix(".") {
                    return Some(relative.to_path_buf());
                }
            }
            return Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::config::CandidatesConfig;

    fn options(files_only: bool, limit: usize) -> SourceOptions {
        SourceOptions {
            files_only,
            absolute: false,
            limit,
            prune: CandidatesConfig::default().prune_set().unwrap(),
        }
    }

    fn make_tree(label: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("fuzzyselect-source-{label}-{nonce}"));
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join("b.txt"), "").unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join(".hidden"), "").unwrap();
        fs::write(root.join("src/main.rs"), "").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "").unwrap();
        fs::write(root.join("__pycache__/mod.pyc"), "").unwrap();
        root
    }

    fn relative(root: &Path, items: &[String]) -> Vec<String> {
        items
            .iter()
            .map(|item| {
                Path::new(item)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn walk_prunes_hidden_and_dunder_entries_in_order() {
        let root = make_tree("walk");
        let prune = CandidatesConfig::default().prune_set().unwrap();
        let files: Vec<String> = PrunedWalk::new(&root, &prune)
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            relative(&root, &files),
            vec!["a.txt", "b.txt", "src/main.rs", "src/nested/deep.rs"]
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn files_come_before_subdirectories_that_sort_earlier() {
        let root = make_tree("files-first");
        fs::create_dir_all(root.join("a_dir")).unwrap();
        fs::write(root.join("a_dir/inner.txt"), "").unwrap();
        let prune = CandidatesConfig::default().prune_set().unwrap();
        let files: Vec<String> = PrunedWalk::new(&root, &prune)
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            relative(&root, &files),
            vec![
                "a.txt",
                "b.txt",
                "a_dir/inner.txt",
                "src/main.rs",
                "src/nested/deep.rs"
            ]
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn walking_current_dir_yields_relative_paths() {
        let items = collect(
            Vec::new(),
            None::<Cursor<&[u8]>>,
            Path::new("."),
            &options(true, 20),
        )
        .unwrap();

        assert!(items.iter().any(|item| item == "Cargo.toml"));
        for item in &items {
            let path = Path::new(item);
            assert!(path.is_relative(), "{item}");
            assert!(!path.starts_with("."), "{item}");
        }
    }

    #[test]
    fn no_input_walks_root() {
        let root = make_tree("cwd");
        let items = collect(Vec::new(), None::<Cursor<&[u8]>>, &root, &options(true, 500)).unwrap();
        assert_eq!(relative(&root, &items).len(), 4);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn piped_lines_are_trimmed_and_blank_lines_dropped() {
        let piped = Cursor::new("  alpha \n\n\tbeta\n   \ngamma".as_bytes());
        let items = collect(
            vec!["first".to_string()],
            Some(piped),
            Path::new("."),
            &options(false, 500),
        )
        .unwrap();
        assert_eq!(items, vec!["first", "alpha", "beta", "gamma"]);
    }

    #[test]
    fn files_only_expands_directories_and_drops_missing_paths() {
        let root = make_tree("files");
        let values = vec![
            root.join("src").to_string_lossy().into_owned(),
            root.join("a.txt").to_string_lossy().into_owned(),
            root.join("missing.txt").to_string_lossy().into_owned(),
        ];
        let items = collect(values, None::<Cursor<&[u8]>>, &root, &options(true, 500)).unwrap();
        assert_eq!(
            relative(&root, &items),
            vec!["src/main.rs", "src/nested/deep.rs", "a.txt"]
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn limit_caps_every_source() {
        let root = make_tree("limit");
        let walked = collect(Vec::new(), None::<Cursor<&[u8]>>, &root, &options(true, 3)).unwrap();
        assert_eq!(walked.len(), 3);

        let piped = Cursor::new("1\n2\n3\n4\n".as_bytes());
        let listed = collect(Vec::new(), Some(piped), &root, &options(false, 2)).unwrap();
        assert_eq!(listed, vec!["1", "2"]);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn absolute_flag_expands_relative_values() {
        let mut opts = options(false, 10);
        opts.absolute = true;
        let items = collect(
            vec!["some/file.rs".to_string()],
            None::<Cursor<&[u8]>>,
            Path::new("."),
            &opts,
        )
        .unwrap();
        assert!(Path::new(&items[0]).is_absolute());
        assert!(items[0].ends_with("some/file.rs"));
    }
}
