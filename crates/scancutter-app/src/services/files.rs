// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan folder handling: finding scans, status prefixes and output names.
//
// A scan's progress is recorded in its file name only: `cropping-` while its
// photos are being written, `done-` once every photo was saved.

use std::io;
use std::path::{Path, PathBuf};

use scancutter_core::error::Result;
use scancutter_core::{ACCEPTED_EXTENSIONS, PREFIX_CROPPING, PREFIX_DONE};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Every scan below `root` still to be processed, sorted by path.
///
/// `root` may also be a single file. Finished scans and extracted photos
/// (names starting with `done-` or `photo_prefix`) are skipped.
pub fn scan_images(root: &Path, photo_prefix: &str) -> Vec<PathBuf> {
    let images: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_candidate(path, photo_prefix))
        .collect();
    info!(root = %root.display(), count = images.len(), "Scans found");
    images
}

/// Whether `path` is a scan waiting to be processed.
pub fn is_candidate(path: &Path, photo_prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let accepted = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)));
    accepted && !has_prefix(name, PREFIX_DONE) && !has_prefix(name, photo_prefix)
}

/// Case-insensitive prefix test; `DONE-scan.png` is as finished as
/// `done-scan.png`.
fn has_prefix(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no usable file name", path.display()),
        )
        .into()
    })
}

/// `path` with `prefix` added to its file name.
pub fn with_prefix(path: &Path, prefix: &str) -> Result<PathBuf> {
    let name = file_name(path)?;
    Ok(path.with_file_name(format!("{prefix}{name}")))
}

/// Undo the `cropping-` marker left by an interrupted run, returning the
/// path to analyse. Paths without the marker come back unchanged.
pub fn strip_cropping_prefix(path: &Path) -> Result<PathBuf> {
    let name = file_name(path)?;
    if !has_prefix(name, PREFIX_CROPPING) {
        return Ok(path.to_path_buf());
    }
    let original = &name[PREFIX_CROPPING.len()..];
    let target = path.with_file_name(original);
    if target.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("cannot restore {}: {} exists", path.display(), target.display()),
        )
        .into());
    }
    std::fs::rename(path, &target)?;
    info!(from = %path.display(), to = %target.display(), "Interrupted run marker removed");
    Ok(target)
}

/// The first `count` names `<prefix>NN.<extension>` in `dir` that are not
/// taken, counting from 01.
pub fn unused_names(dir: &Path, prefix: &str, extension: &str, count: usize) -> Vec<PathBuf> {
    let mut names = Vec::with_capacity(count);
    let mut counter = 1usize;
    while names.len() < count {
        let candidate = dir.join(format!("{prefix}{counter:02}.{extension}"));
        if candidate.exists() {
            debug!(path = %candidate.display(), "Output name taken");
        } else {
            names.push(candidate);
        }
        counter += 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use scancutter_core::PREFIX_QUAD;

    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, b"x").expect("write");
    }

    #[test]
    fn walk_finds_pending_scans_recursively() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for name in [
            "a.png",
            "b.JPG",
            "nested/c.bmp",
            "nested/deeper/d.jpeg",
            "cropping-e.png",
            "done-f.png",
            "quadri-01.png",
            "notes.txt",
            "g.gif",
        ] {
            touch(&root.join(name));
        }

        let found: Vec<String> = scan_images(root, PREFIX_QUAD)
            .iter()
            .map(|p| p.strip_prefix(root).expect("relative").to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            found,
            vec!["a.png", "b.JPG", "cropping-e.png", "nested/c.bmp", "nested/deeper/d.jpeg"]
        );
    }

    #[test]
    fn single_file_root_is_walked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scan = dir.path().join("scan.png");
        touch(&scan);
        assert_eq!(scan_images(&scan, PREFIX_QUAD), vec![scan]);
    }

    #[test]
    fn status_prefixes_match_in_any_case() {
        assert!(!is_candidate(Path::new("/s/DONE-scan.png"), PREFIX_QUAD));
        assert!(!is_candidate(Path::new("/s/Done-scan.jpg"), PREFIX_QUAD));
        assert!(!is_candidate(Path::new("/s/Quadri-02.png"), PREFIX_QUAD));
        assert!(is_candidate(Path::new("/s/CROPPING-scan.png"), PREFIX_QUAD));
        // Prefix lengths that split a multi-byte character are no match.
        assert!(is_candidate(Path::new("/s/dé.png"), PREFIX_QUAD));
        assert!(is_candidate(Path::new("/s/quadé.png"), PREFIX_QUAD));
    }

    #[test]
    fn upper_case_cropping_marker_is_stripped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marked = dir.path().join("CROPPING-scan.png");
        touch(&marked);
        let restored = strip_cropping_prefix(&marked).expect("strip");
        assert_eq!(restored, dir.path().join("scan.png"));
        assert!(restored.exists());
    }

    #[test]
    fn custom_photo_prefix_is_skipped() {
        assert!(!is_candidate(Path::new("/s/photo-03.png"), "photo-"));
        assert!(is_candidate(Path::new("/s/quadri-03.png"), "photo-"));
    }

    #[test]
    fn prefixes_apply_to_the_file_name() {
        let path = Path::new("/scans/2024/roll.png");
        assert_eq!(
            with_prefix(path, PREFIX_DONE).expect("prefix"),
            PathBuf::from("/scans/2024/done-roll.png")
        );
    }

    #[test]
    fn cropping_marker_is_stripped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marked = dir.path().join("cropping-scan.png");
        touch(&marked);

        let restored = strip_cropping_prefix(&marked).expect("strip");
        assert_eq!(restored, dir.path().join("scan.png"));
        assert!(restored.exists());
        assert!(!marked.exists());

        // Already clean: unchanged and untouched.
        assert_eq!(strip_cropping_prefix(&restored).expect("noop"), restored);
    }

    #[test]
    fn cropping_marker_is_kept_when_the_name_is_taken() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marked = dir.path().join("cropping-scan.png");
        touch(&marked);
        touch(&dir.path().join("scan.png"));
        assert!(strip_cropping_prefix(&marked).is_err());
        assert!(marked.exists());
    }

    #[test]
    fn unused_names_skip_existing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(&dir.path().join("quadri-01.png"));
        touch(&dir.path().join("quadri-03.png"));

        let names = unused_names(dir.path(), PREFIX_QUAD, "png", 3);
        assert_eq!(
            names,
            vec![
                dir.path().join("quadri-02.png"),
                dir.path().join("quadri-04.png"),
                dir.path().join("quadri-05.png"),
            ]
        );
        assert!(unused_names(dir.path(), PREFIX_QUAD, "png", 0).is_empty());
    }

    #[test]
    fn counter_widens_past_ninety_nine() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 1..=99 {
            touch(&dir.path().join(format!("quadri-{i:02}.jpg")));
        }
        assert_eq!(
            unused_names(dir.path(), PREFIX_QUAD, "jpg", 1),
            vec![dir.path().join("quadri-100.jpg")]
        );
    }
}
