use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::system::System;
use crate::version::Version;

/// A manually installed application bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
    pub version: Version,
}

/// Top-level `*.app` directories in `dir`, sorted by name.
pub fn scan(dir: &Path, sys: &dyn System) -> Result<Vec<Candidate>> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    let mut out = Vec::new();
    for entry in skip_unreadable(entries, dir) {
        let path = entry.path();
        if !is_app_bundle(&path) { continue; }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string()) else { continue };
        let version = sys.bundle_version(&path);
        log::debug!("found {} ({})", path.display(), version);
        out.push(Candidate { name, path, version });
    }
    out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(out)
}

fn skip_unreadable<'a, T>(entries: impl Iterator<Item = io::Result<T>> + 'a, dir: &'a Path) -> impl Iterator<Item = T> + 'a {
    entries.filter_map(move |entry| match entry {
        Ok(e) => Some(e),
        Err(e) => {
            log::debug!("skipping unreadable entry in {}: {e}", dir.display());
            None
        }
    })
}

fn is_app_bundle(path: &Path) -> bool {
    path.is_dir() && path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("app")).unwrap_or(false)
}

/// Drops candidates whose resolved token is already cask-managed, or whose
/// name is on the ignore list.
pub fn filter_managed<F>(candidates: Vec<Candidate>, installed: &HashSet<String>, ignore: &[String], mut resolve: F) -> Vec<Candidate>
where
    F: FnMut(&str) -> String,
{
    candidates
        .into_iter()
        .filter(|c| {
            if ignore.iter().any(|i| i.eq_ignore_ascii_case(&c.name)) {
                log::info!("ignoring {} (configured)", c.name);
                return false;
            }
            let token = resolve(&c.name);
            if installed.contains(&token) {
                log::info!("skipping {}: already managed as cask '{token}'", c.name);
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::canonicalize;
    use proptest::prelude::*;
    use std::time::Duration;

    struct FixedVersion;

    impl System for FixedVersion {
        fn bundle_version(&self, bundle: &Path) -> Version {
            if bundle.ends_with("Broken.app") { Version::Unknown } else { Version::parse("1.0") }
        }
        fn request_quit(&self, _app_name: &str) {}
        fn is_running(&self, _bundle: &Path) -> bool { false }
        fn remove_privileged(&self, _bundle: &Path) -> Result<(), String> { Ok(()) }
        fn sleep(&self, _dur: Duration) {}
    }

    fn candidate(name: &str) -> Candidate {
        Candidate { name: name.into(), path: PathBuf::from(format!("/Applications/{name}.app")), version: Version::Unknown }
    }

    #[test]
    fn scan_lists_top_level_bundles_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Zed.app/Contents")).unwrap();
        fs::create_dir_all(dir.path().join("alpha.app")).unwrap();
        fs::create_dir_all(dir.path().join("Broken.app")).unwrap();
        fs::create_dir_all(dir.path().join("Utilities/Nested.app")).unwrap();
        fs::write(dir.path().join("NotADir.app"), b"").unwrap();

        let found = scan(dir.path(), &FixedVersion).unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Broken", "Zed"]);
        assert!(found[1].version.is_unknown());
        assert_eq!(found[0].version, Version::parse("1.0"));
    }

    #[test]
    fn unreadable_entries_are_skipped_not_fatal() {
        let entries = vec![Ok(1), Err(io::Error::from(io::ErrorKind::PermissionDenied)), Ok(3)];
        let kept: Vec<i32> = skip_unreadable(entries.into_iter(), Path::new("/Applications")).collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn scan_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(&dir.path().join("nope"), &FixedVersion).is_err());
    }

    #[test]
    fn managed_candidates_are_filtered() {
        let installed: HashSet<String> = ["firefox".to_string()].into_iter().collect();
        let kept = filter_managed(vec![candidate("Firefox"), candidate("Slack")], &installed, &[], canonicalize);
        assert_eq!(kept, vec![candidate("Slack")]);
    }

    #[test]
    fn ignore_list_is_case_insensitive() {
        let kept = filter_managed(vec![candidate("Xcode"), candidate("Slack")], &HashSet::new(), &["xcode".into()], canonicalize);
        assert_eq!(kept, vec![candidate("Slack")]);
    }

    proptest! {
        #[test]
        fn prop_installed_tokens_never_survive(
            names in prop::collection::vec("[A-Za-z]{1,6}( [A-Za-z]{1,6})?", 0..12),
            mask in prop::collection::vec(any::<bool>(), 12),
        ) {
            let installed: HashSet<String> = names.iter().zip(&mask).filter(|(_, m)| **m).map(|(n, _)| canonicalize(n)).collect();
            let kept = filter_managed(names.iter().map(|n| candidate(n)).collect(), &installed, &[], canonicalize);
            for c in &kept {
                prop_assert!(!installed.contains(&canonicalize(&c.name)));
            }
        }
    }
}
