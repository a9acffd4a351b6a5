use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::RemoveError;
use crate::system::System;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Plain,
    /// `locked` is the entry that stopped the ordinary walk, if it got that far.
    Privileged { locked: Option<String> },
}

/// Delete an application bundle, escalating to a privileged removal when
/// the bundle or its parent is not writable or any entry refuses to go.
pub fn remove_bundle(bundle: &Path, sys: &dyn System) -> Result<Removal, RemoveError> {
    if !writable(bundle) || bundle.parent().map(|p| !writable(p)).unwrap_or(false) {
        log::info!("{} is not writable by this user; escalating", bundle.display());
        return escalate(bundle, sys, None);
    }
    match remove_entries(bundle) {
        Ok(()) => Ok(Removal::Plain),
        Err(e) => {
            println!("{e}");
            let locked = match e {
                RemoveError::Entry { entry, .. } => Some(entry),
                RemoveError::Privileged { .. } => None,
            };
            escalate(bundle, sys, locked)
        }
    }
}

fn escalate(bundle: &Path, sys: &dyn System, locked: Option<String>) -> Result<Removal, RemoveError> {
    println!("Removing {} with administrator privileges...", bundle.display());
    sys.remove_privileged(bundle)
        .map_err(|reason| RemoveError::Privileged { path: bundle.to_path_buf(), reason })?;
    if bundle.exists() {
        return Err(RemoveError::Privileged { path: bundle.to_path_buf(), reason: "bundle still present".into() });
    }
    Ok(Removal::Privileged { locked })
}

// Bottom-up so the first locked entry is the one reported.
fn remove_entries(bundle: &Path) -> Result<(), RemoveError> {
    for entry in WalkDir::new(bundle).contents_first(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| bundle.to_path_buf());
            let entry = path.display().to_string();
            let source = e.into_io_error().unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            RemoveError::Entry { path: bundle.to_path_buf(), entry, source }
        })?;
        let res = if entry.file_type().is_dir() { fs::remove_dir(entry.path()) } else { fs::remove_file(entry.path()) };
        res.map_err(|source| RemoveError::Entry {
            path: bundle.to_path_buf(),
            entry: entry.path().display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn writable(p: &Path) -> bool {
    match fs::symlink_metadata(p) {
        Ok(m) => !m.permissions().readonly(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use std::cell::Cell;
    use std::time::Duration;

    struct Sudo {
        called: Cell<bool>,
        works: bool,
    }

    impl System for Sudo {
        fn bundle_version(&self, _bundle: &Path) -> Version { Version::Unknown }
        fn request_quit(&self, _app_name: &str) {}
        fn is_running(&self, _bundle: &Path) -> bool { false }
        fn remove_privileged(&self, bundle: &Path) -> Result<(), String> {
            self.called.set(true);
            if !self.works { return Err("denied".into()); }
            make_writable(bundle);
            fs::remove_dir_all(bundle).map_err(|e| e.to_string())
        }
        fn sleep(&self, _dur: Duration) {}
    }

    fn make_writable(p: &Path) {
        for e in WalkDir::new(p).into_iter().flatten() {
            if let Ok(m) = fs::metadata(e.path()) {
                let mut perms = m.permissions();
                #[allow(clippy::permissions_set_readonly_false)]
                perms.set_readonly(false);
                let _ = fs::set_permissions(e.path(), perms);
            }
        }
    }

    fn bundle_in(dir: &Path) -> std::path::PathBuf {
        let b = dir.join("Foo.app");
        fs::create_dir_all(b.join("Contents/MacOS")).unwrap();
        fs::write(b.join("Contents/Info.plist"), b"<plist/>").unwrap();
        fs::write(b.join("Contents/MacOS/Foo"), b"bin").unwrap();
        b
    }

    #[test]
    fn plain_removal_deletes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let b = bundle_in(dir.path());
        let sys = Sudo { called: Cell::new(false), works: false };
        assert_eq!(remove_bundle(&b, &sys).unwrap(), Removal::Plain);
        assert!(!b.exists());
        assert!(!sys.called.get());
    }

    #[test]
    fn readonly_bundle_escalates() {
        let dir = tempfile::tempdir().unwrap();
        let b = bundle_in(dir.path());
        let mut perms = fs::metadata(&b).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&b, perms).unwrap();

        let sys = Sudo { called: Cell::new(false), works: true };
        assert_eq!(remove_bundle(&b, &sys).unwrap(), Removal::Privileged { locked: None });
        assert!(sys.called.get());
        assert!(!b.exists());
    }

    #[cfg(unix)]
    #[test]
    fn locked_entry_inside_writable_bundle_escalates() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let b = bundle_in(dir.path());
        let macos = b.join("Contents/MacOS");
        fs::set_permissions(&macos, fs::Permissions::from_mode(0o555)).unwrap();
        // root ignores directory modes, so there is nothing to lock
        if fs::write(macos.join(".write-check"), b"").is_ok() {
            make_writable(&b);
            return;
        }

        let sys = Sudo { called: Cell::new(false), works: true };
        let removal = remove_bundle(&b, &sys).unwrap();

        assert!(sys.called.get());
        assert!(!b.exists());
        match removal {
            Removal::Privileged { locked: Some(entry) } => assert!(entry.ends_with("Contents/MacOS/Foo"), "{entry}"),
            other => panic!("expected escalation after a locked entry, got {other:?}"),
        }
    }

    #[test]
    fn failed_escalation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let b = bundle_in(dir.path());
        let mut perms = fs::metadata(&b).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&b, perms).unwrap();

        let sys = Sudo { called: Cell::new(false), works: false };
        let err = remove_bundle(&b, &sys).unwrap_err();
        assert!(matches!(err, RemoveError::Privileged { .. }));
        assert!(b.exists());
        make_writable(&b);
    }
}
