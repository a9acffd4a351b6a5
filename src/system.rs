use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::version::Version;

/// Operating-system side effects the migration needs besides the catalog.
pub trait System {
    fn bundle_version(&self, bundle: &Path) -> Version;
    /// Best-effort; does not wait for the app to exit.
    fn request_quit(&self, app_name: &str);
    fn is_running(&self, bundle: &Path) -> bool;
    fn remove_privileged(&self, bundle: &Path) -> Result<(), String>;
    fn sleep(&self, dur: Duration);
}

/// macOS implementation backed by `defaults`, `osascript`, `ps` and `sudo`.
pub struct MacSystem;

impl System for MacSystem {
    fn bundle_version(&self, bundle: &Path) -> Version {
        let info = bundle.join("Contents").join("Info");
        let out = Command::new("defaults")
            .arg("read")
            .arg(&info)
            .arg("CFBundleShortVersionString")
            .stderr(Stdio::null())
            .output();
        match out {
            Ok(out) if out.status.success() => Version::parse(&String::from_utf8_lossy(&out.stdout)),
            _ => {
                log::debug!("no version readable from {}", info.display());
                Version::Unknown
            }
        }
    }

    fn request_quit(&self, app_name: &str) {
        let script = format!("quit app \"{}\"", applescript_quote(app_name));
        log::debug!("osascript -e {}", shell_escape::escape(Cow::from(script.as_str())));
        let _ = Command::new("osascript")
            .args(["-e", &script])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }

    // Matched on the literal executable path; bundle names routinely contain
    // characters that a pattern-based `pgrep -f` would misread.
    fn is_running(&self, bundle: &Path) -> bool {
        let out = match Command::new("ps").args(["-A", "-o", "args="]).stderr(Stdio::null()).output() {
            Ok(out) if out.status.success() => out,
            _ => {
                log::debug!("ps failed; assuming {} is not running", bundle.display());
                return false;
            }
        };
        let exe_dir = executable_dir(bundle);
        String::from_utf8_lossy(&out.stdout).lines().any(|l| runs_from(l, &exe_dir))
    }

    fn remove_privileged(&self, bundle: &Path) -> Result<(), String> {
        log::debug!("sudo rm -rf {}", shell_escape::escape(bundle.to_string_lossy()));
        let status = Command::new("sudo")
            .arg("rm")
            .arg("-rf")
            .arg("--")
            .arg(bundle)
            .status()
            .map_err(|e| format!("running sudo: {e}"))?;
        if !status.success() {
            return Err(format!("sudo rm exited with {status}"));
        }
        Ok(())
    }

    fn sleep(&self, dur: Duration) { std::thread::sleep(dur) }
}

pub fn executable_dir(bundle: &Path) -> PathBuf { bundle.join("Contents").join("MacOS") }

/// True when a `ps` command line starts with an executable inside `exe_dir`.
fn runs_from(command_line: &str, exe_dir: &Path) -> bool {
    let prefix = format!("{}/", exe_dir.to_string_lossy().trim_end_matches('/'));
    command_line.trim_start().starts_with(&prefix)
}

fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
