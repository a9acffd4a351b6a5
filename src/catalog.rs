use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

use crate::error::CatalogError;
use crate::version::Version;

/// Metadata for one cask. Anything brew did not report cleanly is left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CaskInfo {
    pub token: String,
    pub version: Version,
    pub names: Vec<String>,
    pub desc: Option<String>,
    pub homepage: Option<String>,
}

impl CaskInfo {
    pub fn unknown(token: &str) -> Self {
        CaskInfo { token: token.to_string(), version: Version::Unknown, names: vec![], desc: None, homepage: None }
    }
}

/// The package catalog, queried by cask token.
pub trait Catalog {
    /// Transient failures count as "does not exist".
    fn exists(&self, token: &str) -> bool;
    fn info(&self, token: &str) -> CaskInfo;
    fn installed(&self) -> Result<HashSet<String>, CatalogError>;
    fn install(&self, token: &str) -> Result<(), CatalogError>;
}

pub struct Brew {
    bin: PathBuf,
    seen: RefCell<HashMap<String, bool>>,
}

impl Brew {
    pub fn new(bin: PathBuf) -> Self {
        Brew { bin, seen: RefCell::new(HashMap::new()) }
    }

    fn output(&self, args: &[&str]) -> Result<std::process::Output, CatalogError> {
        log::debug!("running {} {}", self.bin.display(), args.join(" "));
        Command::new(&self.bin)
            .args(args)
            .env("HOMEBREW_NO_AUTO_UPDATE", "1")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CatalogError::Spawn { args: args.join(" "), source })
    }
}

impl Catalog for Brew {
    fn exists(&self, token: &str) -> bool {
        if let Some(&hit) = self.seen.borrow().get(token) { return hit; }
        let found = match self.output(&["info", "--cask", token]) {
            Ok(out) => out.status.success(),
            Err(e) => {
                log::warn!("{e}; treating cask '{token}' as missing");
                false
            }
        };
        self.seen.borrow_mut().insert(token.to_string(), found);
        found
    }

    fn info(&self, token: &str) -> CaskInfo {
        match self.output(&["info", "--cask", "--json=v2", token]) {
            Ok(out) if out.status.success() => parse_cask_info(token, &String::from_utf8_lossy(&out.stdout)),
            Ok(out) => {
                log::debug!("brew info --json for {token} exited with {}", out.status);
                CaskInfo::unknown(token)
            }
            Err(e) => {
                log::warn!("{e}");
                CaskInfo::unknown(token)
            }
        }
    }

    fn installed(&self) -> Result<HashSet<String>, CatalogError> {
        let args = ["list", "--cask", "-1"];
        let out = self.output(&args)?;
        if !out.status.success() {
            return Err(CatalogError::Status { args: args.join(" "), status: out.status });
        }
        Ok(parse_token_list(&String::from_utf8_lossy(&out.stdout)))
    }

    fn install(&self, token: &str) -> Result<(), CatalogError> {
        let args = ["install", "--cask", token];
        log::debug!("running {} {}", self.bin.display(), args.join(" "));
        // inherit stdio so brew can show progress and ask for a password
        let status = Command::new(&self.bin)
            .args(args)
            .status()
            .map_err(|source| CatalogError::Spawn { args: args.join(" "), source })?;
        if !status.success() {
            return Err(CatalogError::Status { args: args.join(" "), status });
        }
        Ok(())
    }
}

pub fn parse_token_list(s: &str) -> HashSet<String> {
    s.lines().map(|l| l.trim()).filter(|l| !l.is_empty()).map(|l| l.to_string()).collect()
}

/// Parse `brew info --cask --json=v2` output, tolerating raw control characters
/// inside strings and both the v2 (`{"casks": [...]}`) and bare-array shapes.
pub fn parse_cask_info(token: &str, raw: &str) -> CaskInfo {
    let cleaned: String = raw.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
    let Ok(root) = serde_json::from_str::<Value>(&cleaned) else {
        log::debug!("unparseable cask metadata for {token}");
        return CaskInfo::unknown(token);
    };
    let cask = match &root {
        Value::Object(map) if map.contains_key("casks") => root.get("casks").and_then(|c| c.get(0)),
        Value::Array(_) => root.get(0),
        Value::Object(_) => Some(&root),
        _ => None,
    };
    let Some(cask) = cask.filter(|c| c.is_object()) else { return CaskInfo::unknown(token) };

    let version = match cask.get("version") {
        Some(Value::String(s)) => Version::parse(s),
        Some(Value::Number(n)) => Version::parse(&n.to_string()),
        _ => Version::Unknown,
    };
    let names = match cask.get("name") {
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str()).map(|s| s.trim().to_string()).collect(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        _ => vec![],
    };
    let text = |key: &str| cask.get(key).and_then(|v| v.as_str()).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    CaskInfo {
        token: text("token").unwrap_or_else(|| token.to_string()),
        version,
        names,
        desc: text("desc"),
        homepage: text("homepage"),
    }
}
