use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Catalog;

static MAC_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(for|on)\s+mac(\s+os(\s+x)?)?\s*$").unwrap());
static CLASSIC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+classic\s*$").unwrap());

/// Lowercase, with whitespace runs collapsed to a single hyphen.
pub fn canonicalize(name: &str) -> String {
    name.split_whitespace().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("-")
}

/// "Microsoft Word for Mac" -> "Microsoft Word"; None when there is no qualifier.
pub fn strip_mac_qualifier(name: &str) -> Option<&str> {
    MAC_QUALIFIER.find(name).map(|m| &name[..m.start()]).filter(|s| !s.trim().is_empty())
}

pub fn classic_token(name: &str) -> Option<String> {
    let m = CLASSIC_SUFFIX.find(name)?;
    let base = canonicalize(&name[..m.start()]);
    if base.is_empty() { return None; }
    Some(format!("{base}@classic"))
}

/// Maps application display names to cask tokens.
pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self { Resolver { catalog } }

    /// First existing of: direct form, form without a "for Mac" qualifier,
    /// `<base>@classic`. Falls back to the direct form, which the caller must
    /// still check for existence.
    pub fn resolve(&self, display_name: &str) -> String {
        let direct = canonicalize(display_name);
        if self.catalog.exists(&direct) { return direct; }

        if let Some(simple) = strip_mac_qualifier(display_name).map(canonicalize) {
            if simple != direct && self.catalog.exists(&simple) {
                log::debug!("{display_name}: matched simplified token {simple}");
                return simple;
            }
        }

        if let Some(classic) = classic_token(display_name) {
            if self.catalog.exists(&classic) {
                log::debug!("{display_name}: matched {classic}");
                return classic;
            }
        }
        direct
    }

    pub fn exists(&self, token: &str) -> bool { self.catalog.exists(token) }
}
