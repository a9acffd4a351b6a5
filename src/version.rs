use std::cmp::Ordering;
use std::fmt;

/// A dotted version as read from a bundle or the cask catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    Known(String),
    Unknown,
}

/// How the first version relates to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Newer,
    Older,
    Same,
    Unknown,
}

impl Version {
    /// Anything without a digit ("latest", "unknown", "") carries no ordering information.
    pub fn parse(raw: &str) -> Version {
        let t = raw.trim();
        // casks encode build numbers as "1.2.3,4567"
        let t = t.split(',').next().unwrap_or("").trim();
        if t.is_empty() || t.eq_ignore_ascii_case("unknown") || !t.chars().any(|c| c.is_ascii_digit()) {
            return Version::Unknown;
        }
        Version::Known(t.to_string())
    }

    pub fn is_unknown(&self) -> bool { matches!(self, Version::Unknown) }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Known(s) => f.write_str(s),
            Version::Unknown => f.write_str("unknown"),
        }
    }
}

pub fn compare(a: &Version, b: &Version) -> Comparison {
    let (Version::Known(a), Version::Known(b)) = (a, b) else { return Comparison::Unknown };
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = numeric_part(left.get(i).copied().unwrap_or("0"));
        let r = numeric_part(right.get(i).copied().unwrap_or("0"));
        match cmp_digits(&l, &r) {
            Ordering::Greater => return Comparison::Newer,
            Ordering::Less => return Comparison::Older,
            Ordering::Equal => {}
        }
    }
    Comparison::Same
}

/// Convenience for callers holding raw strings.
pub fn compare_str(a: &str, b: &str) -> Comparison {
    compare(&Version::parse(a), &Version::parse(b))
}

fn numeric_part(component: &str) -> String {
    let digits: String = component.chars().filter(|c| c.is_ascii_digit()).collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0".into() } else { trimmed.to_string() }
}

// Both inputs are canonical digit strings without leading zeros, so length decides first.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
