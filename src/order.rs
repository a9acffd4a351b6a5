use crate::prompt::Prompt;
use crate::scan::Candidate;

#[derive(Debug)]
pub struct Reordered<T> {
    pub items: Vec<T>,
    pub invalid: Vec<String>,
}

/// Reorder `items` from a line of 1-based indices.
///
/// A single index rotates the queue so that item is processed first; a
/// comma/space separated list moves those items to the front in the given
/// order. Everything else keeps its relative order. Blank input, or input
/// with no valid index, leaves the order unchanged.
pub fn reorder<T>(items: Vec<T>, input: &str) -> Reordered<T> {
    let tokens: Vec<&str> = input.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()).collect();
    let mut invalid = Vec::new();
    let mut picked: Vec<usize> = Vec::new();
    for tok in &tokens {
        match tok.parse::<usize>() {
            Ok(n) if n >= 1 && n <= items.len() => {
                if picked.contains(&(n - 1)) {
                    invalid.push(format!("{tok} (duplicate)"));
                } else {
                    picked.push(n - 1);
                }
            }
            _ => invalid.push(tok.to_string()),
        }
    }
    if picked.is_empty() {
        return Reordered { items, invalid };
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    if tokens.len() == 1 {
        let start = picked[0];
        let len = slots.len();
        for i in 0..len {
            if let Some(item) = slots[(start + i) % len].take() { out.push(item); }
        }
    } else {
        for &i in &picked {
            if let Some(item) = slots[i].take() { out.push(item); }
        }
        out.extend(slots.into_iter().flatten());
    }
    Reordered { items: out, invalid }
}

pub fn prompt_order(candidates: Vec<Candidate>, prompt: &mut dyn Prompt) -> Vec<Candidate> {
    if candidates.len() < 2 { return candidates; }
    println!("Processing order:");
    for (i, c) in candidates.iter().enumerate() {
        println!("  [{}] {} ({})", i + 1, c.name, c.version);
    }
    let answer = prompt.line("Start with which app? Enter an index, a list like '3,1', or press Enter to keep this order: ");
    let result = reorder(candidates, &answer);
    for bad in &result.invalid {
        println!("Ignoring invalid selection: {bad}");
    }
    result.items
}
