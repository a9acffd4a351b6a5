use std::time::Duration;

use crate::catalog::{CaskInfo, Catalog};
use crate::prompt::{Decision, Prompt};
use crate::remove::{self, Removal};
use crate::report::RunReport;
use crate::resolve::Resolver;
use crate::scan::Candidate;
use crate::system::System;
use crate::version::{self, Comparison};

#[derive(Debug, Clone)]
pub struct Options {
    pub dry_run: bool,
    pub verbose: bool,
    pub quit_grace: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Options { dry_run: false, verbose: false, quit_grace: Duration::from_secs(3) }
    }
}

/// Terminal state of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replaced,
    NotFound,
    Conflict,
    Skipped,
    /// Still running and the operator declined to force-continue.
    Aborted,
    RemoveFailed,
    /// Would have been replaced; nothing was touched.
    DryRun,
}

/// Walks candidates one by one: resolve, compare, ask, quit, remove, install.
pub struct Migrator<'a> {
    catalog: &'a dyn Catalog,
    system: &'a dyn System,
    prompt: &'a mut dyn Prompt,
    opts: Options,
    sticky: Option<Decision>,
    report: RunReport,
}

impl<'a> Migrator<'a> {
    pub fn new(catalog: &'a dyn Catalog, system: &'a dyn System, prompt: &'a mut dyn Prompt, opts: Options) -> Self {
        Migrator { catalog, system, prompt, opts, sticky: None, report: RunReport::default() }
    }

    pub fn run(mut self, candidates: &[Candidate]) -> RunReport {
        for (i, c) in candidates.iter().enumerate() {
            println!();
            println!("[{}/{}] {}", i + 1, candidates.len(), c.name);
            let outcome = self.process(c);
            log::debug!("{} -> {:?}", c.name, outcome);
        }
        self.report
    }

    pub fn process(&mut self, c: &Candidate) -> Outcome {
        let outcome = self.step(c);
        self.record(c, outcome);
        outcome
    }

    fn step(&mut self, c: &Candidate) -> Outcome {
        let resolver = Resolver::new(self.catalog);
        let token = resolver.resolve(&c.name);
        if !resolver.exists(&token) {
            println!("No cask found for {} (tried '{}')", c.name, token);
            return Outcome::NotFound;
        }

        let info = self.catalog.info(&token);
        let cmp = version::compare(&c.version, &info.version);
        if self.opts.verbose { print_details(&info); }

        let decision = self.decide(c, &info, cmp);
        if !decision.is_yes() {
            println!("Skipping {}", c.name);
            return Outcome::Skipped;
        }

        if self.opts.dry_run {
            println!("--dry-run: would quit {} if running", c.name);
            println!("--dry-run: would remove {}", c.path.display());
            println!("--dry-run: would run brew install --cask {}", token);
            return Outcome::DryRun;
        }

        if !self.quit(c) {
            println!("Leaving {} untouched", c.name);
            return Outcome::Aborted;
        }

        println!("Removing {}...", c.path.display());
        match remove::remove_bundle(&c.path, self.system) {
            Ok(Removal::Plain) => {}
            Ok(Removal::Privileged { locked }) => {
                if let Some(entry) = locked { log::info!("{entry} could not be removed without elevated rights"); }
                log::info!("{} removed with elevated rights", c.path.display());
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return Outcome::RemoveFailed;
            }
        }

        println!("Installing cask {}...", token);
        match self.catalog.install(&token) {
            Ok(()) => {
                println!("Replaced {} with cask {}", c.name, token);
                Outcome::Replaced
            }
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!("{} was removed but cask {} did not install", c.name, token);
                Outcome::Conflict
            }
        }
    }

    fn decide(&mut self, c: &Candidate, info: &CaskInfo, cmp: Comparison) -> Decision {
        if let Some(sticky) = self.sticky {
            let word = if sticky.is_yes() { "yes" } else { "no" };
            println!("{}: applying earlier answer ({word} to all)", c.name);
            return sticky;
        }
        let question = question_for(c, info, cmp);
        let decision = self.prompt.decide(&question);
        if decision.is_sticky() { self.sticky = Some(decision); }
        decision
    }

    /// False when the app is still running and the operator chose not to continue.
    fn quit(&mut self, c: &Candidate) -> bool {
        if !self.system.is_running(&c.path) { return true; }
        println!("Quitting {}...", c.name);
        self.system.request_quit(&c.name);
        self.system.sleep(self.opts.quit_grace);
        if !self.system.is_running(&c.path) { return true; }
        self.prompt.confirm(&format!(
            "{} is still running after {}. Remove it anyway? [y/N] ",
            c.name,
            humantime::format_duration(self.opts.quit_grace)
        ))
    }

    fn record(&mut self, c: &Candidate, outcome: Outcome) {
        let r = &mut self.report;
        r.processed += 1;
        match outcome {
            Outcome::Replaced => r.replaced += 1,
            Outcome::NotFound => r.not_found.push(c.name.clone()),
            Outcome::Conflict => r.conflicts.push(c.name.clone()),
            Outcome::Skipped | Outcome::Aborted => r.skipped.push(c.name.clone()),
            Outcome::RemoveFailed => r.failed.push(c.name.clone()),
            Outcome::DryRun => {}
        }
    }
}

const CHOICES: &str = "[y]es / [n]o / [A]ll yes / all no [F]";

fn question_for(c: &Candidate, info: &CaskInfo, cmp: Comparison) -> String {
    let (iv, cv, token) = (&c.version, &info.version, &info.token);
    match cmp {
        Comparison::Same => format!("{}: installed {iv} matches cask {token} {cv}. Replace with the cask? {CHOICES} ", c.name),
        Comparison::Older => format!("{}: installed {iv} differs from cask {token} {cv} (cask is newer). Replace with the cask? {CHOICES} ", c.name),
        Comparison::Newer => format!("{}: installed {iv} is newer than cask {token} {cv}. Replace anyway? {CHOICES} ", c.name),
        Comparison::Unknown => format!("{}: cannot compare installed {iv} with cask {token} {cv}. Replace with the cask? {CHOICES} ", c.name),
    }
}

fn print_details(info: &CaskInfo) {
    println!("  cask:     {}", info.token);
    if !info.names.is_empty() { println!("  name:     {}", info.names.join(", ")); }
    println!("  version:  {}", info.version);
    if let Some(d) = &info.desc { println!("  desc:     {d}"); }
    if let Some(h) = &info.homepage { println!("  homepage: {h}"); }
}
