mod catalog;
mod cli;
mod config;
mod engine;
mod error;
mod order;
mod prompt;
mod remove;
mod report;
mod resolve;
mod scan;
mod system;
mod version;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}
