use std::io::{self, Write};

use colored::Colorize;
use tracing::{info, warn};

use cidfix_migrate::{Migration, MigrationConfig, MigrationObserver, MigrationReport};
use cidfix_pin::PinMode;
use cidfix_store::DagError;
use cidfix_types::Cid;

use crate::cli::Cli;
use crate::repo::{self, Repo};

const PIN_BANNER: &str = "============\nFixing potential pinning problems...\n===========";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let root = repo::resolve_from_env(cli.repo)?;
    let repo = Repo::open(&root)?;
    info!(repo = %repo.root.display(), "opened repository");

    let config = if cli.strict {
        MigrationConfig::strict()
    } else {
        MigrationConfig::default()
    };

    let stdout = io::stdout();
    let mut observer = PrintObserver::new(stdout.lock());
    let report = Migration::new(&repo.blocks, &repo.pins, config).run(&mut observer)?;
    print_summary(&report);
    Ok(())
}

/// Writes one line per progress event, in the format downstream scripts parse.
pub struct PrintObserver<W: Write> {
    out: W,
}

impl<W: Write> PrintObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            warn!(error = %e, "failed to write progress line");
        }
    }
}

impl<W: Write> MigrationObserver for PrintObserver<W> {
    fn node_rewritten(&mut self, old: &Cid, new: &Cid) {
        self.line(format_args!("fixed {old} to {new}"));
    }

    fn node_skipped(&mut self, _cid: &Cid, error: &DagError) {
        self.line(format_args!("{error}"));
    }

    fn pin_phase_started(&mut self) {
        self.line(format_args!("{PIN_BANNER}"));
    }

    fn pin_changed(&mut self, old: &Cid, new: &Cid, _mode: PinMode) {
        self.line(format_args!("Changed object {old} to {new}"));
    }
}

/// Print a fatal error to `out` and map the run's outcome to a process status.
pub fn exit_status<W: Write>(result: anyhow::Result<()>, out: &mut W) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            if let Err(e) = writeln!(out, "{err:#}") {
                warn!(error = %e, "failed to print error");
            }
            1
        }
    }
}

fn print_summary(report: &MigrationReport) {
    if report.is_noop() {
        eprintln!("{} Nothing to migrate.", "✓".green().bold());
        return;
    }
    eprintln!("{} Migration complete", "✓".green().bold());
    eprintln!("  Blocks relabeled: {}", report.blocks_relabeled.to_string().bold());
    eprintln!("  Nodes rewritten:  {}", report.nodes_rewritten.to_string().bold());
    eprintln!("  Pins changed:     {}", report.pins_changed.to_string().bold());
    eprintln!("  Nodes pruned:     {}", report.nodes_pruned.to_string().bold());
    if report.nodes_skipped > 0 {
        eprintln!(
            "  Nodes skipped:    {}",
            report.nodes_skipped.to_string().yellow()
        );
    }
}
