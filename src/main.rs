//! aq-morftest: morphological transducer consistency tester.
//!
//! Runs every test in the given YAML file by default. The lookup program
//! (`hfst-lookup`, or Xerox `lookup` with suitable flags) must be on the PATH.

use apertium_quality::config::DEFAULT_STATISTICS_FILE;
use apertium_quality::{MorphHarness, MorphOptions, MorphResult, MorphRun, StatisticsStore};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aq-morftest")]
#[command(about = "Test morphological transducers for consistency", long_about = None)]
#[command(after_help = "Will run all tests in the test_file by default.")]
#[command(version)]
struct Cli {
    /// Makes output more compact
    #[arg(short = 'C', long)]
    compact: bool,

    /// Ignore extra analyses when there are more than expected; PASS if the expected one is found
    #[arg(short = 'i', long)]
    ignore_extra_analyses: bool,

    /// Surface input/analysis tests only
    #[arg(short = 's', long)]
    surface: bool,

    /// Lexical input/generation tests only
    #[arg(short = 'l', long)]
    lexical: bool,

    /// Suppresses failures to make finding passes easier
    // Only the report lines go; hidden fails still count in the totals.
    #[arg(short = 'f', long)]
    hide_fails: bool,

    /// Suppresses passes to make finding failures easier
    #[arg(short = 'p', long)]
    hide_passes: bool,

    /// The section to be used for testing
    #[arg(short = 'S', long, default_value = "hfst")]
    section: String,

    /// Which test to run (default: all), e.g. 'Noun - gåetie'
    #[arg(short = 't', long)]
    test: Option<String>,

    /// More verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Colours the output
    #[arg(short = 'c', long)]
    colour: bool,

    /// JSON file that statistics are to be stored in
    #[arg(
        short = 'X',
        long,
        num_args = 0..=1,
        default_missing_value = DEFAULT_STATISTICS_FILE
    )]
    statistics: Option<PathBuf>,

    /// Override application used for test
    #[arg(long)]
    app: Option<String>,

    /// Override generation transducer used for test
    #[arg(long)]
    gen: Option<PathBuf>,

    /// Override morph transducer used for test
    #[arg(long)]
    morph: Option<PathBuf>,

    /// YAML file with test rules
    test_file: PathBuf,
}

impl Cli {
    fn options(&self) -> MorphOptions {
        MorphOptions {
            compact: self.compact,
            ignore_extra_analyses: self.ignore_extra_analyses,
            surface_only: self.surface,
            lexical_only: self.lexical,
            hide_passes: self.hide_passes,
            hide_fails: self.hide_fails,
            section: self.section.clone(),
            test: self.test.clone(),
            verbose: self.verbose,
            colour: self.colour,
            app: self.app.clone(),
            gen: self.gen.clone(),
            morph: self.morph.clone(),
            statistics: self.statistics.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "apertium_quality=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> MorphResult<()> {
    let harness = MorphHarness::load(&cli.test_file, cli.options())?;
    let run = harness.run()?;
    println!("{}", harness.render(&run));

    if let Some(path) = &harness.options().statistics {
        // The report is already out; a bad statistics file must not undo it.
        if let Err(e) = save_statistics(&harness, &run, path) {
            eprintln!("warning: {}", e);
        }
    }
    Ok(())
}

fn save_statistics(harness: &MorphHarness, run: &MorphRun, path: &Path) -> MorphResult<()> {
    let record = harness.record(run)?;
    let mut store = StatisticsStore::open(path)?;
    store.add(record);
    store.write()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
