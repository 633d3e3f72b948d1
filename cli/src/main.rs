//! pbcsub CLI - extract subtitles from PBC documents into CSV

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pbcsub::{
    run_batch_with_progress, BatchEvent, BatchOptions, BatchReport, ExtractOptions, LoadOptions,
    PageSelection, Strategy,
};

/// Exit code when at least one file failed.
const EXIT_FILE_FAILED: u8 = 1;
/// Exit code when the batch could not run at all.
const EXIT_SETUP_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "pbcsub")]
#[command(version)]
#[command(
    about = "Extract subtitles from PBC documents (PDF/HTML) into CSV",
    long_about = "Reads every PDF and HTML file in the input directory, detects the \
                  subtitles of each document and writes them to <output>/<name>.csv \
                  with a single `subtitulo` column."
)]
struct Cli {
    /// Directory with the PDF and HTML documents
    #[arg(short, long, value_name = "DIR", env = "PBCSUB_INPUT", default_value = "inputs")]
    input: PathBuf,

    /// Directory receiving the CSV files
    #[arg(short, long, value_name = "DIR", env = "PBCSUB_OUTPUT", default_value = "outputs")]
    output: PathBuf,

    /// Subtitle to leave out (repeatable)
    #[arg(short, long, value_name = "TEXT", env = "PBCSUB_EXCLUDE", value_delimiter = ';')]
    exclude: Vec<String>,

    /// Do not drop the standard PBC section titles
    #[arg(long, env = "PBCSUB_NO_DEFAULT_EXCLUSIONS")]
    no_default_exclusions: bool,

    /// Where subtitles come from
    #[arg(long, value_enum, env = "PBCSUB_STRATEGY", default_value = "layout")]
    strategy: StrategyArg,

    /// Points above body text size that mark a heading
    #[arg(long, value_name = "PT", env = "PBCSUB_SIZE_DELTA", default_value = "1.5")]
    size_delta: f32,

    /// Longest subtitle kept, in characters
    #[arg(long, value_name = "CHARS", env = "PBCSUB_MAX_LENGTH", default_value = "150")]
    max_length: usize,

    /// Deepest heading level accepted (1-6)
    #[arg(long, value_name = "LEVEL", env = "PBCSUB_MAX_LEVEL", default_value = "6")]
    max_level: u8,

    /// Treat all-uppercase lines as subtitles
    #[arg(long, env = "PBCSUB_UPPERCASE")]
    uppercase: bool,

    /// Ignore bold text when detecting subtitles
    #[arg(long, env = "PBCSUB_NO_BOLD")]
    no_bold: bool,

    /// Keep subtitles that start with a lowercase letter
    #[arg(long, env = "PBCSUB_ALLOW_LOWERCASE")]
    allow_lowercase: bool,

    /// Drop repeated subtitles within a document and in the merged CSV
    #[arg(short, long, env = "PBCSUB_UNIQUE")]
    unique: bool,

    /// Also write every subtitle with its source file to this CSV
    #[arg(long, value_name = "FILE", env = "PBCSUB_COMBINED")]
    combined: Option<PathBuf>,

    /// Write a JSON report of the run
    #[arg(long, value_name = "FILE", env = "PBCSUB_REPORT")]
    report: Option<PathBuf>,

    /// Fail a file on its first unreadable page
    #[arg(long, env = "PBCSUB_STRICT")]
    strict: bool,

    /// PDF pages to read (e.g., "1-10", "1,3,5")
    #[arg(long, value_name = "PAGES", env = "PBCSUB_PAGES")]
    pages: Option<String>,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Font size, weight and structure (default)
    Layout,
    /// PDF bookmarks only
    Outline,
    /// Bookmarks when present, layout otherwise
    PreferOutline,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Layout => Strategy::Layout,
            StrategyArg::Outline => Strategy::Outline,
            StrategyArg::PreferOutline => Strategy::PreferOutline,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    let report = match run(&options, cli.quiet) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    }

    print_summary(&report, &options);

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FILE_FAILED)
    }
}

fn build_options(cli: &Cli) -> pbcsub::Result<BatchOptions> {
    let pages = match &cli.pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    let mut load = LoadOptions::new().with_pages(pages);
    if cli.strict {
        load = load.strict();
    }

    let mut extract = ExtractOptions::new()
        .with_strategy(cli.strategy.into())
        .with_size_delta(cli.size_delta)
        .with_max_length(cli.max_length)
        .with_max_level(cli.max_level)
        .with_uppercase_headings(cli.uppercase)
        .with_bold_detection(!cli.no_bold)
        .with_require_capitalized(!cli.allow_lowercase)
        .with_deduplicate(cli.unique);
    if cli.no_default_exclusions {
        extract = extract.with_exclusions(Vec::<String>::new());
    }
    for text in &cli.exclude {
        extract = extract.exclude(text.clone());
    }

    let mut options = BatchOptions::new()
        .with_input_dir(&cli.input)
        .with_output_dir(&cli.output)
        .with_load_options(load)
        .with_extract_options(extract);
    if let Some(path) = &cli.combined {
        options = options.with_combined(path, cli.unique);
    }
    Ok(options)
}

fn run(options: &BatchOptions, quiet: bool) -> pbcsub::Result<BatchReport> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(options, |event| match event {
        BatchEvent::Started { total } => pb.set_length(total as u64),
        BatchEvent::FileStarted { input } => {
            let name = input.file_name().unwrap_or_default().to_string_lossy();
            pb.set_message(name.to_string());
        }
        BatchEvent::FileFinished { report } => {
            if !report.is_ok() && !quiet {
                pb.println(format!(
                    "{} {}: {}",
                    "Skipped".yellow(),
                    report.input.display(),
                    report.error.as_deref().unwrap_or_default()
                ));
            }
            pb.inc(1);
        }
    });

    pb.finish_and_clear();
    report
}

fn write_report(report: &BatchReport, path: &Path) -> pbcsub::Result<()> {
    let json = report.to_json()?;
    fs::write(path, json).map_err(|source| pbcsub::Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn print_summary(report: &BatchReport, options: &BatchOptions) {
    if report.files.is_empty() {
        println!(
            "{} {}",
            "No documents found in".yellow(),
            options.input_dir.display()
        );
        return;
    }

    println!("{}", "Subtitle extraction".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for file in &report.files {
        let name = file.input.file_name().unwrap_or_default().to_string_lossy();
        match &file.output {
            Some(output) => println!(
                "  {} {} {} {} ({})",
                "✓".green(),
                name,
                "→".dimmed(),
                output.display(),
                file.subtitles
            ),
            None => println!(
                "  {} {} {}",
                "✗".red(),
                name,
                file.error_kind.as_deref().unwrap_or_default().dimmed()
            ),
        }
    }

    println!();
    println!("{}: {}", "Processed".bold(), report.processed);
    println!("{}: {}", "Subtitles".bold(), report.total_subtitles);
    if report.failed > 0 {
        println!("{}: {}", "Failed".red().bold(), report.failed);
    }
    if let Some(path) = &report.combined {
        println!("{}: {}", "Merged CSV".bold(), path.display());
    }
}
