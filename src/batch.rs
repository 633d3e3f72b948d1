//! Directory batch processing.
//!
//! Every regular, non-hidden file of the input directory is loaded,
//! searched for subtitles and written to `<output>/<stem>.csv`. A failing
//! file is logged and recorded in the [`BatchReport`]; the remaining files
//! are still processed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::detect::{detect_format_from_path, SourceFormat};
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, SubtitleExtractor};
use crate::model::Subtitle;
use crate::parser::{load_file, LoadOptions};
use crate::render::{self, CombinedEntry, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for PDF and HTML files
    pub input_dir: PathBuf,

    /// Directory receiving one CSV per input
    pub output_dir: PathBuf,

    /// Document loading options
    pub load: LoadOptions,

    /// Subtitle detection options
    pub extract: ExtractOptions,

    /// Optional merged CSV of every subtitle with its source file
    pub combined: Option<PathBuf>,

    /// Keep only the first occurrence of each subtitle in the merged CSV
    pub combined_unique: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("inputs"),
            output_dir: PathBuf::from("outputs"),
            load: LoadOptions::default(),
            extract: ExtractOptions::default(),
            combined: None,
            combined_unique: false,
        }
    }
}

impl BatchOptions {
    /// Create batch options with the default `inputs`/`outputs` directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input directory.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set document loading options.
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Set subtitle detection options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Also write a merged CSV to `path`.
    pub fn with_combined(mut self, path: impl Into<PathBuf>, unique: bool) -> Self {
        self.combined = Some(path.into());
        self.combined_unique = unique;
        self
    }
}

/// Outcome for a single input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Input file
    pub input: PathBuf,
    /// CSV written, if any
    pub output: Option<PathBuf>,
    /// Detected source format
    pub format: Option<SourceFormat>,
    /// Number of subtitles written
    pub subtitles: usize,
    /// Error message when the file failed
    pub error: Option<String>,
    /// Short error label when the file failed
    pub error_kind: Option<String>,
    #[serde(skip)]
    rows: Vec<Subtitle>,
}

impl FileReport {
    fn succeeded(input: &Path, output: PathBuf, format: SourceFormat, rows: Vec<Subtitle>) -> Self {
        Self {
            input: input.to_path_buf(),
            output: Some(output),
            format: Some(format),
            subtitles: rows.len(),
            error: None,
            error_kind: None,
            rows,
        }
    }

    fn failed(input: &Path, error: &Error) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            format: detect_format_from_path(input).ok(),
            subtitles: 0,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            rows: Vec::new(),
        }
    }

    /// Whether the file was processed successfully.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Subtitles written for this file.
    pub fn subtitle_rows(&self) -> &[Subtitle] {
        &self.rows
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Per-file outcomes, in processing order
    pub files: Vec<FileReport>,
    /// Files processed successfully
    pub processed: usize,
    /// Files that failed
    pub failed: usize,
    /// Subtitles written across all files
    pub total_subtitles: usize,
    /// Merged CSV, when requested
    pub combined: Option<PathBuf>,
}

impl BatchReport {
    fn push(&mut self, file: FileReport) {
        if file.is_ok() {
            self.processed += 1;
            self.total_subtitles += file.subtitles;
        } else {
            self.failed += 1;
        }
        self.files.push(file);
    }

    /// Whether every file succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Failed files only.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_ok())
    }

    /// Render the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(self, JsonFormat::Pretty)
    }
}

/// Progress notifications emitted during a batch run.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Inputs listed; `total` files will be processed
    Started { total: usize },
    /// A file is about to be processed
    FileStarted { input: &'a Path },
    /// A file finished, successfully or not
    FileFinished { report: &'a FileReport },
}

/// Run the batch with the given options.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    run_batch_with_progress(options, |_| {})
}

/// Run the batch, reporting progress through `on_event`.
///
/// Only failures to set up the directories or to write the merged CSV are
/// returned as errors; per-file failures end up in the report.
pub fn run_batch_with_progress<F>(options: &BatchOptions, mut on_event: F) -> Result<BatchReport>
where
    F: FnMut(BatchEvent<'_>),
{
    prepare_dirs(options)?;
    let inputs = list_inputs(&options.input_dir)?;
    let outputs = output_paths(&inputs, &options.output_dir);

    log::info!(
        "Processing {} files from {}",
        inputs.len(),
        options.input_dir.display()
    );
    on_event(BatchEvent::Started {
        total: inputs.len(),
    });

    let extractor = SubtitleExtractor::new(options.extract.clone());
    let mut report = BatchReport::default();

    for (input, output) in inputs.iter().zip(outputs) {
        on_event(BatchEvent::FileStarted { input });

        let file = match process_to(input, output, &options.load, &extractor) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Skipping {}: {}", input.display(), e);
                FileReport::failed(input, &e)
            }
        };

        on_event(BatchEvent::FileFinished { report: &file });
        report.push(file);
    }

    if let Some(path) = &options.combined {
        let entries: Vec<CombinedEntry> = report
            .files
            .iter()
            .flat_map(|f| {
                let name = file_name(&f.input);
                f.rows
                    .iter()
                    .map(move |s| CombinedEntry::new(s.text.clone(), name.clone()))
            })
            .collect();
        render::write_combined_csv(&entries, path, options.combined_unique)?;
        log::info!("Wrote merged CSV {}", path.display());
        report.combined = Some(path.clone());
    }

    log::info!(
        "Batch finished: {} processed, {} failed, {} subtitles",
        report.processed,
        report.failed,
        report.total_subtitles
    );
    Ok(report)
}

/// Process one file into `<output_dir>/<stem>.csv`.
pub fn process_file<P: AsRef<Path>>(
    path: P,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<FileReport> {
    let path = path.as_ref();
    let output = output_dir.join(format!("{}.csv", file_stem(path)));
    let extractor = SubtitleExtractor::new(options.extract.clone());
    process_to(path, output, &options.load, &extractor)
}

fn process_to(
    input: &Path,
    output: PathBuf,
    load: &LoadOptions,
    extractor: &SubtitleExtractor,
) -> Result<FileReport> {
    let format = detect_format_from_path(input)?;
    let document = load_file(input, load)?;
    let subtitles = extractor.extract(&document);
    render::write_csv(&subtitles, &output)?;

    log::info!(
        "{} -> {} ({} subtitles)",
        input.display(),
        output.display(),
        subtitles.len()
    );
    Ok(FileReport::succeeded(input, output, format, subtitles))
}

fn prepare_dirs(options: &BatchOptions) -> Result<()> {
    for dir in [&options.input_dir, &options.output_dir] {
        fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// List regular, non-hidden files of `dir` sorted by name.
pub fn list_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::file_read(dir, e))? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_file() {
            inputs.push(entry.path());
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Name each input's CSV.
///
/// Inputs get `<stem>.csv`. Names that clash (case-insensitively) fall back
/// to `<file name>.csv`, then to `<file name>-<n>.csv` with `n` the input's
/// 1-based position, until every name is distinct.
pub fn output_paths(inputs: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let mut levels = vec![NameLevel::Stem; inputs.len()];
    loop {
        let names: Vec<String> = inputs
            .iter()
            .zip(&levels)
            .enumerate()
            .map(|(i, (input, level))| output_name(input, *level, i))
            .collect();

        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            groups.entry(name.to_lowercase()).or_default().push(i);
        }

        let mut changed = false;
        for group in groups.values().filter(|g| g.len() > 1) {
            let lowest = group.iter().map(|&i| levels[i]).min().unwrap_or(NameLevel::Indexed);
            for &i in group {
                if levels[i] == lowest && lowest != NameLevel::Indexed {
                    levels[i] = lowest.next();
                    changed = true;
                }
            }
        }

        if !changed {
            return names
                .into_iter()
                .map(|name| output_dir.join(format!("{}.csv", name)))
                .collect();
        }
    }
}

/// How much of an input's name goes into its CSV name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NameLevel {
    Stem,
    FileName,
    Indexed,
}

impl NameLevel {
    fn next(self) -> Self {
        match self {
            NameLevel::Stem => NameLevel::FileName,
            NameLevel::FileName | NameLevel::Indexed => NameLevel::Indexed,
        }
    }
}

fn output_name(input: &Path, level: NameLevel, index: usize) -> String {
    match level {
        NameLevel::Stem => file_stem(input),
        NameLevel::FileName => file_name(input),
        NameLevel::Indexed => format!("{}-{}", file_name(input), index + 1),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
