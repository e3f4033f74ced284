//! One validation run: rules, source, engine, then the requested outputs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use sheetval_ingest::{LoadOptions, LoadedTable, load_table};
use sheetval_model::{RowTable, RuleSet, ValidationError, source_failure};
use sheetval_report::{
    ErrorRow, JsonReport, ReportSource, ValidationSummary, annotate_loaded,
    default_annotation_path, export_csv, render_rows,
};
use sheetval_rules::RuleStore;
use sheetval_validate::RuleEngine;
use tracing::{info, info_span, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub rules: PathBuf,
    pub sheet: Option<String>,
    pub delimiter: Option<u8>,
    /// Overrides the reference column of the rules file.
    pub reference_column: Option<String>,
    pub errors_csv: Option<PathBuf>,
    /// File, or directory receiving a default-named file.
    pub annotated: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
    pub separator: u8,
}

/// Paths written by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub errors_csv: Option<PathBuf>,
    pub annotated: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub input: PathBuf,
    /// `None` when the source could not be read.
    pub sheet_name: Option<String>,
    pub rows: usize,
    pub rules: usize,
    pub errors: Vec<ValidationError>,
    pub error_rows: Vec<ErrorRow>,
    pub summary: ValidationSummary,
    pub outputs: WrittenOutputs,
}

impl RunOutcome {
    pub fn has_errors(&self) -> bool {
        !self.summary.is_success()
    }
}

pub fn load_rules(path: &Path) -> Result<RuleSet> {
    if !path.is_file() {
        bail!("rules file {} not found", path.display());
    }
    let store = RuleStore::open(path)?;
    store
        .compile()
        .with_context(|| format!("compile rules from {}", path.display()))
}

pub fn run_validation(options: &RunOptions) -> Result<RunOutcome> {
    let span = info_span!("validate", input = %options.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let rules = load_rules(&options.rules)?;
    let load_options = LoadOptions {
        sheet: options.sheet.clone(),
        delimiter: options.delimiter,
    };
    let (loaded, failure) = match load_table(&options.input, &load_options) {
        Ok(loaded) => (Some(loaded), None),
        Err(error) => {
            warn!(%error, "source could not be read");
            (None, Some(error))
        }
    };

    let empty = RowTable::new();
    let (table, errors) = match (&loaded, failure) {
        (Some(loaded), _) => (&loaded.table, RuleEngine::new().validate(&loaded.table, &rules)),
        (None, cause) => {
            let cause = cause.map_or_else(|| "unknown error".to_string(), |e| e.to_string());
            (&empty, vec![source_failure(cause)])
        }
    };

    let reference_column = options
        .reference_column
        .as_deref()
        .unwrap_or(&rules.reference_column);
    let error_rows = render_rows(&errors, table, reference_column);
    let summary = ValidationSummary::from_errors(&errors);
    let outputs = write_outputs(options, loaded.as_ref(), &errors, &error_rows, &summary)?;

    info!(
        rows = table.len(),
        rules = rules.len(),
        errors = errors.len(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunOutcome {
        input: options.input.clone(),
        sheet_name: loaded.as_ref().map(|loaded| loaded.sheet_name.clone()),
        rows: table.len(),
        rules: rules.len(),
        errors,
        error_rows,
        summary,
        outputs,
    })
}

fn write_outputs(
    options: &RunOptions,
    loaded: Option<&LoadedTable>,
    errors: &[ValidationError],
    error_rows: &[ErrorRow],
    summary: &ValidationSummary,
) -> Result<WrittenOutputs> {
    let mut outputs = WrittenOutputs::default();

    if let Some(path) = &options.errors_csv {
        export_csv(error_rows, path, options.separator)
            .with_context(|| format!("write error table {}", path.display()))?;
        outputs.errors_csv = Some(path.clone());
    }

    if let Some(target) = &options.annotated {
        match loaded {
            _ if errors.is_empty() => info!("no errors; highlighted copy not written"),
            Some(loaded) => {
                let path = if target.is_dir() {
                    default_annotation_path(target, &options.input)
                } else {
                    target.clone()
                };
                annotate_loaded(loaded, errors, &path)
                    .with_context(|| format!("write highlighted copy {}", path.display()))?;
                outputs.annotated = Some(path);
            }
            None => warn!("no highlighted copy for an unreadable source"),
        }
    }

    if let Some(path) = &options.report_json {
        let source = ReportSource::describe(
            &options.input,
            loaded.map(|loaded| loaded.sheet_name.as_str()),
        );
        JsonReport::new(source, summary, errors)
            .write(path)
            .with_context(|| format!("write report {}", path.display()))?;
        outputs.report_json = Some(path.clone());
    }

    Ok(outputs)
}
