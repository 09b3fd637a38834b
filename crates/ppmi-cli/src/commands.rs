//! Command implementations.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::info;

use ppmi_core::assemble::TieBreak;
use ppmi_core::pipeline::{PipelineOptions, derive_behavior};
use ppmi_core::{available_biospecimen, available_datscan};
use ppmi_ingest::{list_source_files, resolve_data_dir};
use ppmi_registry::MeasureRegistry;

use crate::cli::{BehaviorArgs, BiospecimenArgs, DatscanArgs, DemographicsArgs, MeasuresArgs};
use crate::types::DeriveResult;

fn selection(measures: &[String]) -> Option<&[String]> {
    if measures.is_empty() {
        None
    } else {
        Some(measures)
    }
}

fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("create output file: {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("write csv: {}", path.display()))?;
    Ok(())
}

pub fn run_behavior(args: &BehaviorArgs) -> Result<DeriveResult> {
    let dir = resolve_data_dir(args.data.data_dir.as_deref(), &[])?;
    let registry = MeasureRegistry::standard()?;
    let options = PipelineOptions {
        tie_break: if args.mean_tie_break {
            TieBreak::Mean
        } else {
            TieBreak::Error
        },
    };

    let mut outcome = derive_behavior(
        &dir,
        &registry,
        selection(&args.data.measures),
        &options,
    )?;
    write_csv(&mut outcome.wide, &args.data.output)?;
    if let Some(long_path) = &args.long_output {
        write_csv(&mut outcome.long, long_path)?;
    }
    info!(
        rows = outcome.wide.height(),
        measures = outcome.derived.len(),
        "behavior table written"
    );

    Ok(DeriveResult {
        table: "behavior".to_string(),
        output: args.data.output.clone(),
        long_output: args.long_output.clone(),
        rows: outcome.wide.height(),
        columns: outcome.wide.width(),
        derived: outcome.derived,
        skipped: outcome.skipped,
    })
}

pub fn run_biospecimen(args: &BiospecimenArgs) -> Result<DeriveResult> {
    let dir = resolve_data_dir(args.data.data_dir.as_deref(), &[])?;
    let everything;
    let measures = if args.all {
        everything = available_biospecimen(&dir)?;
        Some(everything.as_slice())
    } else {
        selection(&args.data.measures)
    };

    let mut wide = ppmi_core::load_biospecimen(&dir, measures)?;
    write_csv(&mut wide, &args.data.output)?;

    Ok(frame_result("biospecimen", &wide, &args.data.output))
}

pub fn run_datscan(args: &DatscanArgs) -> Result<DeriveResult> {
    let dir = resolve_data_dir(args.data.data_dir.as_deref(), &[])?;
    let mut wide = ppmi_core::load_datscan(&dir, selection(&args.data.measures))?;
    write_csv(&mut wide, &args.data.output)?;

    Ok(frame_result("datscan", &wide, &args.data.output))
}

pub fn run_demographics(args: &DemographicsArgs) -> Result<DeriveResult> {
    let dir = resolve_data_dir(args.data.data_dir.as_deref(), &[])?;
    let registry = MeasureRegistry::standard()?;
    let outcome = ppmi_core::derive_demographics(
        &dir,
        &registry,
        selection(&args.data.measures),
    )?;

    let mut frame = outcome.frame;
    write_csv(&mut frame, &args.data.output)?;

    let mut result = frame_result("demographics", &frame, &args.data.output);
    result.skipped = outcome
        .skipped
        .into_iter()
        .map(|(name, reason)| ppmi_core::pipeline::SkippedMeasure { name, reason })
        .collect();
    Ok(result)
}

fn frame_result(table: &str, frame: &DataFrame, output: &Path) -> DeriveResult {
    DeriveResult {
        table: table.to_string(),
        output: output.to_path_buf(),
        long_output: None,
        rows: frame.height(),
        columns: frame.width(),
        derived: Vec::new(),
        skipped: Vec::new(),
    }
}

/// Catalog listing plus, when an export directory is at hand, the assays
/// and scan measures actually present in it.
pub fn run_measures(args: &MeasuresArgs) -> Result<()> {
    let registry = MeasureRegistry::standard()?;
    crate::summary::print_catalog(&registry);

    if let Some(dir) = &args.data_dir {
        let files = list_source_files(dir)?;
        println!("Export files found: {}", files.len());
        match available_biospecimen(dir) {
            Ok(assays) => crate::summary::print_export_measures("Biospecimen assays", &assays),
            Err(error) => println!("Biospecimen assays: unavailable ({error})"),
        }
        match available_datscan(dir) {
            Ok(measures) => crate::summary::print_export_measures("DaT-scan measures", &measures),
            Err(error) => println!("DaT-scan measures: unavailable ({error})"),
        }
    }
    Ok(())
}
