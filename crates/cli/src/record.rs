//! `assetrec reconcile` and `assetrec fetch` - work on record files.

use std::path::{Path, PathBuf};

use assetrec_io::{load_record, save_record};
use assetrec_recon::{ReconcileRecord, Reconciler};

use crate::{emit, CliError, Context};

pub fn cmd_reconcile(
    ctx: &Context,
    record_path: &Path,
    output: Option<PathBuf>,
    in_place: bool,
) -> Result<(), CliError> {
    let mut record = load_record(record_path).map_err(CliError::record)?;
    let store = ctx.open_store()?;

    Reconciler::new(store.as_ref()).validate(&mut record)?;

    let target = if in_place { Some(record_path.to_path_buf()) } else { output };
    if let Some(ref path) = target {
        save_record(&record, path).map_err(CliError::record)?;
        eprintln!("wrote {}", path.display());
    }

    print_summary(&record);
    emit(&record)
}

pub fn cmd_fetch(
    ctx: &Context,
    record_path: &Path,
    location: Option<String>,
    category: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut record = load_record(record_path).map_err(CliError::record)?;
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(store.as_ref());

    let location = location.or_else(|| record.location.clone());
    let snapshots = resolver.list_by_filters(
        Some(&record.company),
        location.as_deref(),
        category.as_deref(),
        None,
    )?;
    record.replace_lines(&snapshots);
    Reconciler::new(store.as_ref()).validate(&mut record)?;

    let target = output.unwrap_or_else(|| record_path.to_path_buf());
    save_record(&record, &target).map_err(CliError::record)?;
    eprintln!("{} assets fetched into {}", record.lines.len(), target.display());

    emit(&record)
}

fn print_summary(record: &ReconcileRecord) {
    eprintln!(
        "{} lines: system {:.2} ({} units), physical {:.2} ({} units), variance {:.2}",
        record.lines.len(),
        record.total_system_value,
        record.total_system_quantity,
        record.total_physical_value,
        record.total_physical_quantity,
        record.total_variance_value,
    );
}
