//! `assetrec import` - load a register export into a SQLite asset store.

use std::path::{Path, PathBuf};

use serde::Serialize;

use assetrec_io::csv::{read_depreciation_entries, read_register, read_sibling_barcodes};
use assetrec_io::{SqliteAssetStore, StoreKind};

use crate::{emit, CliError, Context};

#[derive(Debug, Serialize)]
struct ImportSummary {
    store: PathBuf,
    assets: usize,
    item_barcodes: usize,
    depreciation_entries: usize,
}

pub fn cmd_import(
    ctx: &Context,
    register_path: &Path,
    depreciation: Option<PathBuf>,
) -> Result<(), CliError> {
    let target = ctx.store_path()?;
    if StoreKind::for_path(target) != StoreKind::Sqlite {
        return Err(CliError::usage(format!(
            "cannot import into {}: target must be a SQLite database",
            target.display()
        ))
        .with_hint("pass --store <file>.sqlite"));
    }

    let register = read_register(register_path).map_err(CliError::store)?;
    let barcodes = read_sibling_barcodes(register_path).map_err(CliError::store)?;
    let entries = depreciation
        .as_deref()
        .map(read_depreciation_entries)
        .transpose()
        .map_err(CliError::store)?
        .unwrap_or_default();

    let mut store = SqliteAssetStore::open(target).map_err(CliError::store)?;
    store
        .import_register(&register, &barcodes, &entries)
        .map_err(CliError::store)?;
    let assets = register.assets.len();

    eprintln!(
        "imported {assets} assets, {} item barcodes, {} depreciation entries into {}",
        barcodes.len(),
        entries.len(),
        target.display()
    );
    emit(&ImportSummary {
        store: target.to_path_buf(),
        assets,
        item_barcodes: barcodes.len(),
        depreciation_entries: entries.len(),
    })
}
