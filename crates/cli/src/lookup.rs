//! `assetrec scan`, `by-location`, `by-filters`, `system-data`.

use std::path::PathBuf;

use assetrec_io::{load_record, save_record};
use assetrec_recon::{Reconciler, ScanOutcome};

use crate::{emit, CliError, Context};

pub fn cmd_scan(
    ctx: &Context,
    search_value: &str,
    company: Option<String>,
    location: Option<String>,
    record_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(store.as_ref());

    let mut record = record_path
        .as_deref()
        .map(load_record)
        .transpose()
        .map_err(CliError::record)?;

    // A record being counted supplies its own company and location.
    let company = company
        .or_else(|| record.as_ref().map(|r| r.company.clone()))
        .filter(|c| !c.trim().is_empty())
        .or_else(|| ctx.company(None));
    let location = location
        .or_else(|| record.as_ref().and_then(|r| r.location.clone()))
        .or_else(|| ctx.location(None));

    let snapshot =
        resolver.resolve_by_search_value(search_value, company.as_deref(), location.as_deref())?;

    let Some(snapshot) = snapshot else {
        eprintln!("Asset not found: {search_value}");
        return emit(&serde_json::json!({}));
    };

    if let (Some(record), Some(path)) = (record.as_mut(), record_path.as_deref()) {
        let outcome = record.apply_scan(&snapshot);
        Reconciler::new(store.as_ref()).validate(record)?;
        save_record(record, path).map_err(CliError::record)?;
        match outcome {
            ScanOutcome::Incremented {
                idx,
                physical_quantity,
            } => eprintln!(
                "{}: row {idx} now counted {physical_quantity}",
                snapshot.asset
            ),
            ScanOutcome::Inserted => eprintln!("{}: added to {}", snapshot.asset, path.display()),
        }
    } else {
        eprintln!("{} ({})", snapshot.asset, snapshot.asset_name);
    }

    emit(&snapshot)
}

pub fn cmd_by_location(
    ctx: &Context,
    location: &str,
    company: Option<String>,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(store.as_ref());

    let company = ctx.company(company);
    let assets = resolver.list_by_location(location, company.as_deref())?;
    eprintln!("{} assets at {location}", assets.len());
    emit(&assets)
}

pub fn cmd_by_filters(
    ctx: &Context,
    company: Option<String>,
    location: Option<String>,
    category: Option<String>,
    status: Option<String>,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(store.as_ref());

    let company = ctx.company(company);
    let assets = resolver.list_by_filters(
        company.as_deref(),
        location.as_deref(),
        category.as_deref(),
        status.as_deref(),
    )?;
    eprintln!("{} assets", assets.len());
    emit(&assets)
}

pub fn cmd_system_data(
    ctx: &Context,
    item_code: Option<String>,
    location: Option<String>,
    company: Option<String>,
    asset: Option<String>,
) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(store.as_ref());

    let company = ctx.company(company);
    let data = resolver.system_data(
        item_code.as_deref(),
        location.as_deref(),
        company.as_deref(),
        asset.as_deref(),
    )?;
    let Some(data) = data else {
        eprintln!("no item code or asset given");
        return emit(&serde_json::json!({}));
    };
    eprintln!("{} assets, value {:.2}", data.quantity, data.value);
    emit(&data)
}
