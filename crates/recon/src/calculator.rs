use std::collections::HashSet;

use crate::error::ReconError;
use crate::model::{ReconcileLine, ReconcileRecord};
use crate::store::AssetStore;

/// Reject records that list the same asset twice. Placeholder rows (no
/// asset) are skipped. Reports the 1-based row of the repeat.
pub fn validate_items(lines: &[ReconcileLine]) -> Result<(), ReconError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for (pos, line) in lines.iter().enumerate() {
        let Some(asset) = line.asset_id() else {
            continue;
        };
        if !seen.insert(asset) {
            return Err(ReconError::DuplicateAsset {
                asset: asset.to_string(),
                idx: pos + 1,
            });
        }
    }
    Ok(())
}

/// Recompute the derived fields of one line from its cached value and
/// quantities.
pub fn compute_line(line: &mut ReconcileLine) {
    let value = line.value_after_depreciation.unwrap_or(0.0);
    let gross = line.gross_purchase_amount.unwrap_or(0.0);
    let physical_qty = line.physical_quantity_or_default();
    let system_qty = line.system_quantity_or_default();

    line.system_value = value * system_qty;
    line.physical_value = value * physical_qty;
    line.variance_value = line.physical_value - line.system_value;
    line.variance = physical_qty - system_qty;
    line.accumulated_depreciation = gross - value;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Totals {
    system_value: f64,
    physical_value: f64,
    system_quantity: f64,
    physical_quantity: f64,
}

impl Totals {
    fn add(&mut self, line: &ReconcileLine) {
        self.system_value += line.system_value;
        self.physical_value += line.physical_value;
        self.system_quantity += line.system_quantity_or_default();
        self.physical_quantity += line.physical_quantity_or_default();
    }

    fn write_to(self, record: &mut ReconcileRecord) {
        record.total_system_value = self.system_value;
        record.total_physical_value = self.physical_value;
        record.total_variance_value = self.physical_value - self.system_value;
        record.total_system_quantity = self.system_quantity;
        record.total_physical_quantity = self.physical_quantity;
        record.total_variance_quantity = self.physical_quantity - self.system_quantity;
    }
}

/// Pre-save validation for reconciliation records.
pub struct Reconciler<'s, S: AssetStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: AssetStore + ?Sized> Reconciler<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// The pre-save hook: duplicate check first, then totals.
    pub fn validate(&self, record: &mut ReconcileRecord) -> Result<(), ReconError> {
        validate_items(&record.lines)?;
        self.calculate_totals(record)?;
        log::debug!(
            "record '{}': {} lines, system {:.2}, physical {:.2}, variance {:.2}",
            record.name,
            record.lines.len(),
            record.total_system_value,
            record.total_physical_value,
            record.total_variance_value,
        );
        Ok(())
    }

    /// Recompute every line and roll the results up onto the record.
    ///
    /// Lines without a cached value fetch it from the store once; the value
    /// and gross purchase amount are cached on the line so later passes do
    /// not query again. All fetches happen before the record is touched, so
    /// a store failure leaves it unchanged.
    pub fn calculate_totals(&self, record: &mut ReconcileRecord) -> Result<(), ReconError> {
        let mut fetched = Vec::new();
        for (idx, line) in record.lines.iter().enumerate() {
            let Some(name) = line.asset_id() else {
                continue;
            };
            if line.value_after_depreciation.unwrap_or(0.0) != 0.0 {
                continue;
            }
            if let Some(found) = self.fetch_value(name)? {
                fetched.push((idx, found));
            }
        }

        for (idx, (value, gross)) in fetched {
            let line = &mut record.lines[idx];
            line.value_after_depreciation = Some(value);
            line.gross_purchase_amount = Some(gross);
        }

        let mut totals = Totals::default();
        for line in &mut record.lines {
            if line.asset_id().is_none() {
                line.clear_derived();
                continue;
            }
            compute_line(line);
            totals.add(line);
        }
        totals.write_to(record);
        Ok(())
    }

    /// Current value and gross purchase amount of `name`, if the store knows it.
    fn fetch_value(&self, name: &str) -> Result<Option<(f64, f64)>, ReconError> {
        let Some(asset) = self.store.get(name)? else {
            log::debug!("asset '{name}' not found; leaving value empty");
            return Ok(None);
        };
        let value = self.store.valuation().current_value(&asset)?;
        Ok(Some((value, asset.gross_purchase_amount)))
    }
}
