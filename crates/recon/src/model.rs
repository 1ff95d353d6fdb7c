use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::numeric;

// ---------------------------------------------------------------------------
// Asset register (read-only)
// ---------------------------------------------------------------------------

/// Document lifecycle state. Only submitted assets are finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    /// Integer code as stored in the asset table (0, 1, 2).
    pub fn code(self) -> i64 {
        match self {
            Self::Draft => 0,
            Self::Submitted => 1,
            Self::Cancelled => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Draft),
            1 => Some(Self::Submitted),
            2 => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A fixed asset as held by the book of record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Identifier.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub custodian: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub asset_category: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub cost_center: Option<String>,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default)]
    pub custom_barcode: Option<String>,
    #[serde(default)]
    pub gross_purchase_amount: f64,
    /// Depreciation booked before the asset entered the book.
    #[serde(default)]
    pub opening_accumulated_depreciation: f64,
    /// Stored depreciated value; may lag behind the live valuation.
    #[serde(default)]
    pub value_after_depreciation: f64,
    #[serde(default)]
    pub calculate_depreciation: bool,
    #[serde(default)]
    pub docstatus: DocStatus,
}

impl AssetRecord {
    pub fn is_submitted(&self) -> bool {
        self.docstatus == DocStatus::Submitted
    }

    /// Stored depreciated value, or gross purchase amount when that is zero.
    pub fn stored_value(&self) -> f64 {
        if self.value_after_depreciation != 0.0 {
            self.value_after_depreciation
        } else {
            self.gross_purchase_amount
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup results
// ---------------------------------------------------------------------------

/// Flat view of an asset returned by lookups, valued at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset: String,
    pub asset_name: String,
    pub location: String,
    pub value_after_depreciation: f64,
    pub gross_purchase_amount: f64,
    pub custodian: Option<String>,
    pub status: String,
    pub asset_category: String,
    pub department: Option<String>,
    pub cost_center: Option<String>,
    pub item_code: Option<String>,
}

impl AssetSnapshot {
    pub fn from_asset(asset: &AssetRecord, value_after_depreciation: f64) -> Self {
        Self {
            asset: asset.name.clone(),
            asset_name: asset.asset_name.clone(),
            location: asset.location.clone(),
            value_after_depreciation,
            gross_purchase_amount: asset.gross_purchase_amount,
            custodian: asset.custodian.clone(),
            status: asset.status.clone(),
            asset_category: asset.asset_category.clone(),
            department: asset.department.clone(),
            cost_center: asset.cost_center.clone(),
            item_code: asset.item_code.clone(),
        }
    }
}

/// System-side quantity and value for an item or asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    pub quantity: usize,
    pub value: f64,
    pub asset_category: String,
}

impl SystemData {
    pub fn empty() -> Self {
        Self {
            quantity: 0,
            value: 0.0,
            asset_category: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation record
// ---------------------------------------------------------------------------

/// One counted asset row. Quantity and value inputs are lenient; the
/// derived fields are recomputed on every validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_category: Option<String>,

    /// Quantity per the book of record. Absent means 1.
    #[serde(
        default,
        alias = "system_qty",
        deserialize_with = "numeric::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_quantity: Option<f64>,
    /// Counted quantity. Absent means 0.
    #[serde(
        default,
        alias = "reconcile_qty",
        alias = "physical_qty",
        alias = "physical_count",
        deserialize_with = "numeric::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub physical_quantity: Option<f64>,
    /// Cached unit value at the time of the first calculation pass.
    #[serde(
        default,
        deserialize_with = "numeric::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_after_depreciation: Option<f64>,
    #[serde(
        default,
        deserialize_with = "numeric::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub gross_purchase_amount: Option<f64>,

    #[serde(default, deserialize_with = "numeric::lenient_or_zero")]
    pub system_value: f64,
    #[serde(default, alias = "reconcile_value", deserialize_with = "numeric::lenient_or_zero")]
    pub physical_value: f64,
    #[serde(default, deserialize_with = "numeric::lenient_or_zero")]
    pub variance_value: f64,
    #[serde(default, alias = "variance_qty", deserialize_with = "numeric::lenient_or_zero")]
    pub variance: f64,
    #[serde(default, deserialize_with = "numeric::lenient_or_zero")]
    pub accumulated_depreciation: f64,
}

impl ReconcileLine {
    pub fn for_asset(asset: impl Into<String>) -> Self {
        Self {
            asset: Some(asset.into()),
            ..Self::default()
        }
    }

    /// Line pre-populated from a lookup: one expected, one counted, no variance.
    pub fn seeded(snapshot: &AssetSnapshot) -> Self {
        let value = snapshot.value_after_depreciation;
        Self {
            asset: Some(snapshot.asset.clone()),
            asset_name: Some(snapshot.asset_name.clone()),
            item_code: snapshot.item_code.clone(),
            location: Some(snapshot.location.clone()),
            asset_category: Some(snapshot.asset_category.clone()),
            system_quantity: Some(1.0),
            physical_quantity: Some(1.0),
            value_after_depreciation: Some(value),
            gross_purchase_amount: Some(snapshot.gross_purchase_amount),
            system_value: value,
            physical_value: value,
            variance_value: 0.0,
            variance: 0.0,
            accumulated_depreciation: snapshot.gross_purchase_amount - value,
        }
    }

    /// Asset identifier, or `None` for placeholder rows.
    pub fn asset_id(&self) -> Option<&str> {
        self.asset
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    pub fn system_quantity_or_default(&self) -> f64 {
        self.system_quantity.unwrap_or(1.0)
    }

    pub fn physical_quantity_or_default(&self) -> f64 {
        self.physical_quantity.unwrap_or(0.0)
    }

    /// Clear derived fields (used for placeholder rows).
    pub fn clear_derived(&mut self) {
        self.system_value = 0.0;
        self.physical_value = 0.0;
        self.variance_value = 0.0;
        self.variance = 0.0;
        self.accumulated_depreciation = 0.0;
    }
}

/// Outcome of applying a scanned asset to a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The asset already had a line; its counted quantity went up by one.
    Incremented { idx: usize, physical_quantity: f64 },
    /// A new line was inserted at the top of the table.
    Inserted,
}

/// A physical count session: header, lines and aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counted_by: Option<String>,
    #[serde(default, alias = "assets")]
    pub lines: Vec<ReconcileLine>,

    #[serde(default, deserialize_with = "numeric::lenient_or_zero")]
    pub total_system_value: f64,
    #[serde(default, alias = "total_reconcile_value", deserialize_with = "numeric::lenient_or_zero")]
    pub total_physical_value: f64,
    #[serde(default, deserialize_with = "numeric::lenient_or_zero")]
    pub total_variance_value: f64,
    #[serde(default, alias = "total_system_qty", deserialize_with = "numeric::lenient_or_zero")]
    pub total_system_quantity: f64,
    #[serde(default, alias = "total_reconcile_qty", deserialize_with = "numeric::lenient_or_zero")]
    pub total_physical_quantity: f64,
    #[serde(default, alias = "total_variance_qty", deserialize_with = "numeric::lenient_or_zero")]
    pub total_variance_quantity: f64,
}

impl ReconcileRecord {
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            ..Self::default()
        }
    }

    /// Position (1-based) of the line holding `asset`.
    pub fn find_line(&self, asset: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.asset_id() == Some(asset))
            .map(|pos| pos + 1)
    }

    /// Count one more unit of a scanned asset: bump its line, or insert a
    /// fresh line at the top when the asset is not on the record yet.
    pub fn apply_scan(&mut self, snapshot: &AssetSnapshot) -> ScanOutcome {
        if let Some(idx) = self.find_line(&snapshot.asset) {
            let line = &mut self.lines[idx - 1];
            let qty = line.physical_quantity_or_default() + 1.0;
            line.physical_quantity = Some(qty);
            return ScanOutcome::Incremented {
                idx,
                physical_quantity: qty,
            };
        }
        self.lines.insert(0, ReconcileLine::seeded(snapshot));
        ScanOutcome::Inserted
    }

    /// Replace all lines with one seeded line per snapshot.
    pub fn replace_lines(&mut self, snapshots: &[AssetSnapshot]) {
        self.lines = snapshots.iter().map(ReconcileLine::seeded).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(asset: &str, value: f64) -> AssetSnapshot {
        AssetSnapshot {
            asset: asset.into(),
            asset_name: format!("{asset} name"),
            location: "HQ".into(),
            value_after_depreciation: value,
            gross_purchase_amount: value * 2.0,
            custodian: None,
            status: "Submitted".into(),
            asset_category: "IT".into(),
            department: None,
            cost_center: None,
            item_code: Some("IT1".into()),
        }
    }

    #[test]
    fn docstatus_codes() {
        for status in [DocStatus::Draft, DocStatus::Submitted, DocStatus::Cancelled] {
            assert_eq!(DocStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(DocStatus::from_code(7), None);
    }

    #[test]
    fn stored_value_falls_back_to_gross() {
        let mut asset = AssetRecord {
            gross_purchase_amount: 900.0,
            ..AssetRecord::default()
        };
        assert_eq!(asset.stored_value(), 900.0);
        asset.value_after_depreciation = 400.0;
        assert_eq!(asset.stored_value(), 400.0);
    }

    #[test]
    fn blank_asset_is_placeholder() {
        let mut line = ReconcileLine::for_asset("  ");
        assert_eq!(line.asset_id(), None);
        line.asset = None;
        assert_eq!(line.asset_id(), None);
        assert_eq!(ReconcileLine::for_asset(" A1 ").asset_id(), Some("A1"));
    }

    #[test]
    fn quantity_defaults() {
        let line = ReconcileLine::for_asset("A1");
        assert_eq!(line.system_quantity_or_default(), 1.0);
        assert_eq!(line.physical_quantity_or_default(), 0.0);
    }

    #[test]
    fn scan_inserts_at_top_then_increments() {
        let mut record = ReconcileRecord::new("REC-1", "C1");
        record.lines.push(ReconcileLine::for_asset("A0"));

        assert_eq!(record.apply_scan(&snapshot("A1", 100.0)), ScanOutcome::Inserted);
        assert_eq!(record.lines[0].asset_id(), Some("A1"));
        assert_eq!(record.lines[0].physical_quantity, Some(1.0));
        assert_eq!(record.lines[0].system_quantity, Some(1.0));

        let outcome = record.apply_scan(&snapshot("A1", 100.0));
        assert_eq!(
            outcome,
            ScanOutcome::Incremented {
                idx: 1,
                physical_quantity: 2.0
            }
        );
        assert_eq!(record.lines.len(), 2);
    }

    #[test]
    fn seeded_line_has_no_variance() {
        let line = ReconcileLine::seeded(&snapshot("A1", 250.0));
        assert_eq!(line.system_value, 250.0);
        assert_eq!(line.physical_value, 250.0);
        assert_eq!(line.variance, 0.0);
        assert_eq!(line.variance_value, 0.0);
        assert_eq!(line.accumulated_depreciation, 250.0);
    }

    #[test]
    fn record_accepts_legacy_field_names() {
        let json = r#"{
            "name": "REC-9",
            "company": "C1",
            "assets": [
                {"asset": "A1", "system_qty": "1", "reconcile_qty": "", "value_after_depreciation": "1,000"},
                {"asset": "A2", "physical_count": "abc"}
            ]
        }"#;
        let record: ReconcileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.lines.len(), 2);
        assert_eq!(record.lines[0].system_quantity, Some(1.0));
        assert_eq!(record.lines[0].physical_quantity, None);
        assert_eq!(record.lines[0].value_after_depreciation, Some(1000.0));
        assert_eq!(record.lines[1].physical_quantity, Some(0.0));
    }
}
