use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;
use crate::model::AssetRecord;
use crate::store::{AssetFilter, AssetStore, LiveValuation, Valuation};

/// Live values keyed by asset identifier. Assets without an entry are valued
/// at their stored value.
#[derive(Debug, Default, Clone)]
pub struct LiveValueTable {
    values: HashMap<String, f64>,
}

impl LiveValuation for LiveValueTable {
    fn value_after_depreciation(&self, asset: &AssetRecord) -> Result<f64, StoreError> {
        Ok(self
            .values
            .get(&asset.name)
            .copied()
            .unwrap_or_else(|| asset.stored_value()))
    }
}

/// In-memory asset book. Backs tests and CSV-loaded registers.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetStore {
    assets: BTreeMap<String, AssetRecord>,
    item_barcodes: HashMap<String, String>,
    custom_barcode_field: bool,
    live: Option<LiveValueTable>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that assets carry a custom barcode field.
    pub fn with_custom_barcode_field(mut self) -> Self {
        self.custom_barcode_field = true;
        self
    }

    pub fn with_asset(mut self, asset: AssetRecord) -> Self {
        self.insert(asset);
        self
    }

    pub fn with_item_barcode(mut self, barcode: &str, item_code: &str) -> Self {
        self.add_item_barcode(barcode, item_code);
        self
    }

    /// Register a live value for `asset`. The first call switches the store
    /// to live valuation.
    pub fn with_live_value(mut self, asset: &str, value: f64) -> Self {
        self.live
            .get_or_insert_with(LiveValueTable::default)
            .values
            .insert(asset.to_string(), value);
        self
    }

    pub fn set_custom_barcode_field(&mut self, enabled: bool) {
        self.custom_barcode_field = enabled;
    }

    /// Insert or replace an asset.
    pub fn insert(&mut self, asset: AssetRecord) {
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn add_item_barcode(&mut self, barcode: &str, item_code: &str) {
        self.item_barcodes
            .insert(barcode.to_string(), item_code.to_string());
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn has_custom_barcode_field(&self) -> Result<bool, StoreError> {
        Ok(self.custom_barcode_field)
    }

    fn get(&self, name: &str) -> Result<Option<AssetRecord>, StoreError> {
        Ok(self.assets.get(name).cloned())
    }

    fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, StoreError> {
        let mut found: Vec<AssetRecord> = self
            .assets
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        // BTreeMap iteration already orders by identifier; stable sort keeps it.
        found.sort_by(|a, b| a.asset_name.cmp(&b.asset_name));
        Ok(found)
    }

    fn item_code_for_barcode(&self, barcode: &str) -> Result<Option<String>, StoreError> {
        Ok(self.item_barcodes.get(barcode).cloned())
    }

    fn valuation(&self) -> Valuation<'_> {
        match &self.live {
            Some(table) => Valuation::Live(table),
            None => Valuation::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocStatus;

    fn asset(name: &str, display: &str) -> AssetRecord {
        AssetRecord {
            name: name.into(),
            asset_name: display.into(),
            company: "C1".into(),
            docstatus: DocStatus::Submitted,
            gross_purchase_amount: 100.0,
            ..AssetRecord::default()
        }
    }

    #[test]
    fn find_orders_by_display_name_then_identifier() {
        let store = MemoryAssetStore::new()
            .with_asset(asset("A3", "Chair"))
            .with_asset(asset("A2", "Bench"))
            .with_asset(asset("A1", "Chair"));
        let names: Vec<_> = store
            .find(&AssetFilter::submitted())
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["A2", "A1", "A3"]);
    }

    #[test]
    fn insert_replaces_existing() {
        let mut store = MemoryAssetStore::new().with_asset(asset("A1", "Old"));
        store.insert(asset("A1", "New"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A1").unwrap().unwrap().asset_name, "New");
    }

    #[test]
    fn valuation_switches_to_live() {
        let store = MemoryAssetStore::new().with_asset(asset("A1", "Desk"));
        assert!(matches!(store.valuation(), Valuation::Static));

        let store = store.with_live_value("A1", 42.0);
        let a = store.get("A1").unwrap().unwrap();
        assert_eq!(store.valuation().current_value(&a).unwrap(), 42.0);

        let other = asset("A9", "Lamp");
        assert_eq!(store.valuation().current_value(&other).unwrap(), 100.0);
    }

    #[test]
    fn item_barcodes_resolve() {
        let store = MemoryAssetStore::new().with_item_barcode("BC1", "IT1");
        assert_eq!(store.item_code_for_barcode("BC1").unwrap().as_deref(), Some("IT1"));
        assert_eq!(store.item_code_for_barcode("BC2").unwrap(), None);
    }
}
