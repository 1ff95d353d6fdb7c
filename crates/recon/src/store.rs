use crate::error::StoreError;
use crate::model::AssetRecord;

// ---------------------------------------------------------------------------
// Valuation capability
// ---------------------------------------------------------------------------

/// Depreciation-aware valuation provided by the asset book.
pub trait LiveValuation {
    /// Current value of `asset` after booked depreciation.
    fn value_after_depreciation(&self, asset: &AssetRecord) -> Result<f64, StoreError>;
}

/// How a store can value its assets.
#[derive(Clone, Copy)]
pub enum Valuation<'a> {
    /// Live depreciation-aware valuation is available.
    Live(&'a dyn LiveValuation),
    /// Only the stored depreciated value and gross purchase amount exist.
    Static,
}

impl Valuation<'_> {
    /// Current value: live when available, otherwise the stored depreciated
    /// value, otherwise gross purchase amount.
    pub fn current_value(&self, asset: &AssetRecord) -> Result<f64, StoreError> {
        match self {
            Self::Live(live) => live.value_after_depreciation(asset),
            Self::Static => Ok(asset.stored_value()),
        }
    }
}

impl std::fmt::Debug for Valuation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(_) => write!(f, "Valuation::Live"),
            Self::Static => write!(f, "Valuation::Static"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Any,
    Is(String),
    NotIn(Vec<String>),
}

impl StatusFilter {
    pub fn matches(&self, status: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Is(s) => s == status,
            Self::NotIn(excluded) => !excluded.iter().any(|s| s == status),
        }
    }
}

/// Conjunction of equality conditions on the asset table. `None` fields are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub name: Option<String>,
    pub custom_barcode: Option<String>,
    pub item_code: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub asset_category: Option<String>,
    pub status: StatusFilter,
    pub submitted_only: bool,
}

/// Treat blank strings as "not given", the way the lookup entry points do.
pub fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl AssetFilter {
    /// Filter restricted to finalized (submitted) assets.
    pub fn submitted() -> Self {
        Self {
            submitted_only: true,
            ..Self::default()
        }
    }

    pub fn name(mut self, value: Option<&str>) -> Self {
        self.name = given(value).map(str::to_string);
        self
    }

    pub fn custom_barcode(mut self, value: Option<&str>) -> Self {
        self.custom_barcode = given(value).map(str::to_string);
        self
    }

    pub fn item_code(mut self, value: Option<&str>) -> Self {
        self.item_code = given(value).map(str::to_string);
        self
    }

    pub fn company(mut self, value: Option<&str>) -> Self {
        self.company = given(value).map(str::to_string);
        self
    }

    pub fn location(mut self, value: Option<&str>) -> Self {
        self.location = given(value).map(str::to_string);
        self
    }

    pub fn asset_category(mut self, value: Option<&str>) -> Self {
        self.asset_category = given(value).map(str::to_string);
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, asset: &AssetRecord) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        fn eq_opt(want: &Option<String>, have: &Option<String>) -> bool {
            want.as_deref().map_or(true, |w| have.as_deref() == Some(w))
        }

        (!self.submitted_only || asset.is_submitted())
            && eq(&self.name, &asset.name)
            && eq_opt(&self.custom_barcode, &asset.custom_barcode)
            && eq_opt(&self.item_code, &asset.item_code)
            && eq(&self.company, &asset.company)
            && eq(&self.location, &asset.location)
            && eq(&self.asset_category, &asset.asset_category)
            && self.status.matches(&asset.status)
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Read access to the asset book of record.
pub trait AssetStore {
    /// Whether assets carry the optional custom barcode field.
    fn has_custom_barcode_field(&self) -> Result<bool, StoreError>;

    /// Load one asset by identifier, regardless of document status.
    fn get(&self, name: &str) -> Result<Option<AssetRecord>, StoreError>;

    /// All assets matching `filter`, ordered by display name then identifier.
    fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, StoreError>;

    /// First asset matching `filter`.
    fn find_first(&self, filter: &AssetFilter) -> Result<Option<AssetRecord>, StoreError> {
        Ok(self.find(filter)?.into_iter().next())
    }

    /// Item code owning `barcode` in the item barcode table.
    fn item_code_for_barcode(&self, barcode: &str) -> Result<Option<String>, StoreError>;

    fn valuation(&self) -> Valuation<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocStatus;

    fn asset() -> AssetRecord {
        AssetRecord {
            name: "A1".into(),
            asset_name: "Laptop".into(),
            company: "C1".into(),
            location: "HQ".into(),
            status: "Submitted".into(),
            asset_category: "IT".into(),
            item_code: Some("IT1".into()),
            docstatus: DocStatus::Submitted,
            ..AssetRecord::default()
        }
    }

    #[test]
    fn blank_conditions_are_ignored() {
        let filter = AssetFilter::submitted()
            .company(Some(""))
            .location(Some("  "))
            .item_code(None);
        assert_eq!(filter, AssetFilter::submitted());
        assert!(filter.matches(&asset()));
    }

    #[test]
    fn each_condition_constrains() {
        let a = asset();
        assert!(AssetFilter::default().company(Some("C1")).matches(&a));
        assert!(!AssetFilter::default().company(Some("C2")).matches(&a));
        assert!(!AssetFilter::default().location(Some("Depot")).matches(&a));
        assert!(!AssetFilter::default().item_code(Some("IT2")).matches(&a));
        assert!(!AssetFilter::default().custom_barcode(Some("BC")).matches(&a));
        assert!(AssetFilter::default().asset_category(Some("IT")).matches(&a));
    }

    #[test]
    fn submitted_only_rejects_drafts() {
        let mut a = asset();
        a.docstatus = DocStatus::Draft;
        assert!(!AssetFilter::submitted().matches(&a));
        assert!(AssetFilter::default().matches(&a));
    }

    #[test]
    fn status_filters() {
        let excluded = StatusFilter::NotIn(vec!["Sold".into(), "Scrapped".into()]);
        assert!(excluded.matches("Submitted"));
        assert!(!excluded.matches("Sold"));
        assert!(StatusFilter::Is("Sold".into()).matches("Sold"));
        assert!(!StatusFilter::Is("Sold".into()).matches("Scrapped"));
        assert!(StatusFilter::Any.matches("anything"));
    }

    #[test]
    fn static_valuation_uses_stored_value() {
        let mut a = asset();
        a.gross_purchase_amount = 1200.0;
        assert_eq!(Valuation::Static.current_value(&a).unwrap(), 1200.0);
        a.value_after_depreciation = 800.0;
        assert_eq!(Valuation::Static.current_value(&a).unwrap(), 800.0);
    }
}
