use crate::error::ReconError;
use crate::model::{AssetRecord, AssetSnapshot, SystemData};
use crate::store::{given, AssetFilter, AssetStore, StatusFilter, Valuation};

/// Statuses excluded from listings unless a status is asked for explicitly.
pub const DISPOSED_STATUSES: [&str; 3] = ["Sold", "Scrapped", "Capitalized"];

/// Which lookup produced the candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    CustomBarcode,
    Identifier,
    ItemBarcode,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomBarcode => write!(f, "custom_barcode"),
            Self::Identifier => write!(f, "identifier"),
            Self::ItemBarcode => write!(f, "item_barcode"),
        }
    }
}

/// Asset lookups for scanning and bulk reconciliation.
pub struct AssetResolver<'s, S: AssetStore + ?Sized> {
    store: &'s S,
    excluded_statuses: Vec<String>,
}

impl<'s, S: AssetStore + ?Sized> AssetResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            excluded_statuses: DISPOSED_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the statuses hidden from unfiltered listings.
    pub fn with_excluded_statuses(mut self, statuses: Vec<String>) -> Self {
        self.excluded_statuses = statuses;
        self
    }

    /// Resolve a scanned or typed value to one asset.
    ///
    /// Strategies run in order and stop at the first hit: custom barcode,
    /// identifier, then item barcode. The company/location filters are then
    /// applied to the candidate; a mismatch is a miss, it does not fall
    /// through to the next strategy.
    pub fn resolve_by_search_value(
        &self,
        search_value: &str,
        company: Option<&str>,
        location: Option<&str>,
    ) -> Result<Option<AssetSnapshot>, ReconError> {
        let search_value = search_value.trim();
        if search_value.is_empty() {
            return Ok(None);
        }

        let Some((strategy, name)) = self.resolve_identifier(search_value, company, location)?
        else {
            log::debug!("no asset matches '{search_value}'");
            return Ok(None);
        };
        log::debug!("'{search_value}' resolved to asset '{name}' by {strategy}");

        self.dereference(&name, company, location)
    }

    fn resolve_identifier(
        &self,
        search_value: &str,
        company: Option<&str>,
        location: Option<&str>,
    ) -> Result<Option<(MatchStrategy, String)>, ReconError> {
        if self.store.has_custom_barcode_field()? {
            let filter = AssetFilter::submitted().custom_barcode(Some(search_value));
            if let Some(asset) = self.store.find_first(&filter)? {
                return Ok(Some((MatchStrategy::CustomBarcode, asset.name)));
            }
        }

        let filter = AssetFilter::submitted().name(Some(search_value));
        if let Some(asset) = self.store.find_first(&filter)? {
            return Ok(Some((MatchStrategy::Identifier, asset.name)));
        }

        if let Some(item_code) = self.store.item_code_for_barcode(search_value)? {
            let filter = AssetFilter::submitted()
                .item_code(Some(&item_code))
                .company(company)
                .location(location);
            if let Some(asset) = self.store.find_first(&filter)? {
                return Ok(Some((MatchStrategy::ItemBarcode, asset.name)));
            }
        }

        Ok(None)
    }

    /// Load `name` and value it, or `None` when it is missing or fails the
    /// company/location filters.
    pub fn dereference(
        &self,
        name: &str,
        company: Option<&str>,
        location: Option<&str>,
    ) -> Result<Option<AssetSnapshot>, ReconError> {
        let Some(asset) = self.store.get(name)? else {
            return Ok(None);
        };
        if given(company).is_some_and(|c| c != asset.company) {
            return Ok(None);
        }
        if given(location).is_some_and(|l| l != asset.location) {
            return Ok(None);
        }

        let value = self.store.valuation().current_value(&asset)?;
        Ok(Some(AssetSnapshot::from_asset(&asset, value)))
    }

    /// Submitted assets of `company`, ordered by display name.
    ///
    /// Without an explicit `status`, disposed assets are left out.
    pub fn list_by_filters(
        &self,
        company: Option<&str>,
        location: Option<&str>,
        asset_category: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<AssetSnapshot>, ReconError> {
        let company = given(company).ok_or(ReconError::MissingCompany)?;

        let status = match given(status) {
            Some(s) => StatusFilter::Is(s.to_string()),
            None => StatusFilter::NotIn(self.excluded_statuses.clone()),
        };
        let filter = AssetFilter::submitted()
            .company(Some(company))
            .location(location)
            .asset_category(asset_category)
            .status(status);

        let assets = self.store.find(&filter)?;
        log::debug!("{} assets listed for company '{company}'", assets.len());

        let valuation = self.store.valuation();
        assets
            .iter()
            .map(|asset| {
                let value = listing_value(asset, valuation)?;
                Ok(AssetSnapshot::from_asset(asset, value))
            })
            .collect()
    }

    pub fn list_by_location(
        &self,
        location: &str,
        company: Option<&str>,
    ) -> Result<Vec<AssetSnapshot>, ReconError> {
        self.list_by_filters(company, Some(location), None, None)
    }

    /// Count and total value of submitted assets for an asset or item code.
    ///
    /// `None` when neither `item_code` nor `asset` is given. The location
    /// only constrains item code lookups.
    pub fn system_data(
        &self,
        item_code: Option<&str>,
        location: Option<&str>,
        company: Option<&str>,
        asset: Option<&str>,
    ) -> Result<Option<SystemData>, ReconError> {
        let asset = given(asset);
        let item_code = given(item_code);
        if asset.is_none() && item_code.is_none() {
            return Ok(None);
        }

        let mut filter = AssetFilter::submitted().company(company);
        filter = match asset {
            Some(name) => filter.name(Some(name)),
            None => filter.item_code(item_code).location(location),
        };

        let assets = self.store.find(&filter)?;
        let Some(first) = assets.first() else {
            return Ok(Some(SystemData::empty()));
        };

        let valuation = self.store.valuation();
        let mut value = 0.0;
        for a in &assets {
            value += valuation.current_value(a)?;
        }

        Ok(Some(SystemData {
            quantity: assets.len(),
            value,
            asset_category: first.asset_category.clone(),
        }))
    }
}

/// Listing value: live valuation for depreciating assets, then the stored
/// value, with gross purchase amount when that comes out as zero.
fn listing_value(asset: &AssetRecord, valuation: Valuation<'_>) -> Result<f64, ReconError> {
    let mut value = asset.value_after_depreciation;
    if asset.calculate_depreciation {
        if let Valuation::Live(live) = valuation {
            value = live.value_after_depreciation(asset)?;
        }
    }
    if value == 0.0 {
        value = asset.gross_purchase_amount;
    }
    Ok(value)
}
