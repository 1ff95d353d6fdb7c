// Configuration loading

pub mod settings;

pub use settings::{Defaults, LookupSettings, Settings, SettingsError, StoreSettings};
