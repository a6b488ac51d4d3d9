//! Format-agnostic plugin metadata.
//!
//! Identity that a host shows to users lives here as a `const` builder so it
//! can sit in a `static`. Format-specific identity (class UIDs) is kept in
//! the adapter crate.
//!
//! ```ignore
//! pub static CONFIG: PluginConfig = PluginConfig::new("FogPad")
//!     .with_vendor("igorski.nl")
//!     .with_sub_categories("Fx|Reverb|Delay");
//! ```

#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Name shown in the host's plugin list.
    pub name: &'static str,
    pub vendor: &'static str,
    pub url: &'static str,
    pub version: &'static str,
    /// Pipe-separated host categories, e.g. "Fx|Reverb".
    pub sub_categories: &'static str,
}

impl PluginConfig {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            vendor: "Unknown Vendor",
            url: "",
            version: "0.0.0",
            sub_categories: "Fx",
        }
    }

    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    pub const fn with_url(mut self, url: &'static str) -> Self {
        self.url = url;
        self
    }

    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    pub const fn with_sub_categories(mut self, sub_categories: &'static str) -> Self {
        self.sub_categories = sub_categories;
        self
    }
}
