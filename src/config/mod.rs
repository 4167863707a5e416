//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::landing::{ASSET_NAME, LandingConfig};
use crate::application::listings::{ListingImageConfig, RESULT_PAGE_SIZE};
use crate::application::topbar::{LatLng, LatLngBounds, MainSearchType, SearchConfig};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storefront";
const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_CAROUSEL_COLUMNS: u64 = 2;
const MAX_CAROUSEL_COLUMNS: u64 = 4;

/// Command-line arguments for the storefront binary.
#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Compose marketplace storefront pages from hosted assets"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STOREFRONT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a content page; the landing page when no asset is named.
    Compose(ComposeArgs),
    /// Render the site footer.
    Footer(FooterArgs),
    /// Render the mobile navigation menu.
    #[command(name = "mobile-menu")]
    MobileMenu(MobileMenuArgs),
    /// Render the signed-in user's profile menu.
    #[command(name = "profile-menu")]
    ProfileMenu(ProfileMenuArgs),
    /// Print the search page URL for a topbar search submission.
    #[command(name = "search-url")]
    SearchUrl(SearchUrlArgs),
}

impl Command {
    pub fn overrides(&self) -> &CommonOverrides {
        match self {
            Command::Compose(args) => &args.overrides,
            Command::Footer(args) => &args.overrides,
            Command::MobileMenu(args) => &args.overrides,
            Command::ProfileMenu(args) => &args.overrides,
            Command::SearchUrl(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct ComposeArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Hosted page asset to render (e.g. `about`); defaults to the landing page.
    #[arg(long, value_name = "NAME")]
    pub asset: Option<String>,

    /// Query string of the page URL, used for the landing listings query.
    #[arg(long, value_name = "QUERY", default_value = "")]
    pub search: String,

    /// Display name of the signed-in user, if any.
    #[arg(long = "display-name", value_name = "NAME")]
    pub display_name: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FooterArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MobileMenuArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Current page path, used to highlight the active link.
    #[arg(long, value_name = "PATH", default_value = "/")]
    pub path: String,

    /// Query string of the current page; `mobilemenu=open` renders the menu open.
    #[arg(long, value_name = "QUERY", default_value = "")]
    pub search: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ProfileMenuArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Current page path, used to highlight the active entry.
    #[arg(long, value_name = "PATH", default_value = "/")]
    pub path: String,

    #[arg(long = "first-name", value_name = "NAME", default_value = "")]
    pub first_name: String,

    #[arg(long = "last-name", value_name = "NAME", default_value = "")]
    pub last_name: String,

    /// The user has published listings (selects the sales inbox).
    #[arg(long = "has-listings", action = clap::ArgAction::SetTrue)]
    pub has_listings: bool,

    /// Unread notification count shown on the inbox entry.
    #[arg(long = "notification-count", value_name = "COUNT", default_value_t = 0)]
    pub notification_count: u32,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SearchUrlArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Query string of the page the search was submitted from.
    #[arg(long, value_name = "QUERY", default_value = "")]
    pub search: String,

    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub address: Option<String>,

    /// Origin of a location search as `lat,lng`.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub origin: Option<LatLng>,

    /// Bounds of a location search as `ne_lat,ne_lng,sw_lat,sw_lng`.
    #[arg(long, value_name = "BOUNDS", allow_hyphen_values = true)]
    pub bounds: Option<LatLngBounds>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Read hosted assets from this directory.
    #[arg(long = "assets-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub assets_dir: Option<PathBuf>,

    /// Fetch hosted assets from this base URL instead of a directory.
    #[arg(long = "assets-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub assets_url: Option<String>,

    /// Base URL of the marketplace API used for listings queries.
    #[arg(long = "marketplace-api-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub marketplace_api_url: Option<String>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub assets: AssetSettings,
    pub marketplace: MarketplaceSettings,
    pub landing: LandingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where hosted assets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSettings {
    Directory(PathBuf),
    Http(String),
}

#[derive(Debug, Clone, Default)]
pub struct MarketplaceSettings {
    pub api_base_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    if let Some(command) = cli.command.as_ref() {
        raw.apply_overrides(command.overrides());
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    assets: RawAssetSettings,
    marketplace: RawMarketplaceSettings,
    landing: RawLandingSettings,
    search: RawSearchSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(directory) = overrides.assets_dir.as_ref() {
            self.assets.directory = Some(directory.clone());
            self.assets.url = None;
        }
        if let Some(url) = overrides.assets_url.as_ref() {
            self.assets.url = Some(url.clone());
        }
        if let Some(url) = overrides.marketplace_api_url.as_ref() {
            self.marketplace.api_base_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            assets,
            marketplace,
            landing,
            search,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            assets: build_asset_settings(assets)?,
            marketplace: build_marketplace_settings(marketplace)?,
            landing: build_landing_settings(landing)?,
            search: build_search_settings(search)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_asset_settings(assets: RawAssetSettings) -> Result<AssetSettings, LoadError> {
    if let Some(url) = non_blank(assets.url) {
        if !is_http_url(&url) {
            return Err(LoadError::invalid(
                "assets.url",
                format!("`{url}` must be an http(s) URL"),
            ));
        }
        return Ok(AssetSettings::Http(url));
    }

    let directory = assets
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid("assets.directory", "must not be empty"));
    }
    Ok(AssetSettings::Directory(directory))
}

fn build_marketplace_settings(
    marketplace: RawMarketplaceSettings,
) -> Result<MarketplaceSettings, LoadError> {
    let api_base_url = non_blank(marketplace.api_base_url);
    match api_base_url.as_deref() {
        Some(url) if !is_http_url(url) => Err(LoadError::invalid(
            "marketplace.api_base_url",
            format!("`{url}` must be an http(s) URL"),
        )),
        _ => Ok(MarketplaceSettings { api_base_url }),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn build_landing_settings(landing: RawLandingSettings) -> Result<LandingConfig, LoadError> {
    let asset_name = non_blank(landing.asset_name).unwrap_or_else(|| ASSET_NAME.to_string());
    let page_size = non_zero_u32(
        landing.page_size.unwrap_or(u64::from(RESULT_PAGE_SIZE)),
        "landing.page_size",
    )?;

    let carousel_columns = landing.carousel_columns.unwrap_or(DEFAULT_CAROUSEL_COLUMNS);
    if !(1..=MAX_CAROUSEL_COLUMNS).contains(&carousel_columns) {
        return Err(LoadError::invalid(
            "landing.carousel_columns",
            format!("must be between 1 and {MAX_CAROUSEL_COLUMNS}"),
        ));
    }

    let defaults = ListingImageConfig::default();
    let listing_image = ListingImageConfig {
        aspect_width: non_zero_u32(
            landing
                .image_aspect_width
                .unwrap_or(u64::from(defaults.aspect_width)),
            "landing.image_aspect_width",
        )?
        .get(),
        aspect_height: non_zero_u32(
            landing
                .image_aspect_height
                .unwrap_or(u64::from(defaults.aspect_height)),
            "landing.image_aspect_height",
        )?
        .get(),
        variant_prefix: non_blank(landing.image_variant_prefix).unwrap_or(defaults.variant_prefix),
    };

    Ok(LandingConfig {
        asset_name,
        page_size: page_size.get(),
        carousel_columns,
        listing_image,
    })
}

fn build_search_settings(search: RawSearchSettings) -> Result<SearchConfig, LoadError> {
    let main_search_type = match search.main_search_type.as_deref().map(str::trim) {
        None | Some("") | Some("keywords") => MainSearchType::Keywords,
        Some("location") => MainSearchType::Location,
        Some(other) => {
            return Err(LoadError::invalid(
                "search.main_search_type",
                format!("unknown search type `{other}` (expected keywords|location)"),
            ));
        }
    };

    Ok(SearchConfig {
        main_search_type,
        origin_in_use: search.origin_in_use.unwrap_or(false),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAssetSettings {
    directory: Option<PathBuf>,
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMarketplaceSettings {
    api_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLandingSettings {
    asset_name: Option<String>,
    page_size: Option<u64>,
    carousel_columns: Option<u64>,
    image_aspect_width: Option<u64>,
    image_aspect_height: Option<u64>,
    image_variant_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSearchSettings {
    main_search_type: Option<String>,
    origin_in_use: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
