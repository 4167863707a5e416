use std::{process, sync::Arc};

use storefront::{
    application::{
        assets::{
            AssetSource, CATEGORIES_ASSET_PATH, FOOTER_ASSET_PATH, TOPBAR_ASSET_PATH,
            fetch_optional,
        },
        error::AppError,
        footer::render_footer,
        landing::LandingPageService,
        listings::ListingsApi,
        page::{HostedAssetsStore, PageBuilder, PageOutput},
        sections::SectionRegistry,
        topbar::{
            RouteConfiguration, categories_from_asset, custom_links_from_asset, mobile_menu,
            SearchSubmission, profile_menu, render_mobile_menu, render_profile_menu,
            resolve_current_page, resolve_custom_links, search_page_url, sort_custom_links,
        },
    },
    config::{self, AssetSettings, Command, ComposeArgs, Settings},
    domain::navigation::{CurrentUser, UserProfile},
    infra::{
        assets::{DirectoryAssetSource, HttpAssetSource},
        listings::HttpListingsApi,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(
            error = %error,
            chain = ?report.messages,
            "{}",
            error.presentation_message()
        );
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(
            error = %error,
            chain = ?report.messages,
            "{}",
            error.presentation_message()
        );
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(Command::Compose(ComposeArgs::default()));

    telemetry::init(&settings.logging)?;
    let assets = build_asset_source(&settings.assets)?;

    let html = match command {
        Command::Compose(args) => run_compose(&settings, assets, args).await?,
        Command::Footer(_) => run_footer(assets.as_ref()).await?,
        Command::MobileMenu(args) => {
            run_mobile_menu(assets.as_ref(), &args.path, &args.search).await?
        }
        Command::ProfileMenu(args) => {
            let user = CurrentUser {
                profile: UserProfile {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    ..UserProfile::default()
                },
            };
            let routes = RouteConfiguration::default();
            let current_page = resolve_current_page(&args.path, &routes);
            let view = profile_menu(
                &user,
                args.has_listings,
                args.notification_count,
                current_page.as_deref(),
                &routes,
            );
            render_profile_menu(&view)?
        }
        Command::SearchUrl(args) => {
            let submission = SearchSubmission {
                keywords: args.keywords,
                address: args.address,
                origin: args.origin,
                bounds: args.bounds,
            };
            search_page_url(
                &args.search,
                &submission,
                &settings.search,
                &RouteConfiguration::default(),
            )
        }
    };

    println!("{html}");
    Ok(())
}

fn build_asset_source(settings: &AssetSettings) -> Result<Arc<dyn AssetSource>, AppError> {
    let source: Arc<dyn AssetSource> = match settings {
        AssetSettings::Directory(root) => Arc::new(DirectoryAssetSource::new(root.clone())),
        AssetSettings::Http(base) => Arc::new(HttpAssetSource::new(base)?),
    };
    Ok(source)
}

fn build_listings_api(settings: &Settings) -> Result<Option<Arc<dyn ListingsApi>>, AppError> {
    let Some(base) = settings.marketplace.api_base_url.as_deref() else {
        return Ok(None);
    };
    let api: Arc<dyn ListingsApi> = Arc::new(HttpListingsApi::new(base)?);
    Ok(Some(api))
}

async fn run_compose(
    settings: &Settings,
    assets: Arc<dyn AssetSource>,
    args: ComposeArgs,
) -> Result<String, AppError> {
    let registry = SectionRegistry::builtin();

    let output = match args.asset {
        None => {
            let listings_api = build_listings_api(settings)?;
            let service =
                LandingPageService::new(assets, listings_api, &registry, settings.landing.clone());
            let data = service.load(&args.search).await;
            let current_user = args.display_name.map(|display_name| CurrentUser {
                profile: UserProfile {
                    display_name,
                    ..UserProfile::default()
                },
            });
            service.render(&data, current_user.as_ref())?
        }
        Some(asset_name) => {
            let store = HostedAssetsStore::new();
            let state = store.load(assets.as_ref(), &asset_name).await;
            PageBuilder::new(registry).render(&state)?
        }
    };

    match &output {
        PageOutput::Composed { composition, .. } => info!(
            target = "storefront::compose",
            sections = composition.sections.len(),
            fallbacks = composition.diagnostics.len(),
            "page composed"
        ),
        PageOutput::Fallback { error, .. } => warn!(
            target = "storefront::compose",
            error = %error,
            "page asset unavailable; rendered fallback page"
        ),
        PageOutput::Loading { .. } => {}
    }

    Ok(output.html().to_string())
}

async fn run_footer(assets: &dyn AssetSource) -> Result<String, AppError> {
    let footer = fetch_optional(assets, FOOTER_ASSET_PATH).await?;
    let topbar = fetch_optional(assets, TOPBAR_ASSET_PATH).await?;
    let html = render_footer(&footer, &topbar, &SectionRegistry::builtin())?;
    Ok(html.unwrap_or_default())
}

async fn run_mobile_menu(
    assets: &dyn AssetSource,
    path: &str,
    search: &str,
) -> Result<String, AppError> {
    let (topbar, categories) = tokio::try_join!(
        fetch_optional(assets, TOPBAR_ASSET_PATH),
        fetch_optional(assets, CATEGORIES_ASSET_PATH),
    )?;

    let routes = RouteConfiguration::default();
    let links = resolve_custom_links(sort_custom_links(custom_links_from_asset(&topbar)), &routes);
    let categories = categories_from_asset(&categories);

    let view = mobile_menu(&links, &categories, path, search, &routes);
    Ok(render_mobile_menu(&view)?)
}
