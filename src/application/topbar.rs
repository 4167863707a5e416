use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::{Url, form_urlencoded};

use crate::domain::navigation::{Category, CurrentUser, CustomLink, LinkType, ResolvedRoute};
use crate::presentation::views::{
    MenuLinkView, MobileMenuTemplate, ProfileMenuTemplate, TemplateRenderError, render_template,
};

/// Throwaway origin used only to parse relative hrefs.
const LINK_BASE: &str = "http://my.marketplace.com";

pub const MOBILE_MENU_PARAM: &str = "mobilemenu";
pub const MOBILE_SEARCH_PARAM: &str = "mobilesearch";
const MODAL_OPEN: &str = "open";

const CATEGORY_SEARCH_PARAM: &str = "pub_categoryLevel1";

pub const ACCOUNT_SETTINGS_PAGES: [&str; 4] = [
    "ContactDetailsPage",
    "PasswordChangePage",
    "StripePayoutPage",
    "PaymentMethodsPage",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub name: String,
    pub path: String,
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

/// Named routes of the storefront. Patterns use `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfiguration {
    routes: Vec<RouteDefinition>,
}

impl Default for RouteConfiguration {
    fn default() -> Self {
        Self::new(
            [
                ("LandingPage", "/"),
                ("CMSPage", "/p/:pageId"),
                ("SearchPage", "/s"),
                ("ListingPage", "/l/:id"),
                ("ProfilePage", "/u/:id"),
                ("InboxPage", "/inbox/:tab"),
                ("ManageListingsPage", "/listings"),
                ("FavoriteListingsPage", "/favorites"),
                ("ProfileSettingsPage", "/profile-settings"),
                ("AccountSettingsPage", "/account"),
                ("ContactDetailsPage", "/account/contact-details"),
                ("PasswordChangePage", "/account/change-password"),
                ("StripePayoutPage", "/account/payments"),
                ("PaymentMethodsPage", "/account/payment-methods"),
                ("LoginPage", "/login"),
                ("SignupPage", "/signup"),
            ]
            .into_iter()
            .map(|(name, path)| RouteDefinition::new(name, path))
            .collect(),
        )
    }
}

impl RouteConfiguration {
    pub fn new(routes: Vec<RouteDefinition>) -> Self {
        Self { routes }
    }

    /// First route whose pattern matches `pathname`.
    pub fn match_pathname(&self, pathname: &str) -> Option<MatchedRoute> {
        self.routes.iter().find_map(|route| {
            match_pattern(&route.path, pathname).map(|params| MatchedRoute {
                name: route.name.clone(),
                params,
            })
        })
    }

    /// Path for the named route, or `None` when the route is unknown or a
    /// parameter is missing.
    pub fn path_for(&self, name: &str, params: &BTreeMap<String, String>) -> Option<String> {
        let route = self.routes.iter().find(|route| route.name == name)?;
        let mut segments = Vec::new();
        for segment in path_segments(&route.path) {
            match segment.strip_prefix(':') {
                Some(param) => segments.push(params.get(param)?.as_str()),
                None => segments.push(segment),
            }
        }
        Some(format!("/{}", segments.join("/")))
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_pattern(pattern: &str, pathname: &str) -> Option<BTreeMap<String, String>> {
    let expected: Vec<&str> = path_segments(pattern).collect();
    let actual: Vec<&str> = path_segments(pathname).collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(&actual) {
        match want.strip_prefix(':') {
            Some(param) => {
                params.insert(param.to_string(), (*got).to_string());
            }
            None if want == got => {}
            None => return None,
        }
    }
    Some(params)
}

/// Links of the primary group first; order within a group is preserved.
pub fn sort_custom_links(mut links: Vec<CustomLink>) -> Vec<CustomLink> {
    links.sort_by_key(|link| link.group);
    links
}

/// Attach the matching in-app route to internal links.
///
/// A link counts as internal when typed so or when its href is
/// root-relative. Links whose path matches no route are left untouched.
pub fn resolve_custom_links(links: Vec<CustomLink>, routes: &RouteConfiguration) -> Vec<CustomLink> {
    links
        .into_iter()
        .map(|mut link| {
            let is_internal = link.link_type == LinkType::Internal || link.href.starts_with('/');
            if !is_internal {
                return link;
            }

            let url = match Url::parse(&format!("{LINK_BASE}{}", link.href)) {
                Ok(url) => url,
                Err(err) => {
                    debug!(
                        target = "storefront::topbar",
                        href = %link.href,
                        error = %err,
                        "custom link href is not a valid path"
                    );
                    return link;
                }
            };

            if let Some(matched) = routes.match_pathname(url.path()) {
                link.link_type = LinkType::Internal;
                link.route = Some(ResolvedRoute {
                    name: matched.name,
                    params: matched.params,
                    search: url.query().map(|q| format!("?{q}")).unwrap_or_default(),
                    hash: url.fragment().map(|f| format!("#{f}")).unwrap_or_default(),
                });
            }
            link
        })
        .collect()
}

/// Custom links from the hosted topbar asset. Malformed entries are skipped.
pub fn custom_links_from_asset(topbar: &Value) -> Vec<CustomLink> {
    let Some(entries) = topbar.get("customLinks").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value(entry.clone())
                .map_err(|err| {
                    warn!(
                        target = "storefront::topbar",
                        index,
                        error = %err,
                        "skipping malformed custom link"
                    );
                })
                .ok()
        })
        .collect()
}

/// Top-level categories from the hosted categories asset.
pub fn categories_from_asset(asset: &Value) -> Vec<Category> {
    asset
        .get("categories")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Page key used to highlight the active menu entry.
pub fn resolve_current_page(pathname: &str, routes: &RouteConfiguration) -> Option<String> {
    let matched = routes.match_pathname(pathname)?;
    let key = match matched.name.as_str() {
        "CMSPage" => format!("CMSPage:{}", param(&matched.params, "pageId")),
        "InboxPage" => format!("InboxPage:{}", param(&matched.params, "tab")),
        _ => matched.name,
    };
    Some(key)
}

fn param<'a>(params: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

fn parse_search(search: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

fn to_url(pathname: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return pathname.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{pathname}?{query}")
}

/// Current URL with the modal named by `modal_param` opened.
pub fn with_modal_state(pathname: &str, search: &str, modal_param: &str) -> String {
    let mut params = parse_search(search);
    params.insert(modal_param.to_string(), MODAL_OPEN.to_string());
    to_url(pathname, &params)
}

/// Current URL with the modal named by `modal_param` closed.
pub fn without_modal_state(pathname: &str, search: &str, modal_param: &str) -> String {
    let mut params = parse_search(search);
    params.remove(modal_param);
    to_url(pathname, &params)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalState {
    pub mobile_menu_open: bool,
    pub mobile_search_open: bool,
}

pub fn modal_state(search: &str) -> ModalState {
    let params = parse_search(search);
    let is_open = |key: &str| params.get(key).is_some_and(|value| value == MODAL_OPEN);
    ModalState {
        mobile_menu_open: is_open(MOBILE_MENU_PARAM),
        mobile_search_open: is_open(MOBILE_SEARCH_PARAM),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub ne: LatLng,
    pub sw: LatLng,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} comma-separated numbers, got `{input}`")]
pub struct CoordinateParseError {
    expected: usize,
    input: String,
}

fn parse_coordinates<const N: usize>(input: &str) -> Result<[f64; N], CoordinateParseError> {
    let invalid = || CoordinateParseError {
        expected: N,
        input: input.to_string(),
    };
    let values = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    <[f64; N]>::try_from(values).map_err(|_| invalid())
}

/// Parses `lat,lng`.
impl FromStr for LatLng {
    type Err = CoordinateParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let [lat, lng] = parse_coordinates::<2>(input)?;
        Ok(Self { lat, lng })
    }
}

/// Parses `ne_lat,ne_lng,sw_lat,sw_lng`, the same order the search URL uses.
impl FromStr for LatLngBounds {
    type Err = CoordinateParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let [ne_lat, ne_lng, sw_lat, sw_lng] = parse_coordinates::<4>(input)?;
        Ok(Self {
            ne: LatLng {
                lat: ne_lat,
                lng: ne_lng,
            },
            sw: LatLng {
                lat: sw_lat,
                lng: sw_lng,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainSearchType {
    #[default]
    Keywords,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchConfig {
    pub main_search_type: MainSearchType,
    pub origin_in_use: bool,
}

/// Values submitted from the topbar search form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSubmission {
    pub keywords: Option<String>,
    pub address: Option<String>,
    pub origin: Option<LatLng>,
    pub bounds: Option<LatLngBounds>,
}

/// Search page URL for a topbar search submission.
///
/// The current query parameters are kept, except that the parameters owned by
/// the configured search type are replaced by the submitted ones.
pub fn search_page_url(
    current_search: &str,
    submission: &SearchSubmission,
    config: &SearchConfig,
    routes: &RouteConfiguration,
) -> String {
    let mut params = parse_search(current_search);
    params.remove(MOBILE_SEARCH_PARAM);

    match config.main_search_type {
        MainSearchType::Keywords => {
            set_or_remove(&mut params, "keywords", submission.keywords.clone());
        }
        MainSearchType::Location => {
            set_or_remove(&mut params, "address", submission.address.clone());
            let origin = submission
                .origin
                .filter(|_| config.origin_in_use)
                .map(|origin| format!("{},{}", origin.lat, origin.lng));
            set_or_remove(&mut params, "origin", origin);
            let bounds = submission.bounds.map(|bounds| {
                format!(
                    "{},{},{},{}",
                    bounds.ne.lat, bounds.ne.lng, bounds.sw.lat, bounds.sw.lng
                )
            });
            set_or_remove(&mut params, "bounds", bounds);
        }
    }

    let path = routes
        .path_for("SearchPage", &BTreeMap::new())
        .unwrap_or_else(|| "/s".to_string());
    to_url(&path, &params)
}

fn set_or_remove(params: &mut BTreeMap<String, String>, key: &str, value: Option<String>) {
    match value.filter(|value| !value.is_empty()) {
        Some(value) => {
            params.insert(key.to_string(), value);
        }
        None => {
            params.remove(key);
        }
    }
}

fn is_current_custom_link(route: &ResolvedRoute, current_page: Option<&str>) -> bool {
    let Some(current) = current_page else {
        return false;
    };
    match route.name.as_str() {
        "CMSPage" => current == format!("CMSPage:{}", param(&route.params, "pageId")),
        "InboxPage" => current == format!("InboxPage:{}", param(&route.params, "tab")),
        name => current == name,
    }
}

fn custom_link_view(link: &CustomLink, current_page: Option<&str>, routes: &RouteConfiguration) -> MenuLinkView {
    match (&link.link_type, &link.route) {
        (LinkType::Internal, Some(route)) => {
            let path = routes
                .path_for(&route.name, &route.params)
                .map(|path| format!("{path}{}{}", route.search, route.hash))
                .unwrap_or_else(|| link.href.clone());
            MenuLinkView {
                key: link.text.clone(),
                text: link.text.clone(),
                href: path,
                current: is_current_custom_link(route, current_page),
                external: false,
            }
        }
        (LinkType::Internal, None) => MenuLinkView {
            key: link.text.clone(),
            text: link.text.clone(),
            href: link.href.clone(),
            current: false,
            external: false,
        },
        (LinkType::External, _) => MenuLinkView {
            key: link.text.clone(),
            text: link.text.clone(),
            href: link.href.clone(),
            current: false,
            external: true,
        },
    }
}

fn category_link_view(category: &Category) -> MenuLinkView {
    let id: String = form_urlencoded::byte_serialize(category.id.as_bytes()).collect();
    MenuLinkView {
        key: category.id.clone(),
        text: category.name.clone(),
        href: format!("/s?{CATEGORY_SEARCH_PARAM}={id}"),
        current: false,
        external: false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileMenuView {
    pub open: bool,
    pub open_href: String,
    pub close_href: String,
    pub custom_links: Vec<MenuLinkView>,
    pub category_links: Vec<MenuLinkView>,
}

/// Mobile menu for the page at `pathname` with query string `search`.
///
/// The menu is open when `search` carries `mobilemenu=open`; the toggle links
/// keep the rest of the query intact.
pub fn mobile_menu(
    custom_links: &[CustomLink],
    categories: &[Category],
    pathname: &str,
    search: &str,
    routes: &RouteConfiguration,
) -> MobileMenuView {
    let current_page = resolve_current_page(pathname, routes);
    MobileMenuView {
        open: modal_state(search).mobile_menu_open,
        open_href: with_modal_state(pathname, search, MOBILE_MENU_PARAM),
        close_href: without_modal_state(pathname, search, MOBILE_MENU_PARAM),
        custom_links: custom_links
            .iter()
            .map(|link| custom_link_view(link, current_page.as_deref(), routes))
            .collect(),
        category_links: categories.iter().map(category_link_view).collect(),
    }
}

pub fn render_mobile_menu(view: &MobileMenuView) -> Result<String, TemplateRenderError> {
    render_template(&MobileMenuTemplate {
        open: view.open,
        open_href: &view.open_href,
        close_href: &view.close_href,
        custom_links: &view.custom_links,
        category_links: &view.category_links,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMenuView {
    pub greeting: String,
    pub notification_count: u32,
    pub items: Vec<MenuLinkView>,
}

/// Profile dropdown for a signed-in user.
///
/// Users with listings land on their sales inbox, everyone else on orders.
pub fn profile_menu(
    user: &CurrentUser,
    has_listings: bool,
    notification_count: u32,
    current_page: Option<&str>,
    routes: &RouteConfiguration,
) -> ProfileMenuView {
    let inbox_tab = if has_listings { "sales" } else { "orders" };
    let inbox_key = format!("InboxPage:{inbox_tab}");
    let account_page_active = current_page
        .is_some_and(|page| page == "AccountSettingsPage" || ACCOUNT_SETTINGS_PAGES.contains(&page));

    let entry = |key: &str, text: &str, params: BTreeMap<String, String>, current: bool| {
        MenuLinkView {
            key: key.to_string(),
            text: text.to_string(),
            href: routes.path_for(key, &params).unwrap_or_else(|| "/".to_string()),
            current,
            external: false,
        }
    };
    let is = |key: &str| current_page == Some(key);

    let items = vec![
        entry(
            "InboxPage",
            "Inbox",
            BTreeMap::from([("tab".to_string(), inbox_tab.to_string())]),
            is(&inbox_key),
        ),
        entry(
            "ManageListingsPage",
            "Your listings",
            BTreeMap::new(),
            is("ManageListingsPage"),
        ),
        entry(
            "FavoriteListingsPage",
            "Favorite listings",
            BTreeMap::new(),
            is("FavoriteListingsPage"),
        ),
        entry(
            "ProfileSettingsPage",
            "Profile settings",
            BTreeMap::new(),
            is("ProfileSettingsPage"),
        ),
        entry(
            "AccountSettingsPage",
            "Account settings",
            BTreeMap::new(),
            account_page_active,
        ),
    ];

    ProfileMenuView {
        greeting: user.full_name(),
        notification_count,
        items,
    }
}

pub fn render_profile_menu(view: &ProfileMenuView) -> Result<String, TemplateRenderError> {
    render_template(&ProfileMenuTemplate {
        greeting: &view.greeting,
        notification_count: view.notification_count,
        items: &view.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::navigation::{LinkGroup, UserProfile};
    use serde_json::json;

    fn link(text: &str, group: LinkGroup, href: &str) -> CustomLink {
        CustomLink {
            group,
            text: text.to_string(),
            link_type: LinkType::External,
            href: href.to_string(),
            route: None,
        }
    }

    #[test]
    fn match_pathname_extracts_params() {
        let routes = RouteConfiguration::default();
        let matched = routes.match_pathname("/p/about/").expect("cms route");
        assert_eq!(matched.name, "CMSPage");
        assert_eq!(matched.params.get("pageId").map(String::as_str), Some("about"));

        assert_eq!(routes.match_pathname("/").map(|m| m.name), Some("LandingPage".into()));
        assert!(routes.match_pathname("/nowhere/at/all").is_none());
    }

    #[test]
    fn path_for_requires_every_param() {
        let routes = RouteConfiguration::default();
        let params = BTreeMap::from([("tab".to_string(), "sales".to_string())]);
        assert_eq!(routes.path_for("InboxPage", &params).as_deref(), Some("/inbox/sales"));
        assert_eq!(routes.path_for("InboxPage", &BTreeMap::new()), None);
        assert_eq!(routes.path_for("LandingPage", &BTreeMap::new()).as_deref(), Some("/"));
    }

    #[test]
    fn primary_links_sort_first_and_stay_stable() {
        let links = vec![
            link("a", LinkGroup::Secondary, "https://a.example"),
            link("b", LinkGroup::Primary, "https://b.example"),
            link("c", LinkGroup::Secondary, "https://c.example"),
            link("d", LinkGroup::Primary, "https://d.example"),
        ];
        let texts: Vec<String> = sort_custom_links(links)
            .into_iter()
            .map(|link| link.text)
            .collect();
        assert_eq!(texts, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn root_relative_links_resolve_to_routes() {
        let routes = RouteConfiguration::default();
        let links = resolve_custom_links(
            vec![
                link("About", LinkGroup::Primary, "/p/about?ref=top#team"),
                link("Blog", LinkGroup::Primary, "https://blog.example"),
                link("Lost", LinkGroup::Primary, "/missing/route/here"),
            ],
            &routes,
        );

        let route = links[0].route.as_ref().expect("about route");
        assert_eq!(links[0].link_type, LinkType::Internal);
        assert_eq!(route.name, "CMSPage");
        assert_eq!(route.search, "?ref=top");
        assert_eq!(route.hash, "#team");
        assert!(links[1].route.is_none());
        assert!(links[2].route.is_none());
    }

    #[test]
    fn current_page_keys_carry_params() {
        let routes = RouteConfiguration::default();
        assert_eq!(
            resolve_current_page("/p/faq", &routes).as_deref(),
            Some("CMSPage:faq")
        );
        assert_eq!(
            resolve_current_page("/inbox/orders", &routes).as_deref(),
            Some("InboxPage:orders")
        );
        assert_eq!(
            resolve_current_page("/listings", &routes).as_deref(),
            Some("ManageListingsPage")
        );
    }

    #[test]
    fn modal_state_round_trips_through_search() {
        let opened = with_modal_state("/s", "?keywords=bike&address=x", MOBILE_MENU_PARAM);
        assert_eq!(opened, "/s?address=x&keywords=bike&mobilemenu=open");
        assert!(modal_state("?mobilemenu=open").mobile_menu_open);
        assert!(!modal_state("?mobilemenu=closed").mobile_menu_open);

        let closed = without_modal_state("/s", "?mobilemenu=open", MOBILE_MENU_PARAM);
        assert_eq!(closed, "/s");
    }

    #[test]
    fn keyword_search_replaces_keywords_only() {
        let url = search_page_url(
            "?keywords=old&price=10&mobilesearch=open",
            &SearchSubmission {
                keywords: Some("new lamp".into()),
                ..SearchSubmission::default()
            },
            &SearchConfig::default(),
            &RouteConfiguration::default(),
        );
        assert_eq!(url, "/s?keywords=new+lamp&price=10");
    }

    #[test]
    fn location_search_formats_origin_and_bounds() {
        let config = SearchConfig {
            main_search_type: MainSearchType::Location,
            origin_in_use: true,
        };
        let submission = SearchSubmission {
            address: Some("Helsinki".into()),
            origin: Some(LatLng { lat: 60.16, lng: 24.93 }),
            bounds: Some(LatLngBounds {
                ne: LatLng { lat: 60.3, lng: 25.2 },
                sw: LatLng { lat: 60.1, lng: 24.8 },
            }),
            ..SearchSubmission::default()
        };
        let url = search_page_url("", &submission, &config, &RouteConfiguration::default());
        insta::assert_snapshot!(url, @"/s?address=Helsinki&bounds=60.3%2C25.2%2C60.1%2C24.8&origin=60.16%2C24.93");

        let without_origin = search_page_url(
            "",
            &submission,
            &SearchConfig {
                origin_in_use: false,
                ..config
            },
            &RouteConfiguration::default(),
        );
        assert!(!without_origin.contains("origin"), "{without_origin}");
    }

    #[test]
    fn mobile_menu_marks_current_cms_page() {
        let routes = RouteConfiguration::default();
        let links = resolve_custom_links(
            vec![
                link("About", LinkGroup::Primary, "/p/about"),
                link("FAQ", LinkGroup::Primary, "/p/faq"),
                link("Blog", LinkGroup::Secondary, "https://blog.example"),
            ],
            &routes,
        );
        let categories = vec![Category {
            id: "bikes & more".into(),
            name: "Bikes".into(),
        }];

        let view = mobile_menu(&links, &categories, "/p/about", "", &routes);
        assert!(!view.open);
        assert_eq!(view.open_href, "/p/about?mobilemenu=open");
        assert!(view.custom_links[0].current);
        assert!(!view.custom_links[1].current);
        assert!(view.custom_links[2].external);
        assert_eq!(view.category_links[0].href, "/s?pub_categoryLevel1=bikes+%26+more");

        let html = render_mobile_menu(&view).expect("mobile menu html");
        assert!(html.contains(r#"class="navigation-link current-page" href="/p/about""#), "{html}");
        assert!(html.contains(r#"target="_blank""#), "{html}");
        assert!(html.contains(r#"class="open-menu" href="/p/about?mobilemenu=open""#), "{html}");
    }

    #[test]
    fn open_mobile_menu_links_back_to_the_page() {
        let view = mobile_menu(
            &[],
            &[],
            "/s",
            "?mobilemenu=open&keywords=lamp",
            &RouteConfiguration::default(),
        );
        assert!(view.open);
        assert_eq!(view.close_href, "/s?keywords=lamp");

        let html = render_mobile_menu(&view).expect("mobile menu html");
        assert!(html.contains(r#"class="mobile-menu is-open""#), "{html}");
        assert!(html.contains(r#"class="close-menu" href="/s?keywords=lamp""#), "{html}");
    }

    #[test]
    fn opening_a_modal_replaces_any_existing_value() {
        let url = with_modal_state("/s", "?mobilemenu=closed&a=1", MOBILE_MENU_PARAM);
        assert_eq!(url, "/s?a=1&mobilemenu=open");
        assert!(modal_state(url.trim_start_matches("/s")).mobile_menu_open);
    }

    #[test]
    fn coordinates_parse_in_search_url_order() {
        let origin: LatLng = "60.16, 24.93".parse().expect("origin");
        assert_eq!(origin, LatLng { lat: 60.16, lng: 24.93 });

        let bounds: LatLngBounds = "60.3,25.2,60.1,24.8".parse().expect("bounds");
        assert_eq!(bounds.ne, LatLng { lat: 60.3, lng: 25.2 });
        assert_eq!(bounds.sw, LatLng { lat: 60.1, lng: 24.8 });

        let err = "60.3,25.2".parse::<LatLngBounds>().expect_err("too few values");
        assert_eq!(err.to_string(), "expected 4 comma-separated numbers, got `60.3,25.2`");
        assert!("north,east".parse::<LatLng>().is_err());
    }

    #[test]
    fn profile_menu_greets_and_highlights_account_pages() {
        let user = CurrentUser {
            profile: UserProfile {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                display_name: "Ada L".into(),
            },
        };
        let routes = RouteConfiguration::default();
        let view = profile_menu(&user, true, 3, Some("PasswordChangePage"), &routes);

        assert_eq!(view.greeting, "Ada Lovelace");
        assert_eq!(view.items[0].href, "/inbox/sales");
        let account = view
            .items
            .iter()
            .find(|item| item.key == "AccountSettingsPage")
            .expect("account item");
        assert!(account.current);

        let html = render_profile_menu(&view).expect("profile menu html");
        assert!(html.contains("Hello, Ada Lovelace"), "{html}");
        assert!(html.contains(r#"<span class="notification-badge">3</span>"#), "{html}");

        let buyer = profile_menu(&user, false, 0, None, &routes);
        assert_eq!(buyer.items[0].href, "/inbox/orders");
    }

    #[test]
    fn topbar_assets_parse_leniently() {
        let links = custom_links_from_asset(&json!({
            "customLinks": [
                { "text": "About", "href": "/p/about", "group": "primary", "type": "internal" },
                { "href": "/missing-text" }
            ]
        }));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].group, LinkGroup::Primary);

        let categories = categories_from_asset(&json!({
            "categories": [{ "id": "bikes", "name": "Bikes" }, { "id": 3 }]
        }));
        assert_eq!(categories.len(), 1);
        assert!(custom_links_from_asset(&json!({})).is_empty());
    }
}
