use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primary links sort before secondary ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LinkGroup {
    Primary,
    #[default]
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    #[default]
    External,
}

/// In-app destination attached to an internal link once it matched a route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub name: String,
    pub params: BTreeMap<String, String>,
    pub search: String,
    pub hash: String,
}

/// Topbar link configured by the marketplace operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLink {
    #[serde(default)]
    pub group: LinkGroup,
    pub text: String,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<ResolvedRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    pub profile: UserProfile,
}

impl CurrentUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
    }
}
