use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One vertical block of a composed page.
///
/// Only `sectionId` and `sectionType` are interpreted by the composition
/// engine; every other field is kept verbatim in [`SectionDescriptor::fields`]
/// and handed to whichever renderer claims the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    pub section_id: String,
    pub section_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SectionDescriptor {
    pub fn new(section_id: impl Into<String>, section_type: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            section_type: section_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Text content of a field.
    ///
    /// Hosted assets store text either as a bare string or as a typed field
    /// object such as `{ "fieldType": "heading2", "content": "..." }`; both
    /// shapes are accepted. Blank content counts as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        self.field(key).and_then(text_content)
    }

    /// Deserialize a field into a concrete type. A missing field yields `Ok(None)`.
    pub fn field_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some),
        }
    }
}

/// Text carried by a plain string or a `{ content }` field object.
pub fn text_content(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(text) => text.as_str(),
        Value::Object(object) => object.get("content").and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Link carried by a `callToAction`-style field object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLink {
    pub label: String,
    pub href: String,
    pub external: bool,
}

impl SectionLink {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let href = object.get("href").and_then(Value::as_str)?.trim();
        if href.is_empty() {
            return None;
        }
        let label = object
            .get("content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(href);
        let external = match object.get("fieldType").and_then(Value::as_str) {
            Some("externalButtonLink" | "socialMediaLink") => true,
            Some(_) => false,
            None => !href.starts_with('/'),
        };
        Some(Self {
            label: label.to_string(),
            href: href.to_string(),
            external,
        })
    }
}

/// Hosted content for one page: an ordered list of sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageAssetsData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sections: Vec<SectionDescriptor>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SectionDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<SectionDescriptor>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl PageAssetsData {
    /// Parse a page asset document.
    ///
    /// The asset host returns either the page object itself or an envelope
    /// with the page object under `data`.
    pub fn from_asset(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(mut object) if !object.contains_key("sections") => {
                match object.remove("data") {
                    Some(Value::Null) => Ok(Self::default()),
                    Some(data) => serde_json::from_value(data),
                    None => serde_json::from_value(Value::Object(object)),
                }
            }
            other => serde_json::from_value(other),
        }
    }
}
