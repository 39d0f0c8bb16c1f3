use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::server::DohServer;
use crate::errors::DohConfigError;

const KEY_SERVERS: &str = "servers";

/// ASCII whitespace separating templates in the plain-text syntax.
const TEMPLATE_SEPARATORS: [char; 6] = [' ', '\t', '\n', '\x0B', '\x0C', '\r'];

/// An ordered group of DoH servers.
///
/// Order encodes preference and is kept by every parse and render path.
/// Duplicates are kept as well.
///
/// Two textual syntaxes are accepted:
/// - a JSON document `{"servers": [{"template": "..."}, ...]}`
/// - whitespace-separated templates
///
/// Rendering picks the template list when every server [is
/// simple](DohServer::is_simple) and JSON otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DohConfig {
    servers: Vec<DohServer>,
}

/// How raw configuration text was classified, JSON first.
enum Decoded<'a> {
    /// A well-formed `{"servers": [...]}` document.
    Structured(DohConfig),
    /// Valid JSON that is not an acceptable document.
    Rejected(DohConfigError),
    /// Not JSON; the whitespace-separated tokens of the text.
    TemplateList(Vec<&'a str>),
}

impl<'a> Decoded<'a> {
    fn classify(text: &'a str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => match DohConfig::from_value(&value) {
                Ok(config) => Decoded::Structured(config),
                Err(e) => Decoded::Rejected(e),
            },
            Err(_) => Decoded::TemplateList(split_templates(text)),
        }
    }
}

fn split_templates(text: &str) -> Vec<&str> {
    text.split(TEMPLATE_SEPARATORS)
        .filter(|token| !token.is_empty())
        .collect()
}

impl DohConfig {
    pub fn new(servers: Vec<DohServer>) -> Self {
        Self { servers }
    }

    /// Builds a group from already-split templates. Every template must be
    /// valid; the first invalid one fails the whole group.
    pub fn from_templates<I, S>(templates: I) -> Result<Self, DohConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        templates
            .into_iter()
            .map(DohServer::from_template)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Parses `text` as a JSON document or a template list, accepting only a
    /// fully valid, non-empty group.
    ///
    /// A JSON document with an empty `servers` array is not accepted as a
    /// match; the text is retried as a template list, which fails with
    /// [`DohConfigError::EmptyConfiguration`].
    pub fn from_str_strict(text: &str) -> Result<Self, DohConfigError> {
        let (templates, fallback_error) = match Decoded::classify(text) {
            Decoded::Structured(config) if !config.is_empty() => return Ok(config),
            Decoded::Structured(_) => {
                debug!("DoH config document has no servers, retrying as template list");
                (split_templates(text), Some(DohConfigError::EmptyConfiguration))
            }
            Decoded::Rejected(e) => {
                debug!(error = %e, "DoH config document rejected, retrying as template list");
                (split_templates(text), Some(e))
            }
            Decoded::TemplateList(templates) => (templates, None),
        };

        if templates.is_empty() {
            return Err(DohConfigError::EmptyConfiguration);
        }

        Self::from_templates(templates).map_err(|e| fallback_error.unwrap_or(e))
    }

    /// Parses `text` as a JSON document or a template list, keeping whatever
    /// is valid. Never fails; the result may be empty.
    ///
    /// A valid JSON document is returned as is, even with no servers. A JSON
    /// document with any bad server record is not partially accepted.
    /// Invalid templates in a template list are dropped.
    pub fn from_str_lax(text: &str) -> Self {
        let templates = match Decoded::classify(text) {
            Decoded::Structured(config) => return config,
            Decoded::Rejected(e) => {
                debug!(error = %e, "DoH config document rejected, parsing as template list");
                split_templates(text)
            }
            Decoded::TemplateList(templates) => templates,
        };

        let servers = templates
            .into_iter()
            .filter_map(|template| match DohServer::from_template(template) {
                Ok(server) => Some(server),
                Err(e) => {
                    warn!(error = %e, "Dropping invalid DoH template");
                    None
                }
            })
            .collect();

        Self::new(servers)
    }

    /// Decodes the structured form. All-or-nothing: any malformed element
    /// fails the whole document.
    pub fn from_value(value: &Value) -> Result<Self, DohConfigError> {
        let obj = value.as_object().ok_or_else(|| {
            DohConfigError::MalformedDocument("top-level value must be an object".to_string())
        })?;

        let servers = obj
            .get(KEY_SERVERS)
            .ok_or_else(|| {
                DohConfigError::MalformedDocument(format!("missing '{KEY_SERVERS}' key"))
            })?
            .as_array()
            .ok_or_else(|| {
                DohConfigError::MalformedDocument(format!("'{KEY_SERVERS}' must be an array"))
            })?;

        servers
            .iter()
            .map(DohServer::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Structured form, regardless of whether the servers are simple.
    pub fn to_value(&self) -> Value {
        let servers = self.servers.iter().map(DohServer::to_value).collect();
        let mut obj = Map::new();
        obj.insert(KEY_SERVERS.to_string(), Value::Array(servers));
        Value::Object(obj)
    }

    pub fn servers(&self) -> &[DohServer] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DohServer> {
        self.servers.iter()
    }

    /// True when the group renders as a plain template list.
    pub fn is_simple(&self) -> bool {
        self.servers.iter().all(DohServer::is_simple)
    }
}

impl fmt::Display for DohConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_simple() {
            for (i, server) in self.servers.iter().enumerate() {
                if i > 0 {
                    f.write_str("\n")?;
                }
                f.write_str(server.server_template())?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.to_value()).map_err(|_| fmt::Error)?;
        f.write_str(json.trim_end())
    }
}

impl FromStr for DohConfig {
    type Err = DohConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

impl From<Vec<DohServer>> for DohConfig {
    fn from(servers: Vec<DohServer>) -> Self {
        Self::new(servers)
    }
}

impl IntoIterator for DohConfig {
    type Item = DohServer;
    type IntoIter = std::vec::IntoIter<DohServer>;

    fn into_iter(self) -> Self::IntoIter {
        self.servers.into_iter()
    }
}

impl<'a> IntoIterator for &'a DohConfig {
    type Item = &'a DohServer;
    type IntoIter = std::slice::Iter<'a, DohServer>;

    fn into_iter(self) -> Self::IntoIter {
        self.servers.iter()
    }
}

impl Serialize for DohConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DohConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}
