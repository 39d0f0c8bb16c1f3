use serde_json::{Map, Value};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use super::template;
use crate::errors::DohConfigError;

const KEY_TEMPLATE: &str = "template";
const KEY_ENDPOINTS: &str = "endpoints";
const KEY_IPS: &str = "ips";

/// A set of IP addresses a DoH server can be reached at, bypassing the
/// resolution of the template's hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DohEndpoint {
    pub ips: Vec<IpAddr>,
}

impl DohEndpoint {
    pub fn new(ips: Vec<IpAddr>) -> Self {
        Self { ips }
    }

    fn from_value(value: &Value) -> Result<Self, DohConfigError> {
        let obj = value.as_object().ok_or_else(|| {
            DohConfigError::InvalidStructuredConfig("endpoint must be an object".to_string())
        })?;

        let Some(ips) = obj.get(KEY_IPS) else {
            return Ok(Self::default());
        };
        let ips = ips.as_array().ok_or_else(|| {
            DohConfigError::InvalidStructuredConfig(format!("'{KEY_IPS}' must be an array"))
        })?;

        ips.iter()
            .map(|ip| {
                ip.as_str()
                    .and_then(|s| s.parse::<IpAddr>().ok())
                    .ok_or_else(|| {
                        DohConfigError::InvalidStructuredConfig(format!(
                            "invalid IP address literal: {ip}"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    fn to_value(&self) -> Value {
        let ips = self.ips.iter().map(|ip| Value::String(ip.to_string()));
        let mut obj = Map::new();
        obj.insert(KEY_IPS.to_string(), Value::Array(ips.collect()));
        Value::Object(obj)
    }
}

/// A validated DNS-over-HTTPS server.
///
/// Built from a URI template such as `https://dns.example/dns-query{?dns}`,
/// optionally pinned to one or more [`DohEndpoint`]s. The HTTP method is
/// derived from the template: templates that reference `dns` use GET,
/// templates without it use POST.
///
/// Uses `Arc<str>` for the template so groups can be cloned cheaply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DohServer {
    server_template: Arc<str>,
    use_post: bool,
    endpoints: Vec<DohEndpoint>,
}

impl DohServer {
    /// Builds a server from a bare template.
    pub fn from_template(template: impl AsRef<str>) -> Result<Self, DohConfigError> {
        Self::from_template_with_endpoints(template, Vec::new())
    }

    /// Builds a server from a template plus explicit IP endpoints.
    pub fn from_template_with_endpoints(
        template: impl AsRef<str>,
        endpoints: Vec<DohEndpoint>,
    ) -> Result<Self, DohConfigError> {
        let template = template.as_ref();
        let checked = template::check(template)
            .map_err(|reason| DohConfigError::invalid_template(template, reason))?;

        Ok(Self {
            server_template: Arc::from(template),
            use_post: checked.use_post,
            endpoints,
        })
    }

    /// Builds a server from its structured form:
    ///
    /// ```json
    /// { "template": "https://dns.example/dns-query{?dns}",
    ///   "endpoints": [ { "ips": ["192.0.2.1", "2001:db8::1"] } ] }
    /// ```
    ///
    /// `endpoints` and `ips` are optional; unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, DohConfigError> {
        let obj = value.as_object().ok_or_else(|| {
            DohConfigError::InvalidStructuredConfig("server must be an object".to_string())
        })?;

        let template = obj
            .get(KEY_TEMPLATE)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DohConfigError::InvalidStructuredConfig(format!(
                    "missing string field '{KEY_TEMPLATE}'"
                ))
            })?;

        let endpoints = match obj.get(KEY_ENDPOINTS) {
            None => Vec::new(),
            Some(Value::Array(list)) => list
                .iter()
                .map(DohEndpoint::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(DohConfigError::InvalidStructuredConfig(format!(
                    "'{KEY_ENDPOINTS}' must be an array"
                )))
            }
        };

        Self::from_template_with_endpoints(template, endpoints).map_err(|e| match e {
            DohConfigError::InvalidTemplate { template, reason } => {
                DohConfigError::InvalidStructuredConfig(format!(
                    "invalid template '{template}': {reason}"
                ))
            }
            other => other,
        })
    }

    pub fn server_template(&self) -> &str {
        &self.server_template
    }

    pub fn use_post(&self) -> bool {
        self.use_post
    }

    pub fn endpoints(&self) -> &[DohEndpoint] {
        &self.endpoints
    }

    /// True when the structured form carries nothing beyond the template,
    /// so the server survives a round trip through the plain-text syntax.
    pub fn is_simple(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Structured form; `endpoints` is only emitted when present.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            KEY_TEMPLATE.to_string(),
            Value::String(self.server_template.to_string()),
        );
        if !self.endpoints.is_empty() {
            let endpoints = self.endpoints.iter().map(DohEndpoint::to_value).collect();
            obj.insert(KEY_ENDPOINTS.to_string(), Value::Array(endpoints));
        }
        Value::Object(obj)
    }
}

impl FromStr for DohServer {
    type Err = DohConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_template(s)
    }
}

impl fmt::Display for DohServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.server_template)
    }
}
