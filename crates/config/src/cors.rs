//! Cross-origin settings for browser clients of the relay.

use std::{fmt, str::FromStr, time::Duration};

use ascii::AsciiString;
use duration_str::deserialize_option_duration;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Configuration for CORS (Cross-Origin Resource Sharing)
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// If false (or not defined), credentials are not allowed in requests
    pub allow_credentials: bool,
    /// Origins from which we allow requests. Entries may contain glob patterns.
    pub allow_origins: Option<AnyOrList<Url>>,
    /// Maximum time between OPTIONS and the next request
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// HTTP methods allowed to the endpoint.
    pub allow_methods: Option<AnyOrList<HttpMethod>>,
    /// Headers allowed in incoming requests
    pub allow_headers: Option<AnyOrList<AsciiString>>,
    /// Headers exposed to the browser
    pub expose_headers: Option<AnyOrList<AsciiString>>,
    /// If set, allows browsers from private network to connect
    pub allow_private_network: bool,
}

/// Either the wildcard `"*"` or an explicit list of values.
///
/// A single non-wildcard string is accepted as a list of one.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyOrList<T> {
    /// Any value is allowed.
    Any,
    /// Only the listed values are allowed.
    List(Vec<T>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnyOrList<T> {
    One(String),
    Many(Vec<T>),
}

impl<'de, T> Deserialize<'de> for AnyOrList<T>
where
    T: Deserialize<'de> + FromStr<Err: fmt::Display>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAnyOrList::<T>::deserialize(deserializer)? {
            RawAnyOrList::One(value) if value == "*" => Ok(AnyOrList::Any),
            RawAnyOrList::One(value) => value
                .parse::<T>()
                .map(|value| AnyOrList::List(vec![value]))
                .map_err(serde::de::Error::custom),
            RawAnyOrList::Many(values) => Ok(AnyOrList::List(values)),
        }
    }
}

/// One of the standard HTTP methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMethod(http::Method);

const STANDARD_METHODS: [http::Method; 9] = [
    http::Method::GET,
    http::Method::POST,
    http::Method::PUT,
    http::Method::DELETE,
    http::Method::HEAD,
    http::Method::OPTIONS,
    http::Method::CONNECT,
    http::Method::PATCH,
    http::Method::TRACE,
];

impl HttpMethod {
    /// The wrapped method.
    pub fn as_method(&self) -> &http::Method {
        &self.0
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        value.0
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();

        STANDARD_METHODS
            .iter()
            .find(|method| method.as_str() == upper)
            .cloned()
            .map(HttpMethod)
            .ok_or_else(|| format!("Unknown HTTP method: {s}"))
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
