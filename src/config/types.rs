use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default number of retries when a test has no `global` block.
const DEFAULT_RETRIES: u32 = 0;
/// Default delay between retries.
const DEFAULT_RETRIES_DELAY: Duration = Duration::from_secs(1);

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("wavebench/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Collection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tests: Vec<Test>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Test {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub global: Option<Global>,
    pub request: RequestTemplate,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Test {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Global {
    pub timeout: Option<DurationValue>,
    pub retries: Option<u32>,
    pub retries_delay: Option<DurationValue>,
    pub think_time: Option<DurationValue>,
}

/// `Global` with every duration parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub retries_delay: Duration,
    pub think_time: Option<Duration>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: DEFAULT_RETRIES,
            retries_delay: DEFAULT_RETRIES_DELAY,
            think_time: None,
        }
    }
}

impl Global {
    /// Parses the declared durations.
    ///
    /// # Errors
    ///
    /// Returns an error when any duration string is malformed or zero.
    pub fn settings(&self) -> Result<GlobalSettings, ConfigError> {
        Ok(GlobalSettings {
            timeout: self
                .timeout
                .as_ref()
                .map(DurationValue::to_duration)
                .transpose()?,
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            retries_delay: self
                .retries_delay
                .as_ref()
                .map(DurationValue::to_duration)
                .transpose()?
                .unwrap_or(DEFAULT_RETRIES_DELAY),
            think_time: self
                .think_time
                .as_ref()
                .map(DurationValue::to_duration)
                .transpose()?,
        })
    }
}

/// A ramp phase as authored in the config file.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Phase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub single_request: Option<bool>,
    pub duration: Option<DurationValue>,
    pub increment: Option<DurationValue>,
    pub increment_vus: Option<u32>,
    pub target_vus: Option<u32>,
    pub request: Option<RequestTemplate>,
}

impl Phase {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = self.name.as_deref() {
            parts.push(format!("name:{}", name));
        }
        if let Some(single_request) = self.single_request {
            parts.push(format!("single_request:{}", single_request));
        }
        if let Some(duration) = self.duration.as_ref() {
            parts.push(format!("duration:{}", duration));
        }
        if let Some(increment) = self.increment.as_ref() {
            parts.push(format!("increment:{}", increment));
        }
        if let Some(increment_vus) = self.increment_vus.filter(|vus| *vus != 0) {
            parts.push(format!("increment_vus:{}", increment_vus));
        }
        if let Some(target_vus) = self.target_vus.filter(|vus| *vus != 0) {
            parts.push(format!("target_vus:{}", target_vus));
        }
        write!(f, "{}", parts.join(" | "))
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    #[serde(default)]
    pub method: HttpMethod,
    pub uri: String,
    #[serde(default)]
    pub user_agent: Option<UserAgent>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

impl RequestTemplate {
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Method: {} | URI: {} | UserAgent: {} | Body: {} | Headers size: {} | Cookies size: {}",
            self.method,
            self.uri,
            self.user_agent.map_or("default", UserAgent::as_str),
            self.body,
            self.headers.len(),
            self.cookies.len()
        )
    }

    /// Value sent in the `User-Agent` header.
    #[must_use]
    pub fn user_agent_header(&self) -> &'static str {
        self.user_agent
            .map_or(DEFAULT_USER_AGENT, UserAgent::header_value)
    }

    /// Value for the `Cookie` header, `None` when no cookies are declared.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();
        Some(pairs.join("; "))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub max_age: Option<i64>,
    #[serde(default)]
    pub same_site: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(ConfigError::InvalidMethod {
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Browser family whose User-Agent string is sent with each request.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum UserAgent {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Opera,
    Ie,
    Android,
    Ios,
}

impl UserAgent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UserAgent::Chrome => "chrome",
            UserAgent::Firefox => "firefox",
            UserAgent::Safari => "safari",
            UserAgent::Edge => "edge",
            UserAgent::Opera => "opera",
            UserAgent::Ie => "ie",
            UserAgent::Android => "android",
            UserAgent::Ios => "ios",
        }
    }

    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            UserAgent::Chrome => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            }
            UserAgent::Firefox => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0"
            }
            UserAgent::Safari => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15"
            }
            UserAgent::Edge => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0"
            }
            UserAgent::Opera => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 OPR/110.0.0.0"
            }
            UserAgent::Ie => "Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0) like Gecko",
            UserAgent::Android => {
                "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36"
            }
            UserAgent::Ios => {
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1"
            }
        }
    }
}

impl std::str::FromStr for UserAgent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(UserAgent::Chrome),
            "firefox" => Ok(UserAgent::Firefox),
            "safari" => Ok(UserAgent::Safari),
            "edge" => Ok(UserAgent::Edge),
            "opera" => Ok(UserAgent::Opera),
            "ie" => Ok(UserAgent::Ie),
            "android" => Ok(UserAgent::Android),
            "ios" => Ok(UserAgent::Ios),
            _ => Err(ConfigError::InvalidUserAgent {
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for UserAgent {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// Converts the authored value into a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns an error when the value is zero or not a valid duration string.
    pub fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ConfigError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationValue::Seconds(secs) => write!(f, "{}s", secs),
            DurationValue::Text(text) => f.write_str(text),
        }
    }
}
