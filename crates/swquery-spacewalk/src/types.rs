//! Shared types for Spacewalk queries.

use crate::error::{SpacewalkError, SpacewalkResult};
use crate::xmlrpc::Value;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where and how to reach the XML-RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Full API URL (e.g. "https://spacewalk.example.com/rpc/api")
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed labs)
    #[serde(default)]
    pub insecure: bool,
    /// Ignore HTTP(S)_PROXY from the environment
    #[serde(default)]
    pub no_proxy: bool,
}

fn default_timeout() -> u64 { 30 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
            insecure: false,
            no_proxy: false,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    /// Validated endpoint URL.
    ///
    /// An unusable endpoint means no login can happen, so every problem
    /// here is an authentication error.
    pub fn endpoint(&self) -> SpacewalkResult<Url> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(SpacewalkError::auth("Malformed endpoint: URL is empty"));
        }
        let shown = match self.display_url() {
            Some(u) => format!(" '{u}'"),
            None => String::new(),
        };
        let url = Url::parse(raw)
            .map_err(|e| SpacewalkError::auth(format!("Malformed endpoint{shown}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(SpacewalkError::auth(format!(
                    "Malformed endpoint{shown}: unsupported scheme '{other}'"
                )))
            }
        }
        if url.password().is_some() {
            return Err(SpacewalkError::auth(
                "Malformed endpoint: credentials must not be embedded in the URL",
            ));
        }
        Ok(url)
    }

    /// The URL as it may be shown in results and messages.
    ///
    /// Userinfo is stripped. A URL that cannot be parsed but contains
    /// `@` may hide credentials, so it is not shown at all (`None`).
    pub fn display_url(&self) -> Option<String> {
        let raw = self.url.trim();
        match Url::parse(raw) {
            Ok(url) if url.username().is_empty() && url.password().is_none() => {
                if url.cannot_be_a_base() && raw.contains('@') {
                    None
                } else {
                    Some(raw.to_string())
                }
            }
            Ok(mut url) => {
                url.set_password(None).ok()?;
                url.set_username("").ok()?;
                Some(url.to_string())
            }
            Err(_) if raw.contains('@') => None,
            Err(_) => Some(raw.to_string()),
        }
    }
}

/// Login credentials. The password is never printed.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: SecretString::new(password.into()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Session / identifiers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque session key returned by `auth.login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    /// Accept a login result as a session key, rejecting falsy values.
    pub fn from_login_value(value: &Value) -> Option<Self> {
        if !value.is_truthy() {
            return None;
        }
        value.to_text().map(Self)
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// The key as the first positional parameter of every API call.
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(****)")
    }
}

/// Server-side system identifier, passed back to package calls verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemId(pub Value);

impl SystemId {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Query kinds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    Systems,
    Packages,
}

/// Which remote listing an invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    AllSystems,
    OutOfDateSystems,
    PhysicalSystems,
    AllPackages,
    UpgradablePackages,
    ExtraPackages,
}

impl QueryKind {
    /// System listing selected by flags. Out-of-date wins over physical,
    /// which wins over the unfiltered listing.
    pub fn systems(out_of_date: bool, physical: bool) -> Self {
        if out_of_date {
            Self::OutOfDateSystems
        } else if physical {
            Self::PhysicalSystems
        } else {
            Self::AllSystems
        }
    }

    /// Package listing selected by flags. Upgradable wins over extra,
    /// which wins over the full package list.
    pub fn packages(upgradable: bool, extra: bool) -> Self {
        if upgradable {
            Self::UpgradablePackages
        } else if extra {
            Self::ExtraPackages
        } else {
            Self::AllPackages
        }
    }

    pub fn scope(self) -> QueryScope {
        match self {
            Self::AllSystems | Self::OutOfDateSystems | Self::PhysicalSystems => QueryScope::Systems,
            Self::AllPackages | Self::UpgradablePackages | Self::ExtraPackages => QueryScope::Packages,
        }
    }

    /// Remote method backing this listing.
    pub fn method(self) -> &'static str {
        match self {
            Self::AllSystems => "system.listSystems",
            Self::OutOfDateSystems => "system.listOutOfDateSystems",
            Self::PhysicalSystems => "system.listPhysicalSystems",
            Self::AllPackages => "system.listPackages",
            Self::UpgradablePackages => "system.listLatestUpgradablePackages",
            Self::ExtraPackages => "system.listExtraPackages",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AllSystems => "all systems",
            Self::OutOfDateSystems => "out-of-date systems",
            Self::PhysicalSystems => "physical systems",
            Self::AllPackages => "installed packages",
            Self::UpgradablePackages => "upgradable packages",
            Self::ExtraPackages => "extra packages",
        };
        f.write_str(label)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Projected names plus their count. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    items: Vec<String>,
    count: usize,
}

impl ProjectionResult {
    pub fn new(items: Vec<String>) -> Self {
        let count = items.len();
        Self { items, count }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}
