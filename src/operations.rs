//! The three invocable operations and how they map onto queries.

use crate::config::ListType;
use crate::output::ModuleResult;

use serde_json::{json, Map, Value as JsonValue};
use swquery_spacewalk::{
    query_with, run_query, ClientConfig, Credentials, QueryKind, QueryScope, RpcTransport,
    SpacewalkClient,
};

/// Options every operation accepts besides its own selectors.
const CONNECTION_OPTIONS: &[&str] = &["url", "user", "password", "timeout_secs", "insecure", "no_proxy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SatSystemList,
    SwSystemList,
    SwSystemPackages,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::SatSystemList => "sat_system_list",
            Self::SwSystemList => "sw_system_list",
            Self::SwSystemPackages => "sw_system_packages",
        }
    }

    /// Server wording used in connection failures.
    pub fn server_flavor(self) -> &'static str {
        match self {
            Self::SatSystemList => "satellite",
            Self::SwSystemList | Self::SwSystemPackages => "spacewalk",
        }
    }

    /// Key the projected list is reported under.
    pub fn result_key(self) -> &'static str {
        match self {
            Self::SatSystemList => "system_list",
            Self::SwSystemList => "systems",
            Self::SwSystemPackages => "packages",
        }
    }

    fn selector_names(self) -> &'static [&'static str] {
        match self {
            Self::SatSystemList => &["listtype"],
            Self::SwSystemList => &["out_of_date", "physical"],
            Self::SwSystemPackages => &["name", "upgradable", "extra"],
        }
    }

    /// Every option this operation recognises.
    pub fn option_names(self) -> Vec<&'static str> {
        let mut names: Vec<_> = CONNECTION_OPTIONS
            .iter()
            .chain(self.selector_names())
            .copied()
            .collect();
        names.sort_unstable();
        names
    }

    pub fn accepts(self, key: &str) -> bool {
        CONNECTION_OPTIONS
            .iter()
            .chain(self.selector_names())
            .any(|name| *name == key)
    }

    pub fn success_msg(kind: QueryKind) -> &'static str {
        match kind.scope() {
            QueryScope::Systems => "System list successful.",
            QueryScope::Packages => "Package list successful.",
        }
    }
}

/// Listing selectors after defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    pub listtype: ListType,
    pub out_of_date: bool,
    pub physical: bool,
    pub name: Option<String>,
    pub upgradable: bool,
    pub extra: bool,
}

/// A fully resolved request: what to run and where.
#[derive(Debug, Clone)]
pub struct Invocation {
    op: Operation,
    config: ClientConfig,
    credentials: Credentials,
    selectors: Selectors,
}

impl Invocation {
    pub fn new(op: Operation, config: ClientConfig, credentials: Credentials, selectors: Selectors) -> Self {
        Self { op, config, credentials, selectors }
    }

    pub fn operation(&self) -> Operation {
        self.op
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn kind(&self) -> QueryKind {
        let s = &self.selectors;
        match self.op {
            Operation::SatSystemList => match s.listtype {
                ListType::All => QueryKind::AllSystems,
                ListType::Ood => QueryKind::OutOfDateSystems,
            },
            Operation::SwSystemList => QueryKind::systems(s.out_of_date, s.physical),
            Operation::SwSystemPackages => QueryKind::packages(s.upgradable, s.extra),
        }
    }

    /// System name for package listings.
    pub fn target(&self) -> Option<&str> {
        match self.op {
            Operation::SwSystemPackages => self.selectors.name.as_deref(),
            _ => None,
        }
    }

    /// Parameters echoed back in the result. Never includes the password,
    /// and the URL loses any embedded credentials.
    pub fn params(&self) -> Map<String, JsonValue> {
        let s = &self.selectors;
        let mut params = Map::new();
        if self.op == Operation::SwSystemPackages {
            params.insert("system".into(), json!(s.name));
        }
        params.insert("url".into(), json!(self.config.display_url()));
        params.insert("user".into(), json!(self.credentials.user));
        match self.op {
            Operation::SatSystemList => {
                params.insert("listtype".into(), json!(s.listtype.as_str()));
            }
            Operation::SwSystemList => {
                params.insert("out_of_date".into(), json!(s.out_of_date));
                params.insert("physical".into(), json!(s.physical));
            }
            Operation::SwSystemPackages => {
                params.insert("upgradable".into(), json!(s.upgradable));
                params.insert("extra".into(), json!(s.extra));
            }
        }
        params
    }
}

/// Run the invocation over HTTP.
pub async fn execute(inv: &Invocation) -> ModuleResult {
    let kind = inv.kind();
    log::debug!("{} selected {kind}", inv.op.name());
    let outcome = run_query(&inv.config, &inv.credentials, kind, inv.target()).await;
    ModuleResult::from_outcome(inv, kind, outcome)
}

/// Run the invocation over an existing client.
pub async fn execute_with<T: RpcTransport>(inv: &Invocation, client: &SpacewalkClient<T>) -> ModuleResult {
    let kind = inv.kind();
    let outcome = query_with(client, &inv.credentials, kind, inv.target()).await;
    ModuleResult::from_outcome(inv, kind, outcome)
}
