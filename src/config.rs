//! Option loading and merging.
//!
//! Sources, later overriding earlier: the JSON args file, then the
//! environment and command-line flags (clap merges those two).

use crate::operations::{Invocation, Operation, Selectors};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use swquery_spacewalk::{ClientConfig, Credentials, SpacewalkError, SpacewalkResult};

/// Wrapper key some host frameworks put around the real options.
const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
/// Prefix of host-internal keys that are never options.
const INTERNAL_PREFIX: &str = "_ansible_";

/// `sat_system_list` listing selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    All,
    Ood,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Ood => "ood",
        }
    }
}

/// Options as found in an args file or collected from flags.
/// Every field is optional until [`RawArgs::resolve`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawArgs {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub listtype: Option<ListType>,
    #[serde(default, deserialize_with = "host_bool")]
    pub out_of_date: Option<bool>,
    #[serde(default, deserialize_with = "host_bool")]
    pub physical: Option<bool>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "host_bool")]
    pub upgradable: Option<bool>,
    #[serde(default, deserialize_with = "host_bool")]
    pub extra: Option<bool>,
    pub timeout_secs: Option<u64>,
    #[serde(default, deserialize_with = "host_bool")]
    pub insecure: Option<bool>,
    #[serde(default, deserialize_with = "host_bool")]
    pub no_proxy: Option<bool>,
}

impl RawArgs {
    /// Read an args file for `op`.
    ///
    /// The file holds one JSON object, optionally wrapped in
    /// `ANSIBLE_MODULE_ARGS`. Host-internal `_ansible_*` keys are dropped;
    /// any other key `op` does not recognise is an error.
    pub fn from_file(op: Operation, path: &Path) -> SpacewalkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SpacewalkError::invalid_argument(format!("Cannot read args file {}: {e}", path.display()))
        })?;
        Self::from_json(op, &text)
    }

    pub fn from_json(op: Operation, text: &str) -> SpacewalkResult<Self> {
        let doc: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| SpacewalkError::invalid_argument(format!("Args file is not valid JSON: {e}")))?;

        let mut map = match doc {
            serde_json::Value::Object(mut map) => match map.remove(WRAPPER_KEY) {
                Some(serde_json::Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(SpacewalkError::invalid_argument(format!(
                        "{WRAPPER_KEY} must be an object"
                    )))
                }
                None => map,
            },
            _ => return Err(SpacewalkError::invalid_argument("Args file must hold a JSON object")),
        };
        map.retain(|k, _| !k.starts_with(INTERNAL_PREFIX));

        let mut unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !op.accepts(k))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(SpacewalkError::invalid_argument(format!(
                "Unsupported parameters for {} module: {}. Supported parameters include: {}",
                op.name(),
                unknown.join(", "),
                op.option_names().join(", ")
            )));
        }

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| SpacewalkError::invalid_argument(format!("Invalid args: {e}")))
    }

    /// Fields set in `other` replace ours.
    pub fn overlay(self, other: RawArgs) -> RawArgs {
        RawArgs {
            url: other.url.or(self.url),
            user: other.user.or(self.user),
            password: other.password.or(self.password),
            listtype: other.listtype.or(self.listtype),
            out_of_date: other.out_of_date.or(self.out_of_date),
            physical: other.physical.or(self.physical),
            name: other.name.or(self.name),
            upgradable: other.upgradable.or(self.upgradable),
            extra: other.extra.or(self.extra),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            insecure: other.insecure.or(self.insecure),
            no_proxy: other.no_proxy.or(self.no_proxy),
        }
    }

    /// Check required options for `op` and build the invocation.
    pub fn resolve(self, op: Operation) -> SpacewalkResult<Invocation> {
        let url = non_empty(self.url);
        let user = non_empty(self.user);
        let password = self.password.filter(|p| !p.expose_secret().is_empty());
        let name = non_empty(self.name);

        let mut missing = Vec::new();
        if op == Operation::SwSystemPackages && name.is_none() {
            missing.push("name");
        }
        if password.is_none() {
            missing.push("password");
        }
        if url.is_none() {
            missing.push("url");
        }
        if user.is_none() {
            missing.push("user");
        }
        let (Some(url), Some(user), Some(password)) = (url, user, password) else {
            return Err(missing_arguments(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_arguments(&missing));
        }

        let mut config = ClientConfig::new(url);
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        config.insecure = self.insecure.unwrap_or(false);
        config.no_proxy = self.no_proxy.unwrap_or(false);

        let selectors = Selectors {
            listtype: self.listtype.unwrap_or_default(),
            out_of_date: self.out_of_date.unwrap_or(false),
            physical: self.physical.unwrap_or(false),
            name,
            upgradable: self.upgradable.unwrap_or(false),
            extra: self.extra.unwrap_or(false),
        };

        Ok(Invocation::new(op, config, Credentials { user, password }, selectors))
    }
}

fn missing_arguments(names: &[&str]) -> SpacewalkError {
    SpacewalkError::invalid_argument(format!("missing required arguments: {}", names.join(", ")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Host-framework boolean: `true/false`, `yes/no`, `on/off`, `y/n`, `1/0`.
pub fn parse_host_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "1" => Ok(true),
        "false" | "no" | "off" | "n" | "0" => Ok(false),
        other => Err(format!("'{other}' is not a valid boolean")),
    }
}

fn host_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(D::Error::custom(format!("'{n}' is not a valid boolean"))),
        },
        serde_json::Value::String(s) => parse_host_bool(&s).map(Some).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("'{other}' is not a valid boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swquery_spacewalk::{QueryKind, SpacewalkErrorKind};

    #[test]
    fn host_booleans() {
        for t in ["yes", "True", "on", "1", "y"] {
            assert_eq!(parse_host_bool(t), Ok(true), "{t}");
        }
        for f in ["no", "FALSE", "off", "0", "n"] {
            assert_eq!(parse_host_bool(f), Ok(false), "{f}");
        }
        assert!(parse_host_bool("maybe").is_err());
    }

    #[test]
    fn args_file_accepts_mixed_boolean_forms() {
        let raw = RawArgs::from_json(
            Operation::SwSystemList,
            r#"{"url":"https://sw/rpc/api","user":"admin","password":"pw","out_of_date":"yes","physical":0}"#,
        )
        .unwrap();
        assert_eq!(raw.out_of_date, Some(true));
        assert_eq!(raw.physical, Some(false));
    }

    #[test]
    fn wrapper_and_internal_keys() {
        let raw = RawArgs::from_json(
            Operation::SatSystemList,
            r#"{"ANSIBLE_MODULE_ARGS":{"url":"https://sat/rpc/api","user":"admin","password":"pw",
                "listtype":"ood","_ansible_check_mode":false,"_ansible_verbosity":2}}"#,
        )
        .unwrap();
        assert_eq!(raw.listtype, Some(ListType::Ood));
        assert_eq!(raw.url.as_deref(), Some("https://sat/rpc/api"));
    }

    #[test]
    fn unknown_keys_are_rejected_per_operation() {
        // `name` is only an option of the package listing.
        let err = RawArgs::from_json(
            Operation::SwSystemList,
            r#"{"url":"u","user":"a","password":"p","name":"web01"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, SpacewalkErrorKind::InvalidArgument);
        assert!(err.message.contains("name"));

        let err = RawArgs::from_json(Operation::SatSystemList, r#"{"colour":"blue"}"#).unwrap_err();
        assert!(err.message.contains("colour"));
    }

    #[test]
    fn listtype_is_restricted() {
        let err = RawArgs::from_json(Operation::SatSystemList, r#"{"listtype":"physical"}"#).unwrap_err();
        assert_eq!(err.kind, SpacewalkErrorKind::InvalidArgument);
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(RawArgs::from_json(Operation::SatSystemList, "[1,2]").is_err());
        assert!(RawArgs::from_json(Operation::SatSystemList, "{not json").is_err());
        assert!(RawArgs::from_json(Operation::SatSystemList, r#"{"ANSIBLE_MODULE_ARGS":3}"#).is_err());
    }

    #[test]
    fn later_sources_override_earlier() {
        let file = RawArgs {
            url: Some("https://file/rpc/api".into()),
            user: Some("file-user".into()),
            physical: Some(true),
            ..RawArgs::default()
        };
        let flags = RawArgs {
            user: Some("flag-user".into()),
            physical: Some(false),
            ..RawArgs::default()
        };
        let merged = file.overlay(flags);
        assert_eq!(merged.url.as_deref(), Some("https://file/rpc/api"));
        assert_eq!(merged.user.as_deref(), Some("flag-user"));
        assert_eq!(merged.physical, Some(false));
    }

    #[test]
    fn missing_required_options_are_named() {
        let err = RawArgs {
            url: Some("https://sw/rpc/api".into()),
            ..RawArgs::default()
        }
        .resolve(Operation::SwSystemPackages)
        .unwrap_err();
        assert_eq!(err.kind, SpacewalkErrorKind::InvalidArgument);
        assert_eq!(err.message, "missing required arguments: name, password, user");

        let err = RawArgs {
            url: Some("https://sw/rpc/api".into()),
            user: Some("admin".into()),
            password: Some(SecretString::new("pw".into())),
            ..RawArgs::default()
        }
        .resolve(Operation::SwSystemPackages)
        .unwrap_err();
        assert_eq!(err.message, "missing required arguments: name");
    }

    #[test]
    fn resolve_builds_config_and_kind() {
        let inv = RawArgs {
            url: Some("https://sw/rpc/api".into()),
            user: Some("admin".into()),
            password: Some(SecretString::new("pw".into())),
            out_of_date: Some(true),
            physical: Some(true),
            timeout_secs: Some(5),
            ..RawArgs::default()
        }
        .resolve(Operation::SwSystemList)
        .unwrap();
        assert_eq!(inv.kind(), QueryKind::OutOfDateSystems);
        assert_eq!(inv.config().timeout_secs, 5);
        assert!(!inv.config().insecure);
    }
}
