//! System name → system id lookup.

use crate::client::SpacewalkClient;
use crate::error::{SpacewalkError, SpacewalkResult};
use crate::projector::{Record, NAME_FIELD};
use crate::transport::RpcTransport;
use crate::types::{Session, SystemId};

pub const ID_FIELD: &str = "id";

/// Look `name` up in the full inventory visible to `session`.
///
/// `Ok(None)` means no system carries that name; deciding whether that
/// is fatal is up to the caller.
pub async fn resolve_system_id<T: RpcTransport>(
    client: &SpacewalkClient<T>,
    session: &Session,
    name: &str,
) -> SpacewalkResult<Option<SystemId>> {
    let systems = client.list_systems(session).await?;
    find_system_id(&systems, name)
}

/// First record whose `name` equals `name` exactly (case-sensitive).
/// Records without a `name` never match.
pub fn find_system_id<R: Record>(records: &[R], name: &str) -> SpacewalkResult<Option<SystemId>> {
    let mut matches = records
        .iter()
        .filter(|r| r.field(NAME_FIELD).and_then(|v| v.as_str()) == Some(name));

    let Some(first) = matches.next() else {
        return Ok(None);
    };

    let duplicates = matches.count();
    if duplicates > 0 {
        log::debug!("{} systems share the name '{name}', using the first", duplicates + 1);
    }

    first
        .field(ID_FIELD)
        .cloned()
        .map(|id| Some(SystemId(id)))
        .ok_or_else(|| SpacewalkError::malformed(format!("system '{name}' has no '{ID_FIELD}' field")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmlrpc::Value;

    fn system(name: &str, id: i64) -> Value {
        Value::Struct(
            [
                ("name".to_string(), Value::from(name)),
                ("id".to_string(), Value::Int(id)),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn finds_exact_match() {
        let inventory = vec![system("web01", 1), system("db01", 2)];
        assert_eq!(find_system_id(&inventory, "db01").unwrap(), Some(SystemId(Value::Int(2))));
    }

    #[test]
    fn first_duplicate_wins() {
        let inventory = vec![system("web01", 1), system("dup", 7), system("dup", 9)];
        assert_eq!(find_system_id(&inventory, "dup").unwrap(), Some(SystemId(Value::Int(7))));
    }

    #[test]
    fn no_match_is_none() {
        let inventory = vec![system("web01", 1)];
        assert_eq!(find_system_id(&inventory, "ghost01").unwrap(), None);
        assert_eq!(find_system_id(&inventory, "WEB01").unwrap(), None);
        assert_eq!(find_system_id(&inventory, "web01 ").unwrap(), None);
        let empty: Vec<Value> = vec![];
        assert_eq!(find_system_id(&empty, "web01").unwrap(), None);
    }

    #[test]
    fn nameless_records_are_skipped() {
        let nameless = Value::Struct([("id".to_string(), Value::Int(5))].into_iter().collect());
        let inventory = vec![nameless, system("web01", 1)];
        assert_eq!(find_system_id(&inventory, "web01").unwrap(), Some(SystemId(Value::Int(1))));
    }

    #[test]
    fn match_without_id_is_malformed() {
        let idless = Value::Struct([("name".to_string(), Value::from("web01"))].into_iter().collect());
        let err = find_system_id(&[idless], "web01").unwrap_err();
        assert_eq!(err.kind, crate::error::SpacewalkErrorKind::MalformedRecord);
    }
}
