//! Field projection over server-returned records.

use crate::error::{SpacewalkError, SpacewalkResult};
use crate::xmlrpc::Value;

use std::collections::{BTreeMap, HashMap};

/// Field every listing is projected on.
pub const NAME_FIELD: &str = "name";

/// Anything that exposes named fields.
pub trait Record {
    fn field(&self, name: &str) -> Option<&Value>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Text of `field` from every record, in input order.
pub fn project<R: Record>(records: &[R], field: &str) -> SpacewalkResult<Vec<String>> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let value = record
                .field(field)
                .ok_or_else(|| SpacewalkError::malformed(format!("record {idx} has no '{field}' field")))?;
            value.to_text().ok_or_else(|| {
                SpacewalkError::malformed(format!(
                    "record {idx} field '{field}' is a {}, not a scalar",
                    value.type_name()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpacewalkErrorKind;

    fn record(pairs: &[(&str, Value)]) -> Value {
        Value::Struct(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn preserves_order_and_length() {
        let records = vec![
            record(&[("name", "web01".into()), ("id", 1.into())]),
            record(&[("name", "db01".into()), ("id", 2.into())]),
            record(&[("name", "app01".into()), ("id", 3.into())]),
        ];
        let names = project(&records, NAME_FIELD).unwrap();
        assert_eq!(names, vec!["web01", "db01", "app01"]);
    }

    #[test]
    fn empty_input_projects_to_empty() {
        let records: Vec<Value> = vec![];
        assert!(project(&records, NAME_FIELD).unwrap().is_empty());
    }

    #[test]
    fn missing_field_is_malformed() {
        let records = vec![record(&[("name", "web01".into())]), record(&[("id", 2.into())])];
        let err = project(&records, NAME_FIELD).unwrap_err();
        assert_eq!(err.kind, SpacewalkErrorKind::MalformedRecord);
        assert!(err.message.contains("record 1"));
    }

    #[test]
    fn non_struct_record_is_malformed() {
        let records = vec![Value::from("web01")];
        assert!(project(&records, NAME_FIELD).is_err());
    }

    #[test]
    fn scalars_render_as_text_and_containers_do_not() {
        let records = vec![record(&[("name", 42.into())])];
        assert_eq!(project(&records, NAME_FIELD).unwrap(), vec!["42"]);

        let records = vec![record(&[("name", Value::Array(vec![]))])];
        assert!(project(&records, NAME_FIELD).is_err());
    }

    #[test]
    fn works_on_plain_maps() {
        let mut m = HashMap::new();
        m.insert("name".to_string(), Value::from("curl"));
        assert_eq!(project(&[m], NAME_FIELD).unwrap(), vec!["curl"]);
    }
}
