use serde::Serialize;
use serde_json::{Value, json};

use super::adaptors::jobs::spec::{JobEntry, NAME_MAX_LENGTH};

pub const RESOURCE_NAME: &str = "job";

const LIST_METHODS: [&str; 4] = ["get", "post", "put", "delete"];
const DETAIL_METHODS: [&str; 4] = ["get", "put", "patch", "delete"];

/// How the job resource is exposed: where it is mounted and whether
/// write verbs echo the stored object back.
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    pub api_prefix: String,
    pub always_return_data: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JobBundle {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub resource_uri: String,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JobList {
    pub meta: ListMeta,
    pub objects: Vec<JobBundle>,
}

#[derive(Debug, Serialize)]
pub struct JobSet {
    pub objects: Vec<JobBundle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_found: Vec<String>,
}

impl ResourceOptions {
    pub fn detail_uri(&self, id: i64) -> String {
        format!("{}/{}/{}/", self.api_prefix, RESOURCE_NAME, id)
    }

    pub fn bundle(&self, entry: JobEntry) -> JobBundle {
        JobBundle {
            resource_uri: self.detail_uri(entry.id),
            id: entry.id,
            name: entry.name,
            description: entry.description,
        }
    }

    pub fn list(&self, entries: Vec<JobEntry>) -> JobList {
        let objects: Vec<JobBundle> = entries.into_iter().map(|e| self.bundle(e)).collect();
        JobList {
            meta: ListMeta {
                total_count: objects.len(),
            },
            objects,
        }
    }

    /// Walks `keys` in request order: each key lands in `objects` when a
    /// fetched row matches it, otherwise in `not_found`.
    pub fn set(&self, keys: &[SetKey], rows: &[JobEntry]) -> JobSet {
        let mut objects = Vec::new();
        let mut not_found = Vec::new();
        for key in keys {
            let row = key.id.and_then(|id| rows.iter().find(|row| row.id == id));
            match row {
                Some(row) => objects.push(self.bundle(row.clone())),
                None => not_found.push(key.raw.clone()),
            }
        }
        JobSet { objects, not_found }
    }
}

/// One piece of a `1;2;3` set key; `id` is `None` when the piece is not an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetKey {
    pub raw: String,
    pub id: Option<i64>,
}

pub fn parse_id_set(raw: &str) -> Vec<SetKey> {
    raw.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|piece| SetKey {
            raw: piece.to_string(),
            id: piece.parse::<i64>().ok(),
        })
        .collect()
}

/// Distinct ids among `keys`, first occurrence first.
pub fn set_ids(keys: &[SetKey]) -> Vec<i64> {
    let mut ids = Vec::new();
    for id in keys.iter().filter_map(|k| k.id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

pub fn schema() -> Value {
    json!({
        "allowed_list_http_methods": LIST_METHODS,
        "allowed_detail_http_methods": DETAIL_METHODS,
        "default_format": "application/json",
        "fields": {
            "id": {
                "type": "integer",
                "nullable": false,
                "blank": true,
                "readonly": false,
                "unique": true,
                "help_text": "Integer data. Ex: 2673",
            },
            "name": {
                "type": "string",
                "nullable": false,
                "blank": false,
                "readonly": false,
                "unique": false,
                "max_length": NAME_MAX_LENGTH,
                "help_text": "Unicode string data. Ex: \"Hello World\"",
            },
            "description": {
                "type": "string",
                "nullable": true,
                "blank": true,
                "readonly": false,
                "unique": false,
                "help_text": "Unicode string data. Ex: \"Hello World\"",
            },
            "resource_uri": {
                "type": "string",
                "nullable": false,
                "blank": false,
                "readonly": true,
                "unique": false,
                "help_text": "Unicode string data. Ex: \"Hello World\"",
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ResourceOptions {
        ResourceOptions {
            api_prefix: "/api/jobs".into(),
            always_return_data: false,
        }
    }

    #[test]
    fn bundle_carries_resource_uri() {
        let bundle = options().bundle(JobEntry {
            id: 7,
            name: "Baker".into(),
            description: None,
        });
        assert_eq!(bundle.resource_uri, "/api/jobs/job/7/");
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["description"], Value::Null);
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn list_counts_objects() {
        let entries = vec![
            JobEntry { id: 1, name: "a".into(), description: None },
            JobEntry { id: 2, name: "b".into(), description: Some("B".into()) },
        ];
        let value = serde_json::to_value(options().list(entries)).unwrap();
        assert_eq!(value["meta"]["total_count"], 2);
        assert_eq!(value["objects"][1]["resource_uri"], "/api/jobs/job/2/");
    }

    #[test]
    fn root_mount_has_no_prefix() {
        let opts = ResourceOptions {
            api_prefix: String::new(),
            always_return_data: true,
        };
        assert_eq!(opts.detail_uri(3), "/job/3/");
    }

    #[test]
    fn id_sets_split_on_semicolons() {
        let keys = parse_id_set("1;x;3;1;");
        let raw: Vec<&str> = keys.iter().map(|k| k.raw.as_str()).collect();
        assert_eq!(raw, vec!["1", "x", "3", "1"]);
        assert_eq!(keys[1].id, None);
        assert_eq!(set_ids(&keys), vec![1, 3]);
    }

    #[test]
    fn set_follows_request_order() {
        let rows = vec![
            JobEntry { id: 1, name: "a".into(), description: None },
            JobEntry { id: 3, name: "c".into(), description: None },
        ];
        let keys = parse_id_set("3;9;1;x");
        let set = options().set(&keys, &rows);
        let ids: Vec<i64> = set.objects.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(set.not_found, vec!["9".to_string(), "x".to_string()]);
    }

    #[test]
    fn set_omits_empty_not_found() {
        let value = serde_json::to_value(options().set(&[], &[])).unwrap();
        assert!(value.get("not_found").is_none());
        assert_eq!(value["objects"], json!([]));
    }

    #[test]
    fn schema_describes_every_field() {
        let s = schema();
        for field in ["id", "name", "description", "resource_uri"] {
            assert!(s["fields"].get(field).is_some(), "{field} missing");
        }
        assert_eq!(s["fields"]["name"]["max_length"], NAME_MAX_LENGTH);
    }
}
