use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::prelude::{Error, Result};

pub const NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct JobEntry {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub name: String,
    pub description: Option<String>,
}

/// The id a store hands out after `id`. Ids at the top of the range have
/// no successor and cannot be stored.
pub fn next_id_after(id: i64) -> Result<i64> {
    id.checked_add(1)
        .ok_or_else(|| Error::bad_request(format!("The id {id} is out of range.")))
}

/// `description: Some(None)` clears the column; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn apply(self, entry: &mut JobEntry) {
        if let Some(name) = self.name {
            entry.name = name;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
    }
}

impl NewJob {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = as_object(value)?;
        let name = match obj.get("name") {
            None | Some(Value::Null) => {
                return Err(Error::bad_request(
                    "The 'name' field has no data and doesn't allow a default or null value.",
                ));
            }
            Some(v) => parse_name(v)?,
        };
        let description = match obj.get("description") {
            None => None,
            Some(v) => parse_description(v)?,
        };
        Ok(NewJob { name, description })
    }

    pub fn into_entry(self, id: i64) -> JobEntry {
        JobEntry {
            id,
            name: self.name,
            description: self.description,
        }
    }
}

impl JobPatch {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = as_object(value)?;
        let name = match obj.get("name") {
            None => None,
            Some(Value::Null) => {
                return Err(Error::bad_request("The 'name' field doesn't allow a null value."));
            }
            Some(v) => Some(parse_name(v)?),
        };
        let description = match obj.get("description") {
            None => None,
            Some(v) => Some(parse_description(v)?),
        };
        Ok(JobPatch { name, description })
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::bad_request("The request body must be a JSON object."))
}

fn parse_name(value: &Value) -> Result<String> {
    let name = value
        .as_str()
        .ok_or_else(|| Error::bad_request("The 'name' field must be a string."))?;
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(Error::bad_request(format!(
            "The 'name' field must be at most {NAME_MAX_LENGTH} characters."
        )));
    }
    Ok(name.to_string())
}

fn parse_description(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(Error::bad_request("The 'description' field must be a string or null.")),
    }
}
