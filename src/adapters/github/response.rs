//! Path-tracking access into GraphQL `data` payloads.
//!
//! Every accessor that requires a value fails with
//! [`TaskManagerError::MalformedResponse`] naming the full dotted path of the
//! field that was missing or had the wrong type.

use serde_json::Value;

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

/// A JSON value together with the path it was reached by.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Node<'a> {
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            path: String::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn malformed(&self, key: &str) -> TaskManagerError {
        TaskManagerError::malformed(self.child_path(key))
    }

    /// Required, non-null child.
    pub fn get(&self, key: &str) -> TaskManagerResult<Node<'a>> {
        self.get_opt(key).ok_or_else(|| self.malformed(key))
    }

    /// Child that may be absent or null.
    pub fn get_opt(&self, key: &str) -> Option<Node<'a>> {
        match self.value.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(Node {
                value,
                path: self.child_path(key),
            }),
        }
    }

    pub fn str(&self, key: &str) -> TaskManagerResult<&'a str> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| self.malformed(key))
    }

    /// String child that may be absent or null, but not another type.
    pub fn opt_str(&self, key: &str) -> TaskManagerResult<Option<&'a str>> {
        match self.value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.malformed(key)),
        }
    }

    pub fn u64(&self, key: &str) -> TaskManagerResult<u64> {
        self.value
            .get(key)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.malformed(key))
    }

    /// The items of a connection's `nodes` list. Null entries are skipped.
    pub fn nodes(&self, key: &str) -> TaskManagerResult<Vec<Node<'a>>> {
        let connection = self.get(key)?;
        let list = connection.get("nodes")?;
        let items = list
            .value
            .as_array()
            .ok_or_else(|| TaskManagerError::malformed(list.path.clone()))?;
        Ok(items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, value)| Node {
                value,
                path: format!("{}[{i}]", list.path),
            })
            .collect())
    }

    /// True for `{}`, which is what an inline fragment yields on a
    /// non-matching type.
    pub fn is_empty_object(&self) -> bool {
        self.value.as_object().is_some_and(serde_json::Map::is_empty)
    }
}
