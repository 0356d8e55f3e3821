// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! String-keyed attributes attached to topology entities.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::TopologyArena;
use crate::keys::TopologyKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DictValue {
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<DictValue>),
}

impl DictValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DictValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for DictValue {
    fn from(s: &str) -> Self {
        DictValue::String(s.to_string())
    }
}

impl From<String> for DictValue {
    fn from(s: String) -> Self {
        DictValue::String(s)
    }
}

impl From<f64> for DictValue {
    fn from(v: f64) -> Self {
        DictValue::Double(v)
    }
}

impl From<i64> for DictValue {
    fn from(v: i64) -> Self {
        DictValue::Int(v)
    }
}

pub type Dictionary = FxHashMap<String, DictValue>;

impl TopologyArena {
    /// Replaces the whole dictionary of an entity.
    pub fn set_dictionary(&mut self, key: TopologyKey, dict: Dictionary) {
        self.dictionaries.insert(key, dict);
    }

    pub fn dictionary(&self, key: TopologyKey) -> Option<&Dictionary> {
        self.dictionaries.get(&key)
    }

    /// Sets one attribute, creating the dictionary on first use.
    pub fn set_attribute(&mut self, key: TopologyKey, name: &str, value: impl Into<DictValue>) {
        self.dictionaries
            .entry(key)
            .or_default()
            .insert(name.to_string(), value.into());
    }

    pub fn attribute(&self, key: TopologyKey, name: &str) -> Option<&DictValue> {
        self.dictionaries.get(&key)?.get(name)
    }

    pub fn remove_dictionary(&mut self, key: TopologyKey) -> Option<Dictionary> {
        self.dictionaries.remove(&key)
    }
}
