//! Structured inputs under test.
//!
//! A [`Candidate`] is an insertion-ordered map from field name to [`Value`].
//! No schema is enforced, mutation may add or drop any field.
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{fmt, iter::FromIterator};

/// Repetition never grows a string past this many bytes.
pub const MAX_STR_LEN: usize = 64 * 1024;

/// `s` repeated `n` times, fewer if that would pass `MAX_STR_LEN`.
pub fn repeat_capped(s: &str, n: usize) -> String {
    if s.is_empty() {
        return String::new();
    }
    let limit = (MAX_STR_LEN / s.len()).max(1);
    s.repeat(n.min(limit))
}

/// Value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Str(String),
    Seq(Vec<Value>),
}

impl Value {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

/// One structured input to the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Candidate {
    fields: Vec<(String, Value)>,
}

impl Candidate {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite `key`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, val: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let val = val.into();
        if let Some(old) = self.get_mut(&key) {
            Some(std::mem::replace(old, val))
        } else {
            self.fields.push((key, val));
            None
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Overlay every field of `other` onto `self`.
    pub fn update(&mut self, other: &Candidate) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.fields.iter_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of field names shared with `other`.
    pub fn overlap(&self, other: &Candidate) -> usize {
        self.keys().filter(|k| other.contains_key(k)).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Candidate {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut c = Candidate::new();
        for (k, v) in iter {
            c.insert(k, v);
        }
        c
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self.fields),
        }
    }
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Candidate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CandidateVisitor;

        impl<'de> Visitor<'de> for CandidateVisitor {
            type Value = Candidate;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a json object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Candidate, A::Error> {
                let mut c = Candidate::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    c.insert(k, v);
                }
                Ok(c)
            }
        }

        deserializer.deserialize_map(CandidateVisitor)
    }
}

/// Build a candidate from `key => value` pairs.
#[macro_export]
macro_rules! candidate {
    ($($key:expr => $value:expr),* $(,)?) => {
        {
            let mut _c = $crate::candidate::Candidate::new();
            $(
                let _ = _c.insert($key, $value);
            )*
            _c
        }
    };
}
