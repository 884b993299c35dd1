use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A state shape an [`ObservableStore`](super::ObservableStore) can hold.
///
/// `Patch` is the partial-update type: typically a struct with the same
/// fields as the state, each wrapped in `Option`. `merge` builds the next
/// snapshot by overwriting the fields the patch supplies and keeping the
/// rest.
///
/// # Examples
///
/// ```
/// use statecast::State;
///
/// #[derive(Clone)]
/// struct Counter {
///     count: i64,
///     label: String,
/// }
///
/// #[derive(Default)]
/// struct CounterPatch {
///     count: Option<i64>,
///     label: Option<String>,
/// }
///
/// impl State for Counter {
///     type Patch = CounterPatch;
///
///     fn merge(&self, patch: &CounterPatch) -> Self {
///         Self {
///             count: patch.count.unwrap_or(self.count),
///             label: patch.label.clone().unwrap_or_else(|| self.label.clone()),
///         }
///     }
/// }
///
/// let next = Counter { count: 0, label: "clicks".into() }
///     .merge(&CounterPatch { count: Some(3), ..Default::default() });
/// assert_eq!(next.count, 3);
/// assert_eq!(next.label, "clicks");
/// ```
pub trait State: Clone + Send + Sync + 'static {
    type Patch: Send + Sync + 'static;

    /// Shallow-merge `patch` into a copy of `self`.
    fn merge(&self, patch: &Self::Patch) -> Self;

    /// Keys named by `patch` that `self` doesn't have. Typed states can't
    /// introduce keys, so the default reports none.
    fn unknown_keys(&self, _patch: &Self::Patch) -> Vec<String> {
        Vec::new()
    }
}

/// States whose fields can be looked up by name.
pub trait Keyed {
    /// The value stored under `key`, or `None` if there is no such key.
    fn field(&self, key: &str) -> Option<Value>;
}

/// A dynamically shaped state: string keys mapped to JSON values.
///
/// Its own type doubles as the patch type; merging copies the snapshot and
/// overwrites the entries the patch carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Only JSON objects convert; anything else is handed back unchanged.
impl TryFrom<Value> for Snapshot {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl State for Snapshot {
    type Patch = Snapshot;

    fn merge(&self, patch: &Snapshot) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &patch.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    fn unknown_keys(&self, patch: &Snapshot) -> Vec<String> {
        patch
            .keys()
            .filter(|key| !self.contains_key(key))
            .cloned()
            .collect()
    }
}

impl Keyed for Snapshot {
    fn field(&self, key: &str) -> Option<Value> {
        self.0.get(key).cloned()
    }
}
