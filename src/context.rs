use indexmap::IndexMap;
use serde_json::Value;
use std::time::Instant;

/// Context key holding the workflow input.
pub const INPUT_KEY: &str = "input";

/// Accumulated state of a single workflow run.
///
/// An ordered map from keys to values, seeded with [`INPUT_KEY`]. Each
/// executed node adds its result under its own id. Entries are never
/// removed; inserting an existing key replaces the value in place.
#[derive(Debug, Clone)]
pub struct Context {
    data: IndexMap<String, Value>,
    start_time: Instant,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl Context {
    /// Creates a context seeded with `input` under [`INPUT_KEY`].
    pub fn new(input: Value) -> Self {
        let mut data = IndexMap::new();
        data.insert(INPUT_KEY.to_string(), input);
        Self {
            data,
            start_time: Instant::now(),
        }
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn input(&self) -> Option<&Value> {
        self.data.get(INPUT_KEY)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Walks a dotted path: the first segment selects a context entry, the
    /// rest descend into mappings by key or into sequences by index.
    ///
    /// ```
    /// use nagare::Context;
    /// use serde_json::json;
    ///
    /// let ctx = Context::new(json!({"users": [{"name": "Ada"}]}));
    /// assert_eq!(ctx.lookup("input.users.0.name"), Some(&json!("Ada")));
    /// assert_eq!(ctx.lookup("input.users.1"), None);
    /// ```
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
