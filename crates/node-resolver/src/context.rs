//! Host state handed to resolvers
//!
//! The engine never looks inside a [`ResolveContext`]. It passes the same
//! reference to every node resolver and every dynamic port builder of a
//! pass, so a host can expose whatever a node needs to compute its value:
//! a clock, a unit system, a cache of loaded assets.
//!
//! ```ignore
//! let context = ResolveContext::new().with("scale", 2.0_f64);
//!
//! let resolver = CallbackResolver::new(|_node, inputs, _ty, context| {
//!     let scale = context.get::<f64>("scale").copied().unwrap_or(1.0);
//!     let value = inputs.get("value").and_then(Value::as_f64).unwrap_or(0.0);
//!     Ok(OutputValues::from([("value".to_string(), json!(value * scale))]))
//! });
//! ```

use std::any::Any;
use std::collections::HashMap;

/// Keyed values of any `Send + Sync` type, read back by type
pub struct ResolveContext {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Store `value` under `key`, replacing what was there
    pub fn set<T: Send + Sync + 'static>(&mut self, key: &str, value: T) {
        self.values.insert(key.to_string(), Box::new(value));
    }

    pub fn with<T: Send + Sync + 'static>(mut self, key: &str, value: T) -> Self {
        self.set(key, value);
        self
    }

    /// The value under `key`, if it was stored as a `T`
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ResolveContext").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_and_get() {
        let mut ctx = ResolveContext::new();
        ctx.set("name", "hello".to_string());

        assert_eq!(ctx.get::<String>("name"), Some(&"hello".to_string()));
        assert!(ctx.has("name"));
        assert!(!ctx.has("missing"));
    }

    #[test]
    fn test_type_mismatch_returns_none() {
        let ctx = ResolveContext::new().with("count", 42u32);

        assert!(ctx.get::<String>("count").is_none());
        assert_eq!(ctx.get::<u32>("count"), Some(&42));
    }

    #[test]
    fn test_arc_values() {
        let value = Arc::new(vec![1, 2, 3]);
        let ctx = ResolveContext::new().with("data", value.clone());

        let retrieved = ctx.get::<Arc<Vec<i32>>>("data").unwrap();
        assert_eq!(retrieved.as_ref(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_debug_lists_keys() {
        let ctx = ResolveContext::new().with("b", 1u8).with("a", 2u8);
        assert_eq!(format!("{:?}", ctx), r#"ResolveContext { keys: ["a", "b"] }"#);
    }
}
