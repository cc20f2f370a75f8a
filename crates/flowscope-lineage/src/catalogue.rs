//! Argument catalogue: the key -> argument lookup map.
//!
//! Argument lists are registered under a prefix key -- `"<nodeId>"` for a
//! node's ordinary outputs, `"<nodeId>-var"` for loop variable bindings,
//! `"<nodeId>-input"` for loop per-element input projections -- and flattened
//! into dotted lookup keys (`"42.user"`, `"42.user.name"`, ...). Reference
//! bindings in node configurations carry these dotted keys in `bind_value`.
//!
//! Registration is first-writer-wins at both levels: re-registering a prefix
//! is a no-op, and an individual dotted key never overwrites an earlier
//! entry. The depth-first walk discovers nearer scopes before farther ones,
//! so a later, coarser derivation must not replace an earlier, more specific
//! one.

use indexmap::{IndexMap, IndexSet};

use flowscope_core::arg::{Arg, DataType};
use flowscope_core::id::NodeId;

/// Prefix key for a node's ordinary outputs.
pub fn outputs_key(id: NodeId) -> String {
    id.to_string()
}

/// Prefix key for a loop node's variable bindings.
pub fn loop_var_key(id: NodeId) -> String {
    format!("{id}-var")
}

/// Prefix key for a loop node's per-element input projections.
pub fn loop_input_key(id: NodeId) -> String {
    format!("{id}-input")
}

/// First-writer-wins catalogue of referenceable arguments.
#[derive(Debug, Default)]
pub struct ArgCatalogue {
    registered: IndexSet<String>,
    args: IndexMap<String, Arg>,
}

impl ArgCatalogue {
    pub fn new() -> Self {
        ArgCatalogue::default()
    }

    /// Registers an argument list under a prefix key. A no-op when the
    /// prefix was registered before.
    pub fn register(&mut self, prefix: &str, args: &[Arg]) {
        if !self.registered.insert(prefix.to_string()) {
            return;
        }
        self.flatten(prefix, args);
    }

    fn flatten(&mut self, path: &str, args: &[Arg]) {
        for arg in args {
            let key = format!("{path}.{name}", name = arg.name);
            if !arg.sub_args.is_empty() {
                self.flatten(&key, &arg.sub_args);
            }
            self.args.entry(key).or_insert_with(|| arg.clone());
        }
    }

    /// Resolves a dotted key to its argument.
    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.args.get(key)
    }

    /// Rewrites the type of an already-catalogued argument. Used by the
    /// loop-exit promotion, which re-types arguments that were catalogued
    /// earlier in the same walk. A no-op for unknown keys.
    pub fn update_type(&mut self, key: &str, data_type: Option<DataType>, origin: Option<DataType>) {
        if let Some(arg) = self.args.get_mut(key) {
            arg.data_type = data_type;
            arg.origin_data_type = origin;
        }
    }

    /// Consumes the catalogue, yielding the flattened map.
    pub fn into_map(self) -> IndexMap<String, Arg> {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_args() -> Vec<Arg> {
        vec![
            Arg::new("user", DataType::Object).with_sub_args(vec![
                Arg::new("name", DataType::String),
                Arg::new("age", DataType::Integer),
            ]),
            Arg::new("count", DataType::Integer),
        ]
    }

    #[test]
    fn flattens_to_dotted_keys() {
        let mut cat = ArgCatalogue::new();
        cat.register("42", &nested_args());

        assert!(cat.get("42.user").is_some());
        assert_eq!(
            cat.get("42.user.name").unwrap().data_type,
            Some(DataType::String)
        );
        assert_eq!(
            cat.get("42.count").unwrap().data_type,
            Some(DataType::Integer)
        );
        assert!(cat.get("42.missing").is_none());
    }

    #[test]
    fn reregistering_a_prefix_is_a_noop() {
        let mut cat = ArgCatalogue::new();
        cat.register("42", &[Arg::new("x", DataType::Integer)]);
        cat.register("42", &[Arg::new("x", DataType::String)]);
        assert_eq!(cat.get("42.x").unwrap().data_type, Some(DataType::Integer));
    }

    #[test]
    fn distinct_prefixes_coexist() {
        let mut cat = ArgCatalogue::new();
        let loop_id = NodeId(7);
        cat.register(&outputs_key(loop_id), &[Arg::new("x", DataType::Integer)]);
        cat.register(&loop_var_key(loop_id), &[Arg::new("acc", DataType::Number)]);
        cat.register(&loop_input_key(loop_id), &[Arg::loop_index()]);

        assert!(cat.get("7.x").is_some());
        assert!(cat.get("7-var.acc").is_some());
        assert!(cat.get("7-input.INDEX").is_some());
    }

    #[test]
    fn update_type_rewrites_in_place() {
        let mut cat = ArgCatalogue::new();
        cat.register("3", &[Arg::new("items", DataType::String)]);
        cat.update_type(
            "3.items",
            Some(DataType::ArrayString),
            Some(DataType::String),
        );
        let arg = cat.get("3.items").unwrap();
        assert_eq!(arg.data_type, Some(DataType::ArrayString));
        assert_eq!(arg.origin_data_type, Some(DataType::String));

        // unknown key: no panic, no effect
        cat.update_type("3.ghost", Some(DataType::Object), None);
        assert!(cat.get("3.ghost").is_none());
    }

    #[test]
    fn into_map_preserves_registration_order() {
        let mut cat = ArgCatalogue::new();
        cat.register("9", &[Arg::new("b", DataType::String)]);
        cat.register("4", &[Arg::new("a", DataType::String)]);
        let keys: Vec<String> = cat.into_map().keys().cloned().collect();
        assert_eq!(keys, vec!["9.b".to_string(), "4.a".to_string()]);
    }
}
