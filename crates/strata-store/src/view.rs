//! Live views into the user layer and placeholder chains.
//!
//! A [`View`] wraps an object node that belongs to the user layer. It is
//! either *live*, holding a mutable borrow of that node, or a *placeholder*
//! standing in for a key that does not exist yet. A placeholder remembers its
//! parent and the key it would occupy. The first write through it attaches
//! an empty object under that key in the parent (materializing the parent
//! first if it is itself a placeholder), after which the view is live.
//!
//! Reads never create anything: a placeholder answers every read with an
//! empty result or another placeholder.

use std::fmt;
use std::mem;

use serde::Serialize;
use serde_json::{Map, Value};
use strata_tree::{encode, is_truthy, kind};
use tracing::trace;

use crate::error::{ConfigError, Result};

/// Anything a placeholder can hang off: the store's user layer or another view.
pub(crate) trait Materialize {
    /// Make sure the node exists in the user layer and return it.
    fn materialize(&mut self) -> &mut Map<String, Value>;
}

pub(crate) enum Parent<'a> {
    Borrowed(&'a mut (dyn Materialize + 'a)),
    Owned(Box<View<'a>>),
}

enum Node<'a> {
    Live(&'a mut Map<String, Value>),
    Pending { parent: Parent<'a>, key: String },
    // Only observed while a pending node is being attached.
    Detached,
}

/// A view over an object node of the user layer, or a placeholder for one.
pub struct View<'a> {
    node: Node<'a>,
    placeholders: bool,
}

/// The result of reading one key.
#[derive(Debug)]
pub enum Item<'a> {
    /// An object node (live or placeholder).
    Object(View<'a>),
    /// Any non-object value, borrowed in place from the user layer.
    Value(&'a mut Value),
}

fn attach<'a>(parent: Parent<'a>, key: String) -> &'a mut Map<String, Value> {
    let map = match parent {
        Parent::Borrowed(parent) => parent.materialize(),
        Parent::Owned(view) => (*view).into_object(),
    };
    trace!(key = %key, "materializing placeholder");
    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
        .expect("placeholder slot holds an object after attach")
}

impl<'a> View<'a> {
    pub(crate) fn live(map: &'a mut Map<String, Value>, placeholders: bool) -> Self {
        Self {
            node: Node::Live(map),
            placeholders,
        }
    }

    pub(crate) fn pending(parent: Parent<'a>, key: &str, placeholders: bool) -> Self {
        Self {
            node: Node::Pending {
                parent,
                key: key.to_owned(),
            },
            placeholders,
        }
    }

    /// Returns `true` while nothing has been written through this view.
    pub fn is_placeholder(&self) -> bool {
        !matches!(self.node, Node::Live(_))
    }

    /// The wrapped node, or `None` for a placeholder.
    pub fn raw(&self) -> Option<&Map<String, Value>> {
        match &self.node {
            Node::Live(map) => Some(&**map),
            _ => None,
        }
    }

    /// Mutable access to the wrapped node, or `None` for a placeholder.
    ///
    /// Changes made here land directly in the user layer.
    pub fn raw_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match &mut self.node {
            Node::Live(map) => Some(&mut **map),
            _ => None,
        }
    }

    /// A detached copy of the wrapped node.
    pub fn to_value(&self) -> Option<Value> {
        self.raw().map(|map| Value::Object(map.clone()))
    }

    /// Empty nodes and placeholders are falsy.
    pub fn is_truthy(&self) -> bool {
        self.raw().is_some_and(|map| !map.is_empty())
    }

    pub fn len(&self) -> usize {
        self.raw().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw().is_some_and(|map| map.contains_key(key))
    }

    /// Keys of the wrapped node in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.raw()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.raw().into_iter().flat_map(|map| map.iter())
    }

    /// Copy of the value under `key`, or `fallback` if there is none.
    pub fn get(&self, key: &str, fallback: Value) -> Value {
        self.raw()
            .and_then(|map| map.get(key))
            .cloned()
            .unwrap_or(fallback)
    }

    /// Read `key`, borrowing this view.
    pub fn item(&mut self, key: &str) -> Result<Item<'_>> {
        let placeholders = self.placeholders;
        self.child(key, placeholders)
    }

    /// Read `key`, consuming this view. Useful for walking down several levels.
    pub fn into_item(self, key: &str) -> Result<Item<'a>> {
        let placeholders = self.placeholders;
        self.into_child(key, placeholders)
    }

    /// Store `value` under `key`, materializing this view if needed.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = encode(value).map_err(|e| ConfigError::encoding(key, e))?;
        self.insert(key, value);
        Ok(())
    }

    /// Remove `key` from the wrapped node and return its value.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        match &mut self.node {
            Node::Live(map) => map.remove(key).ok_or_else(|| ConfigError::not_found(key)),
            _ => Err(ConfigError::not_found(key)),
        }
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.materialize().insert(key.to_owned(), value);
    }

    // Whether `key` resolves to an existing child. `Ok(false)` means the
    // caller should hand out a placeholder.
    fn probe(&self, key: &str, placeholders: bool) -> Result<bool> {
        match &self.node {
            Node::Live(map) if map.contains_key(key) => Ok(true),
            Node::Live(_) if !placeholders => Err(ConfigError::not_found(key)),
            _ => Ok(false),
        }
    }

    pub(crate) fn child(&mut self, key: &str, placeholders: bool) -> Result<Item<'_>> {
        if self.probe(key, placeholders)? {
            return match &mut self.node {
                Node::Live(map) => map
                    .get_mut(key)
                    .map(|value| Item::wrap(value, placeholders))
                    .ok_or_else(|| ConfigError::not_found(key)),
                _ => Err(ConfigError::not_found(key)),
            };
        }
        Ok(Item::Object(View::pending(
            Parent::Borrowed(self),
            key,
            placeholders,
        )))
    }

    pub(crate) fn into_child(self, key: &str, placeholders: bool) -> Result<Item<'a>> {
        if self.probe(key, placeholders)? {
            return match self.node {
                Node::Live(map) => map
                    .get_mut(key)
                    .map(|value| Item::wrap(value, placeholders))
                    .ok_or_else(|| ConfigError::not_found(key)),
                _ => Err(ConfigError::not_found(key)),
            };
        }
        Ok(Item::Object(View::pending(
            Parent::Owned(Box::new(self)),
            key,
            placeholders,
        )))
    }

    fn into_object(self) -> &'a mut Map<String, Value> {
        match self.node {
            Node::Live(map) => map,
            Node::Pending { parent, key } => attach(parent, key),
            Node::Detached => unreachable!("detached views are never handed out"),
        }
    }
}

impl Materialize for View<'_> {
    fn materialize(&mut self) -> &mut Map<String, Value> {
        if let Node::Pending { .. } = self.node {
            if let Node::Pending { parent, key } = mem::replace(&mut self.node, Node::Detached) {
                self.node = Node::Live(attach(parent, key));
            }
        }
        match &mut self.node {
            Node::Live(map) => &mut **map,
            _ => unreachable!("materialized views are live"),
        }
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Live(map) => f.debug_tuple("View").field(map).finish(),
            Node::Pending { key, .. } => f.debug_struct("Placeholder").field("key", key).finish(),
            Node::Detached => f.write_str("Detached"),
        }
    }
}

// Placeholders compare unequal to everything, including other placeholders.
impl PartialEq<Map<String, Value>> for View<'_> {
    fn eq(&self, other: &Map<String, Value>) -> bool {
        self.raw().is_some_and(|map| map == other)
    }
}

impl PartialEq<Value> for View<'_> {
    fn eq(&self, other: &Value) -> bool {
        match other {
            Value::Object(other) => self == other,
            _ => false,
        }
    }
}

impl<'b> PartialEq<View<'b>> for View<'_> {
    fn eq(&self, other: &View<'b>) -> bool {
        other.raw().is_some_and(|map| self == map)
    }
}

impl<'a> Item<'a> {
    pub(crate) fn wrap(value: &'a mut Value, placeholders: bool) -> Self {
        match value {
            Value::Object(map) => Item::Object(View::live(map, placeholders)),
            other => Item::Value(other),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Item::Object(view) if view.is_placeholder())
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Item::Object(view) => view.is_truthy(),
            Item::Value(value) => is_truthy(value),
        }
    }

    /// A detached copy of the value, or `None` for a placeholder.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Item::Object(view) => view.to_value(),
            Item::Value(value) => Some((**value).clone()),
        }
    }

    /// JSON type name of the item. Placeholders report `"object"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Object(_) => "object",
            Item::Value(value) => kind(value),
        }
    }

    /// The object view, or the non-object value handed back unchanged.
    pub fn into_view(self) -> std::result::Result<View<'a>, &'a mut Value> {
        match self {
            Item::Object(view) => Ok(view),
            Item::Value(value) => Err(value),
        }
    }

    /// The non-object value, or `None` if this is an object.
    pub fn into_value(self) -> Option<&'a mut Value> {
        match self {
            Item::Object(_) => None,
            Item::Value(value) => Some(value),
        }
    }
}

impl PartialEq<Value> for Item<'_> {
    fn eq(&self, other: &Value) -> bool {
        match self {
            Item::Object(view) => view == other,
            Item::Value(value) => **value == *other,
        }
    }
}

/// Turn an item into a view, failing with [`ConfigError::NotAnObject`] when
/// the value under `key` is not an object.
pub(crate) fn expect_object<'a>(item: Item<'a>, key: &str) -> Result<View<'a>> {
    item.into_view().map_err(|value| ConfigError::NotAnObject {
        key: key.to_owned(),
        kind: kind(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Root(Map<String, Value>);

    impl Materialize for Root {
        fn materialize(&mut self) -> &mut Map<String, Value> {
            &mut self.0
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn live_view_reads() {
        let mut map = object(json!({"a": 1, "b": {"c": [1, 2]}}));
        let view = View::live(&mut map, false);
        assert!(!view.is_placeholder());
        assert!(view.is_truthy());
        assert_eq!(view.len(), 2);
        assert_eq!(view.keys(), vec!["a", "b"]);
        assert!(view.contains("a"));
        assert!(!view.contains("z"));
        assert_eq!(view.get("a", Value::Null), json!(1));
        assert_eq!(view.get("z", json!("fallback")), json!("fallback"));
        assert_eq!(view.iter().count(), 2);
    }

    #[test]
    fn nested_items_are_views_and_scalars_are_values() {
        let mut map = object(json!({"a": 1, "b": {"c": "x"}}));
        let mut view = View::live(&mut map, false);

        assert!(matches!(view.item("a").unwrap(), Item::Value(v) if *v == json!(1)));
        let b = view.item("b").unwrap();
        assert_eq!(b.kind(), "object");
        assert_eq!(b, json!({"c": "x"}));
    }

    #[test]
    fn missing_key_without_placeholders() {
        let mut map = object(json!({}));
        let mut view = View::live(&mut map, false);
        let err = view.item("missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn writes_land_in_the_wrapped_node() {
        let mut map = object(json!({"n": {"x": 1}}));
        {
            let mut view = View::live(&mut map, false);
            let mut n = view.item("n").unwrap().into_view().unwrap();
            n.set("y", &2).unwrap();
            assert_eq!(n.remove("x").unwrap(), json!(1));
            assert!(n.remove("x").unwrap_err().is_not_found());
        }
        assert_eq!(Value::Object(map), json!({"n": {"y": 2}}));
    }

    #[test]
    fn in_place_array_mutation() {
        let mut map = object(json!({"list": [1]}));
        {
            let mut view = View::live(&mut map, false);
            let list = view.item("list").unwrap().into_value().unwrap();
            list.as_array_mut().unwrap().push(json!(2));
        }
        assert_eq!(map["list"], json!([1, 2]));
    }

    #[test]
    fn placeholder_reads_create_nothing() {
        let mut root = Root(Map::new());
        {
            let mut a = View::pending(Parent::Borrowed(&mut root), "a", true);
            assert!(a.is_placeholder());
            assert!(!a.is_truthy());
            assert_eq!(a.len(), 0);
            assert!(a.keys().is_empty());
            assert!(!a.contains("b"));
            assert_eq!(a.get("b", json!(7)), json!(7));
            assert!(a.to_value().is_none());
            assert!(a.raw().is_none());
            assert!(a.item("b").unwrap().is_placeholder());
        }
        assert!(root.0.is_empty());
    }

    #[test]
    fn placeholder_chain_materializes_on_write() {
        let mut root = Root(Map::new());
        {
            let mut a = View::pending(Parent::Borrowed(&mut root), "a", true);
            {
                let mut b = a.item("b").unwrap().into_view().unwrap();
                assert!(b.is_placeholder());
                b.set("c", "so fake").unwrap();
                assert!(!b.is_placeholder());
            }
            assert!(!a.is_placeholder());
            assert_eq!(a, json!({"b": {"c": "so fake"}}));
        }
        assert_eq!(Value::Object(root.0), json!({"a": {"b": {"c": "so fake"}}}));
    }

    #[test]
    fn owned_chain_materializes_on_write() {
        let mut root = Root(Map::new());
        {
            let a = View::pending(Parent::Borrowed(&mut root), "a", true);
            let b = a.into_item("b").unwrap().into_view().unwrap();
            let mut c = b.into_item("c").unwrap().into_view().unwrap();
            c.set("d", &[1, 2]).unwrap();
        }
        assert_eq!(Value::Object(root.0), json!({"a": {"b": {"c": {"d": [1, 2]}}}}));
    }

    #[test]
    fn sibling_placeholders_share_a_materialized_parent() {
        let mut root = Root(Map::new());
        {
            let mut a = View::pending(Parent::Borrowed(&mut root), "a", true);
            a.item("x").unwrap().into_view().unwrap().set("v", &1).unwrap();
            a.item("y").unwrap().into_view().unwrap().set("v", &2).unwrap();
        }
        assert_eq!(
            Value::Object(root.0),
            json!({"a": {"x": {"v": 1}, "y": {"v": 2}}})
        );
    }

    #[test]
    fn placeholder_encoding_failure_does_not_materialize() {
        let mut root = Root(Map::new());
        {
            let mut a = View::pending(Parent::Borrowed(&mut root), "a", true);
            let mut bad = std::collections::HashMap::new();
            bad.insert((1, 2), "tuple key");
            let err = a.set("bad", &bad).unwrap_err();
            assert!(matches!(err, ConfigError::Encoding { ref key, .. } if key == "bad"));
            assert!(a.is_placeholder());
        }
        assert!(root.0.is_empty());
    }

    #[test]
    fn equality() {
        let mut left = object(json!({"k": [1, {"z": null}]}));
        let mut right = left.clone();
        let mut other = object(json!({"k": []}));
        let l = View::live(&mut left, false);
        let r = View::live(&mut right, false);
        let o = View::live(&mut other, false);

        assert_eq!(l, r);
        assert!(l != o);
        assert!(l == json!({"k": [1, {"z": null}]}));
        assert!(l != json!([1]));

        let mut root = Root(Map::new());
        let p = View::pending(Parent::Borrowed(&mut root), "p", true);
        assert!(p != json!({}));
        assert!(p != Map::new());
    }

    #[test]
    fn raw_mut_escape_hatch() {
        let mut map = object(json!({"a": 1}));
        {
            let mut view = View::live(&mut map, false);
            view.raw_mut().unwrap().insert("b".into(), json!(true));
        }
        assert_eq!(map["b"], json!(true));
    }

    #[test]
    fn expect_object_reports_kind() {
        let mut value = json!("text");
        let err = expect_object(Item::wrap(&mut value, false), "name").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotAnObject { ref key, kind: "string" } if key == "name"
        ));
    }

    #[test]
    fn debug_shows_placeholder_key() {
        let mut root = Root(Map::new());
        let p = View::pending(Parent::Borrowed(&mut root), "pending", true);
        assert!(format!("{p:?}").contains("pending"));
    }
}
