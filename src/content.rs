//! Content tree model for story content.
//!
//! Story content arrives as schemaless JSON. It is classified once into a
//! [`Node`] tree so the walker matches on shape instead of probing for
//! marker attributes at every access, and converted back into JSON before
//! the story is written.

use serde_json::{Map, Value};

/// Reserved infix marking a field as a locale shadow of another field.
pub const SHADOW_INFIX: &str = "__i18n__";

/// Build the shadow key for `field` in `locale` (e.g. `image__i18n__de`).
pub fn shadow_key(field: &str, locale: &str) -> String {
    format!("{}{}{}", field, SHADOW_INFIX, locale)
}

/// True for non-null, non-array JSON objects.
pub fn is_plain_map(value: &Value) -> bool {
    value.is_object()
}

/// True for objects tagged `fieldtype: "asset"` with a non-empty filename.
pub fn is_asset_node(value: &Value) -> bool {
    value.as_object().is_some_and(is_asset_map)
}

fn is_asset_map(map: &Map<String, Value>) -> bool {
    let is_asset = map.get("fieldtype").and_then(Value::as_str) == Some("asset");
    let has_filename = map
        .get("filename")
        .and_then(Value::as_str)
        .is_some_and(|f| !f.is_empty());
    is_asset && has_filename
}

/// A field name plus whether it is a locale shadow.
///
/// The shadow flag is computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    name: String,
    shadow: bool,
}

impl FieldKey {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let shadow = name.contains(SHADOW_INFIX);
        Self { name, shadow }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_shadow(&self) -> bool {
        self.shadow
    }
}

/// A media reference (`fieldtype: "asset"`).
///
/// All attributes are kept verbatim so a cloned asset serializes back exactly
/// as it came in, apart from the meta data values written into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    attrs: Map<String, Value>,
}

impl Asset {
    pub fn filename(&self) -> &str {
        self.attrs
            .get("filename")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Source value of a meta data field, if it is a non-empty string.
    pub fn meta_value(&self, field: &str) -> Option<&str> {
        self.attrs
            .get("meta_data")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Write a meta data value to both the top-level attribute and `meta_data`.
    pub fn set_meta_value(&mut self, field: &str, text: &str) {
        self.attrs
            .insert(field.to_string(), Value::String(text.to_string()));

        let meta = self
            .attrs
            .entry("meta_data")
            .or_insert_with(|| Value::Object(Map::new()));
        if !meta.is_object() {
            *meta = Value::Object(Map::new());
        }
        if let Value::Object(meta) = meta {
            meta.insert(field.to_string(), Value::String(text.to_string()));
        }
    }
}

/// A component block: ordered fields plus its `component` type tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentNode {
    fields: Vec<(FieldKey, Node)>,
}

impl ContentNode {
    /// Component type name, taken from the `component` attribute.
    pub fn component(&self) -> Option<&str> {
        match self.get("component") {
            Some(Node::Scalar(Value::String(name))) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn key_at(&self, index: usize) -> &FieldKey {
        &self.fields[index].0
    }

    pub fn value_at(&self, index: usize) -> &Node {
        &self.fields[index].1
    }

    pub fn value_at_mut(&mut self, index: usize) -> &mut Node {
        &mut self.fields[index].1
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields
            .iter()
            .find(|(key, _)| key.name() == name)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.fields
            .iter_mut()
            .find(|(key, _)| key.name() == name)
            .map(|(_, node)| node)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value under `name`, or append a new field.
    pub fn insert(&mut self, name: &str, node: Node) {
        match self.get_mut(name) {
            Some(existing) => *existing = node,
            None => self.fields.push((FieldKey::new(name), node)),
        }
    }
}

/// Classified content value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Strings, numbers, booleans and null.
    Scalar(Value),
    /// A single asset field.
    Asset(Asset),
    /// A non-empty array whose first element is an asset.
    Assets(Vec<Node>),
    /// Any other array.
    List(Vec<Node>),
    /// Any other object.
    Map(ContentNode),
}

impl Node {
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Node::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// Asset inside an asset field: the asset itself for `position == None`,
    /// or the element at `position` of a multi-asset field.
    pub fn asset_mut(&mut self, position: Option<usize>) -> Option<&mut Asset> {
        match (self, position) {
            (Node::Asset(asset), None) => Some(asset),
            (Node::Assets(items), Some(index)) => match items.get_mut(index) {
                Some(Node::Asset(asset)) => Some(asset),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) if is_asset_map(&map) => Node::Asset(Asset { attrs: map }),
            Value::Object(map) => Node::Map(ContentNode::from(map)),
            Value::Array(items) => {
                let is_assets = items.first().is_some_and(is_asset_node);
                let nodes = items.into_iter().map(Node::from).collect();
                if is_assets {
                    Node::Assets(nodes)
                } else {
                    Node::List(nodes)
                }
            }
            scalar => Node::Scalar(scalar),
        }
    }
}

impl From<Map<String, Value>> for ContentNode {
    fn from(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(name, value)| (FieldKey::new(name), Node::from(value)))
            .collect();
        Self { fields }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Scalar(value) => value,
            Node::Asset(asset) => Value::Object(asset.attrs),
            Node::Assets(items) | Node::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            Node::Map(map) => Value::from(map),
        }
    }
}

impl From<ContentNode> for Value {
    fn from(node: ContentNode) -> Self {
        Value::Object(
            node.fields
                .into_iter()
                .map(|(key, node)| (key.name, Value::from(node)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset_json(filename: &str, alt: &str) -> Value {
        json!({
            "id": 1,
            "alt": alt,
            "fieldtype": "asset",
            "filename": filename,
            "meta_data": { "alt": alt, "title": "" }
        })
    }

    #[test]
    fn test_shadow_key() {
        assert_eq!(shadow_key("image", "de"), "image__i18n__de");
        assert!(FieldKey::new(shadow_key("image", "de")).is_shadow());
        assert!(!FieldKey::new("image").is_shadow());
    }

    #[test]
    fn test_is_plain_map() {
        assert!(is_plain_map(&json!({})));
        assert!(!is_plain_map(&json!([])));
        assert!(!is_plain_map(&Value::Null));
        assert!(!is_plain_map(&json!("text")));
    }

    #[test]
    fn test_is_asset_node() {
        assert!(is_asset_node(&asset_json("https://a.example/x.png", "x")));
        // Empty asset fields have no filename
        assert!(!is_asset_node(&json!({ "fieldtype": "asset", "filename": "" })));
        assert!(!is_asset_node(&json!({ "fieldtype": "asset", "filename": null })));
        assert!(!is_asset_node(&json!({ "fieldtype": "multilink", "filename": "x" })));
        assert!(!is_asset_node(&json!([asset_json("x.png", "x")])));
    }

    #[test]
    fn test_classification() {
        let node = Node::from(json!({
            "component": "page",
            "image": asset_json("a.png", "A"),
            "gallery": [asset_json("b.png", "B"), asset_json("c.png", "C")],
            "body": [{ "component": "teaser" }],
            "empty": [],
            "title": "Home"
        }));

        let map = match &node {
            Node::Map(map) => map,
            other => panic!("expected map, got {:?}", other),
        };
        assert_eq!(map.component(), Some("page"));
        assert!(matches!(map.get("image"), Some(Node::Asset(_))));
        assert!(matches!(map.get("gallery"), Some(Node::Assets(items)) if items.len() == 2));
        assert!(matches!(map.get("body"), Some(Node::List(_))));
        assert!(matches!(map.get("empty"), Some(Node::List(items)) if items.is_empty()));
        assert!(matches!(map.get("title"), Some(Node::Scalar(_))));
    }

    #[test]
    fn test_json_conversion_preserves_content() {
        let original = json!({
            "component": "page",
            "image": asset_json("a.png", "A"),
            "image__i18n__de": asset_json("a.png", "A (de)"),
            "gallery": [asset_json("b.png", "B")],
            "body": [{ "component": "teaser", "count": 3, "flag": true, "none": null }]
        });

        let restored = Value::from(Node::from(original.clone()));
        assert_eq!(restored, original);
    }

    #[test]
    fn test_meta_value_skips_unset_and_empty() {
        let asset = match Node::from(asset_json("a.png", "Hello")) {
            Node::Asset(asset) => asset,
            other => panic!("expected asset, got {:?}", other),
        };

        assert_eq!(asset.filename(), "a.png");
        assert_eq!(asset.meta_value("alt"), Some("Hello"));
        assert_eq!(asset.meta_value("title"), None);
        assert_eq!(asset.meta_value("copyright"), None);
    }

    #[test]
    fn test_set_meta_value_writes_top_level_and_meta_data() {
        let mut node = Node::from(asset_json("a.png", "Hello"));
        let asset = node.asset_mut(None).expect("asset");

        asset.set_meta_value("alt", "Hallo");
        asset.set_meta_value("source", "Quelle");
        assert_eq!(asset.meta_value("alt"), Some("Hallo"));
        assert_eq!(asset.meta_value("source"), Some("Quelle"));

        let value = Value::from(node);
        assert_eq!(value["alt"], json!("Hallo"));
        // Created even though the asset had no top-level "source"
        assert_eq!(value["source"], json!("Quelle"));
        assert_eq!(value["meta_data"]["source"], json!("Quelle"));
    }

    #[test]
    fn test_insert_replaces_or_appends() {
        let mut map = ContentNode::from(
            json!({ "component": "page", "a": 1 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );

        map.insert("a", Node::Scalar(json!(2)));
        map.insert("a__i18n__de", Node::Scalar(json!(3)));

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("a"), Some(&Node::Scalar(json!(2))));
        assert!(map.key_at(2).is_shadow());
    }

    #[test]
    fn test_asset_mut_positions() {
        let mut gallery = Node::from(json!([asset_json("a.png", "A"), { "plain": true }]));

        assert!(gallery.asset_mut(Some(0)).is_some());
        assert!(gallery.asset_mut(Some(1)).is_none());
        assert!(gallery.asset_mut(Some(5)).is_none());
        assert!(gallery.asset_mut(None).is_none());
    }
}
