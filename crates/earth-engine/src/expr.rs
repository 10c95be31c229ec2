//! Expression graphs for the Earth Engine REST API.
//!
//! Computations are described as a tree of [`Value`]s and sent to the server
//! as an [`Expression`]: a flat table of value nodes keyed by id, where
//! function invocations reference their arguments by id. Identical sub-trees
//! are stored once.
//!
//! Mapped functions are built from Rust closures with [`Value::function`].
//! Argument names follow the `_MAPPING_VAR_<depth>_<index>` convention, where
//! `depth` counts the function definitions nested inside the body, so nested
//! closures never shadow each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

const ARGUMENT_PREFIX: &str = "_MAPPING_VAR_";

static PLACEHOLDERS: AtomicUsize = AtomicUsize::new(0);

/// A node in an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any JSON literal.
    Constant(Json),
    /// A call of a server-side algorithm with named arguments.
    Invocation {
        function: String,
        arguments: BTreeMap<String, Value>,
    },
    /// A function definition, used as `baseAlgorithm` in `Collection.map`.
    Function {
        arguments: Vec<String>,
        body: Box<Value>,
    },
    /// Reference to an argument of an enclosing function definition.
    Argument(String),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    /// Invoke `function` with named arguments.
    pub fn invoke<'a>(function: &str, arguments: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Invocation {
            function: function.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// A constant list of strings.
    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Value::Constant(Json::Array(
            items.iter().map(|s| Json::String(s.as_ref().to_string())).collect(),
        ))
    }

    /// Define a one-argument function. `body` receives a reference to the
    /// argument and returns the function's result.
    pub fn function(body: impl FnOnce(Value) -> Value) -> Self {
        let placeholder = format!("__arg_{}", PLACEHOLDERS.fetch_add(1, Ordering::Relaxed));
        let body = body(Value::Argument(placeholder.clone()));
        let name = format!("{}{}_0", ARGUMENT_PREFIX, body.function_depth());

        Value::Function {
            arguments: vec![name.clone()],
            body: Box::new(body.rename_argument(&placeholder, &name)),
        }
    }

    pub fn is_constant(&self) -> bool {
        match self {
            Value::Constant(_) => true,
            Value::Array(items) => items.iter().all(Value::is_constant),
            Value::Dictionary(entries) => entries.values().all(Value::is_constant),
            _ => false,
        }
    }

    /// JSON form of a constant value.
    fn constant_json(&self) -> Option<Json> {
        match self {
            Value::Constant(c) => Some(c.clone()),
            Value::Array(items) => items.iter().map(Value::constant_json).collect::<Option<Vec<_>>>().map(Json::Array),
            Value::Dictionary(entries) => entries
                .iter()
                .map(|(k, v)| v.constant_json().map(|j| (k.clone(), j)))
                .collect::<Option<Map<_, _>>>()
                .map(Json::Object),
            _ => None,
        }
    }

    /// Number of function definitions nested inside this value.
    fn function_depth(&self) -> usize {
        match self {
            Value::Function { body, .. } => 1 + body.function_depth(),
            Value::Invocation { arguments, .. } | Value::Dictionary(arguments) => {
                arguments.values().map(Value::function_depth).max().unwrap_or(0)
            }
            Value::Array(items) => items.iter().map(Value::function_depth).max().unwrap_or(0),
            Value::Constant(_) | Value::Argument(_) => 0,
        }
    }

    fn rename_argument(self, from: &str, to: &str) -> Value {
        match self {
            Value::Argument(name) if name == from => Value::Argument(to.to_string()),
            Value::Invocation { function, arguments } => Value::Invocation {
                function,
                arguments: arguments
                    .into_iter()
                    .map(|(k, v)| (k, v.rename_argument(from, to)))
                    .collect(),
            },
            Value::Function { arguments, body } => Value::Function {
                arguments,
                body: Box::new(body.rename_argument(from, to)),
            },
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| v.rename_argument(from, to)).collect())
            }
            Value::Dictionary(entries) => Value::Dictionary(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.rename_argument(from, to)))
                    .collect(),
            ),
            other => other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Constant(Json::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Constant(Json::String(s))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Constant(json!(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Constant(json!(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Constant(json!(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Constant(Json::Bool(b))
    }
}

/// The wire form of a computation: `values[result]` is the root node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, Json>,
}

impl Expression {
    /// Encode a value tree, storing each distinct sub-tree once. The root is
    /// always node `"0"`.
    pub fn encode(value: &Value) -> Self {
        let mut encoder = Encoder::default();
        let root = encoder.encode(value);
        let root_id = match reference_id(&root) {
            Some(id) => id,
            None => encoder.hoist(root),
        };
        encoder.finish(root_id)
    }

    pub fn node(&self, id: &str) -> Option<&Json> {
        self.values.get(id)
    }

    pub fn root(&self) -> Option<&Json> {
        self.values.get(&self.result)
    }

    /// Follow a `valueReference` to its node.
    pub fn resolve<'a>(&'a self, node: &'a Json) -> &'a Json {
        match node.get("valueReference").and_then(Json::as_str) {
            Some(id) => self.values.get(id).unwrap_or(node),
            None => node,
        }
    }
}

#[derive(Default)]
struct Encoder {
    nodes: Vec<Json>,
    seen: HashMap<String, usize>,
}

impl Encoder {
    /// Encode `value` as an inline node; invocations and function
    /// definitions become references into the table.
    fn encode(&mut self, value: &Value) -> Json {
        if let Some(constant) = value.constant_json() {
            return json!({ "constantValue": constant });
        }

        match value {
            Value::Argument(name) => json!({ "argumentReference": name }),
            Value::Array(items) => {
                let values: Vec<Json> = items.iter().map(|v| self.encode(v)).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Dictionary(entries) => {
                let values: Map<String, Json> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.encode(v)))
                    .collect();
                json!({ "dictionaryValue": { "values": values } })
            }
            Value::Invocation { function, arguments } => {
                let arguments: Map<String, Json> = arguments
                    .iter()
                    .map(|(k, v)| (k.clone(), self.encode(v)))
                    .collect();
                let id = self.hoist(json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                }));
                reference(id)
            }
            Value::Function { arguments, body } => {
                let body = self.encode(body);
                let body_id = match reference_id(&body) {
                    Some(id) => id,
                    None => self.hoist(body),
                };
                let id = self.hoist(json!({
                    "functionDefinitionValue": {
                        "argumentNames": arguments,
                        "body": body_id.to_string(),
                    }
                }));
                reference(id)
            }
            // constants are handled above
            Value::Constant(c) => json!({ "constantValue": c }),
        }
    }

    fn hoist(&mut self, node: Json) -> usize {
        let key = node.to_string();
        if let Some(&id) = self.seen.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(node);
        self.seen.insert(key, id);
        id
    }

    /// Renumber so the root is `0` and ids grow towards the leaves.
    fn finish(self, root_id: usize) -> Expression {
        // children are pushed before their parents, so reversed push order
        // lists parents first
        let count = self.nodes.len();
        let mut new_ids = vec![0; count];
        let order = std::iter::once(root_id).chain((0..count).rev().filter(|&id| id != root_id));
        for (new_id, old_id) in order.enumerate() {
            if let Some(slot) = new_ids.get_mut(old_id) {
                *slot = new_id;
            }
        }
        let renumber = |id: usize| new_ids.get(id).copied().unwrap_or(id);

        let values = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(id, mut node)| {
                rewrite_references(&mut node, &renumber);
                (renumber(id).to_string(), node)
            })
            .collect();

        Expression {
            result: "0".to_string(),
            values,
        }
    }
}

fn reference(id: usize) -> Json {
    json!({ "valueReference": id.to_string() })
}

fn reference_id(node: &Json) -> Option<usize> {
    node.get("valueReference")?.as_str()?.parse().ok()
}

fn rewrite_references(node: &mut Json, renumber: &impl Fn(usize) -> usize) {
    match node {
        Json::Object(map) => {
            for key in ["valueReference", "body"] {
                if let Some(Json::String(id)) = map.get_mut(key) {
                    if let Ok(n) = id.parse::<usize>() {
                        *id = renumber(n).to_string();
                    }
                }
            }
            for (key, child) in map.iter_mut() {
                // constants may legitimately contain a "body" or "valueReference" key
                if key != "constantValue" {
                    rewrite_references(child, renumber);
                }
            }
        }
        Json::Array(items) => {
            for item in items {
                rewrite_references(item, renumber);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(id: &str) -> Value {
        Value::invoke("Image.load", [("id", Value::from(id))])
    }

    #[test]
    fn test_root_renumbered_wherever_it_was_stored() {
        let mut encoder = Encoder::default();
        let root = encoder.hoist(json!({
            "functionInvocationValue": {
                "functionName": "Image.select",
                "arguments": { "input": reference(1) }
            }
        }));
        encoder.hoist(json!({
            "functionInvocationValue": {
                "functionName": "Image.load",
                "arguments": { "id": { "constantValue": "NASA/NASADEM_HGT/001" } }
            }
        }));

        let expr = encoder.finish(root);
        let top = &expr.values["0"]["functionInvocationValue"];
        assert_eq!(top["functionName"], "Image.select");
        let input = expr.resolve(&top["arguments"]["input"]);
        assert_eq!(input["functionInvocationValue"]["functionName"], "Image.load");
    }

    #[test]
    fn test_constant_root() {
        let expr = Expression::encode(&Value::from(42i64));
        assert_eq!(expr.result, "0");
        assert_eq!(expr.values["0"], json!({"constantValue": 42}));
    }

    #[test]
    fn test_single_invocation() {
        let expr = Expression::encode(&load("CSP/ERGo/1_0/Global/ALOS_CHILI"));

        assert_eq!(expr.values.len(), 1);
        assert_eq!(
            expr.values["0"],
            json!({
                "functionInvocationValue": {
                    "functionName": "Image.load",
                    "arguments": {"id": {"constantValue": "CSP/ERGo/1_0/Global/ALOS_CHILI"}}
                }
            })
        );
    }

    #[test]
    fn test_identical_subtrees_are_shared() {
        let image = load("MODIS/061/MOD09GA");
        let sum = Value::invoke("Image.add", [("image1", image.clone()), ("image2", image)]);
        let expr = Expression::encode(&sum);

        assert_eq!(expr.values.len(), 2);
        let args = &expr.values["0"]["functionInvocationValue"]["arguments"];
        assert_eq!(args["image1"], args["image2"]);
        assert_eq!(args["image1"], json!({"valueReference": "1"}));
    }

    #[test]
    fn test_function_body_references_argument() {
        let f = Value::function(|img| Value::invoke("Image.toInt16", [("value", img)]));
        let mapped = Value::invoke(
            "Collection.map",
            [
                ("collection", Value::invoke("ImageCollection.load", [("id", Value::from("x"))])),
                ("baseAlgorithm", f),
            ],
        );
        let expr = Expression::encode(&mapped);

        let root = &expr.values["0"]["functionInvocationValue"];
        let def = expr.resolve(&root["arguments"]["baseAlgorithm"]);
        let def = &def["functionDefinitionValue"];
        assert_eq!(def["argumentNames"], json!(["_MAPPING_VAR_0_0"]));

        let body = &expr.values[def["body"].as_str().unwrap()];
        assert_eq!(
            body["functionInvocationValue"]["arguments"]["value"],
            json!({"argumentReference": "_MAPPING_VAR_0_0"})
        );
    }

    #[test]
    fn test_nested_functions_get_distinct_names() {
        let outer = Value::function(|outer_arg| {
            let inner = Value::function(|inner_arg| {
                Value::invoke("Image.addBands", [("dstImg", outer_arg.clone()), ("srcImg", inner_arg)])
            });
            Value::invoke("Collection.map", [("collection", outer_arg), ("baseAlgorithm", inner)])
        });

        match outer {
            Value::Function { arguments, body } => {
                assert_eq!(arguments, vec!["_MAPPING_VAR_1_0"]);
                let encoded = Expression::encode(&body);
                let text = serde_json::to_string(&encoded).unwrap();
                assert!(text.contains("_MAPPING_VAR_0_0"));
                assert!(text.contains("_MAPPING_VAR_1_0"));
                assert!(!text.contains("__arg_"));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_arrays_inline() {
        let v = Value::invoke("Image.select", [("input", load("a")), ("bandSelectors", Value::strings(&["b1", "b2"]))]);
        let expr = Expression::encode(&v);
        assert_eq!(
            expr.values["0"]["functionInvocationValue"]["arguments"]["bandSelectors"],
            json!({"constantValue": ["b1", "b2"]})
        );
    }

    #[test]
    fn test_array_of_invocations() {
        let v = Value::invoke("ImageCollection.fromImages", [("images", Value::Array(vec![load("a"), load("b")]))]);
        let expr = Expression::encode(&v);

        assert_eq!(expr.values.len(), 3);
        let images = &expr.values["0"]["functionInvocationValue"]["arguments"]["images"]["arrayValue"]["values"];
        assert_eq!(images.as_array().unwrap().len(), 2);
        for node in images.as_array().unwrap() {
            assert!(expr.resolve(node).get("functionInvocationValue").is_some());
        }
    }

    #[test]
    fn test_every_reference_resolves() {
        let image = load("a");
        let masked = Value::invoke(
            "Image.updateMask",
            [("image", image.clone()), ("mask", Value::invoke("Image.eq", [("image1", image), ("image2", Value::from(0i64))]))],
        );
        let expr = Expression::encode(&masked);
        let text = serde_json::to_string(&expr.values).unwrap();
        for id in 0..expr.values.len() {
            assert!(expr.values.contains_key(&id.to_string()));
        }
        assert!(!text.contains(&format!("\"{}\"", expr.values.len())));
    }
}
