//! Port types, controls and port value derivation
//!
//! A port type describes what a port carries and which input controls edit
//! its value when nothing is connected to it. A [`Port`] is a named instance
//! of a port type on a node type's input or output list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ResolveContext;
use crate::descriptor::PortTypeFn;
use crate::types::ControlData;

/// Kind of input control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    Text,
    Number,
    Select,
    Checkbox,
    Multiselect,
    Custom,
}

/// A selectable option for select and multiselect controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    /// Human-readable display label
    pub label: String,
    /// The value stored when this option is selected
    pub value: String,
    /// Optional description or extra context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
        }
    }
}

/// An input control attached to a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    #[serde(rename = "type")]
    pub control_type: ControlType,
    /// Key of this control inside the port's control data
    pub name: String,
    pub label: String,
    pub default_value: Value,
    /// Options for select and multiselect controls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl Control {
    fn new(
        control_type: ControlType,
        name: impl Into<String>,
        label: impl Into<String>,
        default_value: Value,
    ) -> Self {
        Self {
            control_type,
            name: name.into(),
            label: label.into(),
            default_value,
            options: Vec::new(),
        }
    }

    pub fn text(
        name: impl Into<String>,
        label: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self::new(ControlType::Text, name, label, Value::String(default_value.into()))
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>, default_value: f64) -> Self {
        Self::new(ControlType::Number, name, label, serde_json::json!(default_value))
    }

    pub fn checkbox(
        name: impl Into<String>,
        label: impl Into<String>,
        default_value: bool,
    ) -> Self {
        Self::new(ControlType::Checkbox, name, label, Value::Bool(default_value))
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
        default_value: impl Into<String>,
    ) -> Self {
        let default_value = Value::String(default_value.into());
        let mut control = Self::new(ControlType::Select, name, label, default_value);
        control.options = options;
        control
    }

    pub fn multiselect(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
        default_value: Vec<String>,
    ) -> Self {
        let default_value = serde_json::json!(default_value);
        let mut control = Self::new(ControlType::Multiselect, name, label, default_value);
        control.options = options;
        control
    }

    pub fn custom(name: impl Into<String>, label: impl Into<String>, default_value: Value) -> Self {
        Self::new(ControlType::Custom, name, label, default_value)
    }

    fn is_option(&self, value: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|o| o.value == value)
    }

    /// Validate a raw control value, falling back to the default
    pub fn normalize(&self, raw: Option<&Value>) -> Value {
        let normalized = match (self.control_type, raw) {
            (_, None) | (_, Some(Value::Null)) => None,
            (ControlType::Text, Some(Value::String(s))) => Some(Value::String(s.clone())),
            (ControlType::Number, Some(Value::Number(n))) => Some(Value::Number(n.clone())),
            (ControlType::Number, Some(Value::String(s))) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (ControlType::Checkbox, Some(Value::Bool(b))) => Some(Value::Bool(*b)),
            (ControlType::Select, Some(Value::String(s))) if self.is_option(s) => {
                Some(Value::String(s.clone()))
            }
            (ControlType::Multiselect, Some(Value::Array(items))) => Some(Value::Array(
                items
                    .iter()
                    .filter(|v| v.as_str().is_some_and(|s| self.is_option(s)))
                    .cloned()
                    .collect(),
            )),
            (ControlType::Custom, Some(v)) => Some(v.clone()),
            _ => None,
        };
        normalized.unwrap_or_else(|| self.default_value.clone())
    }
}

/// Definition of a port type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortTypeDefinition {
    /// Unique type identifier (e.g., "number")
    #[serde(rename = "type")]
    pub port_type: String,
    /// Default port name used when a port is built without one
    pub name: String,
    /// Default human-readable label
    pub label: String,
    /// Controls that edit the value of an unconnected port
    #[serde(default)]
    pub controls: Vec<Control>,
    /// Other port types this type accepts connections from
    #[serde(default)]
    pub accept_types: Vec<String>,
}

impl PortTypeDefinition {
    /// Create a port type with no controls
    pub fn new(port_type: impl Into<String>) -> Self {
        let port_type = port_type.into();
        Self {
            name: port_type.clone(),
            label: port_type.clone(),
            port_type,
            controls: Vec::new(),
            accept_types: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    /// Accept connections from another port type
    pub fn accept(mut self, port_type: impl Into<String>) -> Self {
        self.accept_types.push(port_type.into());
        self
    }

    /// Check whether a port of this type may receive from `other`
    pub fn accepts(&self, other: &str) -> bool {
        self.port_type == other || self.accept_types.iter().any(|t| t == other)
    }

    /// Build a port with this type's default name and label
    pub fn port(&self) -> Port {
        self.port_named(self.name.clone(), self.label.clone())
    }

    /// Build a port of this type with a specific name and label
    pub fn port_named(&self, name: impl Into<String>, label: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            label: label.into(),
            port_type: self.port_type.clone(),
            controls: self.controls.clone(),
        }
    }
}

/// A port on a node type's input or output list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub port_type: String,
    /// Controls copied from the port type, possibly overridden
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Port {
    /// Replace the controls inherited from the port type
    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// Control data with every control filled in and validated
    pub fn normalized_data(&self, data: &ControlData) -> ControlData {
        self.controls
            .iter()
            .map(|c| (c.name.clone(), c.normalize(data.get(&c.name))))
            .collect()
    }
}

/// Registry of port types
#[derive(Debug, Clone, Default)]
pub struct PortTypeCatalog {
    entries: HashMap<String, PortTypeDefinition>,
}

impl PortTypeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding every port type registered via `inventory`
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register_builtins();
        catalog
    }

    /// Add every port type registered via `inventory`
    pub fn register_builtins(&mut self) {
        for PortTypeFn(definition) in inventory::iter::<PortTypeFn> {
            self.add_port_type(definition());
        }
    }

    /// Register a port type, replacing any previous one with the same type
    pub fn add_port_type(&mut self, definition: PortTypeDefinition) -> &mut Self {
        self.entries.insert(definition.port_type.clone(), definition);
        self
    }

    pub fn get(&self, port_type: &str) -> Option<&PortTypeDefinition> {
        self.entries.get(port_type)
    }

    pub fn has_port_type(&self, port_type: &str) -> bool {
        self.entries.contains_key(port_type)
    }

    /// List all registered port type strings, sorted
    pub fn port_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Build a port of a registered type
    pub fn port(
        &self,
        port_type: &str,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Option<Port> {
        self.get(port_type).map(|t| t.port_named(name, label))
    }

    /// Merge another catalog into this one; entries from `other` win
    pub fn merge(&mut self, other: PortTypeCatalog) {
        self.entries.extend(other.entries);
    }
}

/// Derives the value of an unconnected input port from the node's own data
pub trait PortResolver: Send + Sync {
    fn resolve_port(
        &self,
        port: &Port,
        port_type: &PortTypeDefinition,
        data: &ControlData,
        context: &ResolveContext,
    ) -> Value;
}

/// Default port value derivation based on the port's controls
///
/// A port with a single control yields that control's value, a port with
/// several controls yields an object keyed by control name, and a port
/// without controls passes its raw data through (null when empty).
pub struct ControlPortResolver;

impl PortResolver for ControlPortResolver {
    fn resolve_port(
        &self,
        port: &Port,
        _port_type: &PortTypeDefinition,
        data: &ControlData,
        _context: &ResolveContext,
    ) -> Value {
        match port.controls.as_slice() {
            [] if data.is_empty() => Value::Null,
            [] => Value::Object(data.clone()),
            [control] => control.normalize(data.get(&control.name)),
            _ => Value::Object(port.normalized_data(data)),
        }
    }
}

/// Port resolver backed by a closure
pub struct FnPortResolver {
    callback: Box<dyn Fn(&Port, &ControlData, &ResolveContext) -> Value + Send + Sync>,
}

impl FnPortResolver {
    pub fn new(
        callback: impl Fn(&Port, &ControlData, &ResolveContext) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl PortResolver for FnPortResolver {
    fn resolve_port(
        &self,
        port: &Port,
        _port_type: &PortTypeDefinition,
        data: &ControlData,
        context: &ResolveContext,
    ) -> Value {
        (self.callback)(port, data, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> ControlData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_text_and_number_normalize() {
        let text = Control::text("string", "Text", "hi");
        assert_eq!(text.normalize(Some(&json!("x"))), json!("x"));
        assert_eq!(text.normalize(Some(&json!(3))), json!("hi"));
        assert_eq!(text.normalize(None), json!("hi"));

        let number = Control::number("number", "Number", 1.0);
        assert_eq!(number.normalize(Some(&json!(7))), json!(7));
        assert_eq!(number.normalize(Some(&json!(" 2.5 "))), json!(2.5));
        assert_eq!(number.normalize(Some(&json!("abc"))), json!(1.0));
        assert_eq!(number.normalize(Some(&Value::Null)), json!(1.0));
    }

    #[test]
    fn test_select_and_multiselect_normalize() {
        let options = vec![SelectOption::new("Add", "add"), SelectOption::new("Sub", "sub")];
        let select = Control::select("op", "Operation", options.clone(), "add");
        assert_eq!(select.normalize(Some(&json!("sub"))), json!("sub"));
        assert_eq!(select.normalize(Some(&json!("mul"))), json!("add"));

        let multi = Control::multiselect("ops", "Operations", options, vec![]);
        assert_eq!(multi.normalize(Some(&json!(["add", "mul", "sub"]))), json!(["add", "sub"]));
        assert_eq!(multi.normalize(Some(&json!("add"))), json!([]));
    }

    #[test]
    fn test_checkbox_and_custom_normalize() {
        let checkbox = Control::checkbox("boolean", "Enabled", false);
        assert_eq!(checkbox.normalize(Some(&json!(true))), json!(true));
        assert_eq!(checkbox.normalize(Some(&json!("true"))), json!(false));

        let custom = Control::custom("color", "Color", json!({"r": 0}));
        assert_eq!(custom.normalize(Some(&json!([1, 2]))), json!([1, 2]));
        assert_eq!(custom.normalize(None), json!({"r": 0}));
    }

    #[test]
    fn test_accepts() {
        let boolean = PortTypeDefinition::new("boolean").accept("number");
        assert!(boolean.accepts("boolean"));
        assert!(boolean.accepts("number"));
        assert!(!boolean.accepts("string"));
    }

    #[test]
    fn test_port_inherits_controls() {
        let number = PortTypeDefinition::new("number")
            .with_label("Number")
            .with_control(Control::number("number", "Number", 0.0));
        let port = number.port_named("a", "A");
        assert_eq!(port.port_type, "number");
        assert_eq!(port.controls.len(), 1);

        let default_port = number.port();
        assert_eq!(default_port.name, "number");
        assert_eq!(default_port.label, "Number");
    }

    #[test]
    fn test_control_port_resolver() {
        let context = ResolveContext::new();
        let resolver = ControlPortResolver;

        let single =
            PortTypeDefinition::new("number").with_control(Control::number("number", "N", 5.0));
        let port = single.port();
        assert_eq!(resolver.resolve_port(&port, &single, &data(json!({})), &context), json!(5.0));
        assert_eq!(
            resolver.resolve_port(&port, &single, &data(json!({"number": 9})), &context),
            json!(9)
        );

        let multi = PortTypeDefinition::new("vec")
            .with_control(Control::number("x", "X", 0.0))
            .with_control(Control::number("y", "Y", 1.0));
        let port = multi.port();
        assert_eq!(
            resolver.resolve_port(&port, &multi, &data(json!({"x": 3})), &context),
            json!({"x": 3, "y": 1.0})
        );

        let bare = PortTypeDefinition::new("any");
        let port = bare.port();
        assert_eq!(resolver.resolve_port(&port, &bare, &data(json!({})), &context), Value::Null);
        assert_eq!(
            resolver.resolve_port(&port, &bare, &data(json!({"k": "v"})), &context),
            json!({"k": "v"})
        );
    }

    #[test]
    fn test_fn_port_resolver() {
        let resolver =
            FnPortResolver::new(|port, data, _ctx| json!({ "port": port.name, "n": data.len() }));
        let def = PortTypeDefinition::new("any");
        let context = ResolveContext::new();
        let value = resolver.resolve_port(&def.port(), &def, &data(json!({"a": 1})), &context);
        assert_eq!(value, json!({"port": "any", "n": 1}));
    }

    #[test]
    fn test_catalog_port_builder() {
        let mut catalog = PortTypeCatalog::new();
        catalog.add_port_type(
            PortTypeDefinition::new("string").with_control(Control::text("string", "Text", "")),
        );
        assert!(catalog.has_port_type("string"));
        assert_eq!(catalog.port_types(), vec!["string"]);

        let port = catalog.port("string", "name", "Name").unwrap();
        assert_eq!(port.name, "name");
        assert!(catalog.port("missing", "x", "X").is_none());
    }

    #[test]
    fn test_port_type_json_shape() {
        let def = PortTypeDefinition::new("number")
            .with_control(Control::number("number", "Number", 0.0))
            .accept("boolean");
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["acceptTypes"], json!(["boolean"]));
        assert_eq!(json["controls"][0]["type"], "number");
        assert_eq!(json["controls"][0]["defaultValue"], json!(0.0));
    }
}
