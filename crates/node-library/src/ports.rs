//! Built-in port types
//!
//! Each port type carries a single control of the same name, so an
//! unconnected port resolves straight to that control's value.

use node_resolver::{Control, Port, PortTypeDefinition, PortTypeFn};

/// Port type identifier for text values
pub const STRING: &str = "string";
/// Port type identifier for numeric values
pub const NUMBER: &str = "number";
/// Port type identifier for boolean values
pub const BOOLEAN: &str = "boolean";

/// Text port type with a text control
pub fn string_type() -> PortTypeDefinition {
    PortTypeDefinition::new(STRING)
        .with_label("Text")
        .with_control(Control::text(STRING, "Text", ""))
}

/// Number port type with a number control
pub fn number_type() -> PortTypeDefinition {
    PortTypeDefinition::new(NUMBER)
        .with_label("Number")
        .with_control(Control::number(NUMBER, "Number", 0.0))
}

/// Boolean port type with a checkbox control; also accepts numbers
pub fn boolean_type() -> PortTypeDefinition {
    PortTypeDefinition::new(BOOLEAN)
        .with_label("True/False")
        .with_control(Control::checkbox(BOOLEAN, "True/False", false))
        .accept(NUMBER)
}

inventory::submit!(PortTypeFn(string_type));
inventory::submit!(PortTypeFn(number_type));
inventory::submit!(PortTypeFn(boolean_type));

/// A text port
pub fn string_port(name: &str, label: &str) -> Port {
    string_type().port_named(name, label)
}

/// A number port
pub fn number_port(name: &str, label: &str) -> Port {
    number_type().port_named(name, label)
}

/// A boolean port
pub fn boolean_port(name: &str, label: &str) -> Port {
    boolean_type().port_named(name, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use node_resolver::{ControlPortResolver, PortResolver, PortTypeCatalog, ResolveContext};
    use serde_json::json;

    #[test]
    fn test_builtin_port_types_registered() {
        let catalog = PortTypeCatalog::with_builtins();
        assert!(catalog.has_port_type(STRING));
        assert!(catalog.has_port_type(NUMBER));
        assert!(catalog.has_port_type(BOOLEAN));
    }

    #[test]
    fn test_boolean_accepts_number() {
        assert!(boolean_type().accepts(NUMBER));
        assert!(boolean_type().accepts(BOOLEAN));
        assert!(!boolean_type().accepts(STRING));
        assert!(!number_type().accepts(BOOLEAN));
    }

    #[test]
    fn test_unconnected_port_values() {
        let ctx = ResolveContext::new();
        let port = number_port("a", "A");
        let mut data = serde_json::Map::new();
        assert_eq!(
            ControlPortResolver.resolve_port(&port, &number_type(), &data, &ctx),
            json!(0.0)
        );

        data.insert(NUMBER.into(), json!("12.5"));
        assert_eq!(
            ControlPortResolver.resolve_port(&port, &number_type(), &data, &ctx),
            json!(12.5)
        );
    }
}
