//! Untyped block tree produced by the grammar layer.

/// A single `key = value` line inside a block.
///
/// The value is the rest of the line, verbatim. Quotes are left in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One `type ["identifier"] { ... }` unit of a TPM document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Block type (e.g. `mesh`, `material`)
    pub block_type: String,

    /// Identifier as written, including its enclosing quotes
    pub identifier: Option<String>,

    /// Properties in file order. Keys may repeat.
    pub properties: Vec<Property>,
}

impl Block {
    pub fn new(block_type: impl Into<String>, identifier: Option<String>) -> Self {
        Self {
            block_type: block_type.into(),
            identifier,
            properties: Vec::new(),
        }
    }

    /// Append a property, keeping file order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.push(Property::new(key, value));
    }

    /// Builder-style [`Block::push`].
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Human-readable label used in error messages, e.g. `mesh "Cube"`.
    pub fn label(&self) -> String {
        match &self.identifier {
            Some(identifier) => format!("{} {}", self.block_type, identifier),
            None => self.block_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_keep_order_and_duplicates() {
        let block = Block::new("mesh", Some("\"Tri\"".into()))
            .with_property("v", "(0,0,0)")
            .with_property("v", "(1,0,0)")
            .with_property("m", "\"Rock\"");

        let keys: Vec<_> = block.properties.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["v", "v", "m"]);
        assert_eq!(block.properties[1].value, "(1,0,0)");
    }

    #[test]
    fn test_label() {
        assert_eq!(Block::new("mesh", Some("\"Tri\"".into())).label(), "mesh \"Tri\"");
        assert_eq!(Block::new("fileinfo", None).label(), "fileinfo");
    }
}
