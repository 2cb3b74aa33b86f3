use crate::error::TranslateError;
use serde::Deserialize;
use std::collections::HashMap;

/// A component definition as returned by the Management API.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSchema {
    pub name: String,
    #[serde(default)]
    pub schema: HashMap<String, FieldSchema>,
}

/// Attributes of one field in a component schema.
///
/// Only `translatable` matters here; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSchema {
    #[serde(default)]
    pub translatable: Option<bool>,
}

/// Lookup table of component schemas by component name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    components: HashMap<String, ComponentSchema>,
}

impl SchemaRegistry {
    pub fn new(components: Vec<ComponentSchema>) -> Self {
        Self {
            components: components
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether `field` of `component` is marked translatable.
    ///
    /// An unknown component or field is an error, never a silent skip: it
    /// means the story does not match its declared type.
    pub fn is_translatable(
        &self,
        component: Option<&str>,
        field: &str,
    ) -> Result<bool, TranslateError> {
        let component = component.ok_or_else(|| TranslateError::UntypedNode {
            field: field.to_string(),
        })?;

        let schema = self
            .components
            .get(component)
            .ok_or_else(|| TranslateError::UnknownComponent(component.to_string()))?;

        let field_schema =
            schema
                .schema
                .get(field)
                .ok_or_else(|| TranslateError::UnknownField {
                    component: component.to_string(),
                    field: field.to_string(),
                })?;

        Ok(field_schema.translatable.unwrap_or(false))
    }
}
