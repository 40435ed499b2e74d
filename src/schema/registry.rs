//! Schema registry - validates a set of schemas and resolves inheritance.
//!
//! Each type is resolved once into an ordered list of [`Step`]s, ancestor
//! fields first, so the object codec never walks the parent chain at
//! encode/decode time.
//!
//! # Example
//!
//! ```
//! use fieldwire::schema::{Field, FieldType, ScalarKind, Schema, SchemaRegistry};
//!
//! let base = Schema::builder("Base")
//!     .field(Field::new("a", FieldType::Scalar(ScalarKind::U8)))
//!     .build()
//!     .unwrap();
//! let derived = Schema::builder("Derived")
//!     .parent("Base")
//!     .field(Field::new("b", FieldType::Scalar(ScalarKind::U8)))
//!     .build()
//!     .unwrap();
//!
//! let registry = SchemaRegistry::new([base, derived]).unwrap();
//! let resolved = registry.resolve("Derived").unwrap();
//! let order: Vec<_> = resolved.steps.iter().map(|s| s.field.name.as_str()).collect();
//! assert_eq!(order, ["a", "b"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::types::{CountSource, Field, FieldType, ScalarKind, Schema};
use crate::error::{CodecError, Result};

/// One field to code, with the type that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Name of the schema that declares this field.
    pub declaring_type: String,
    /// The field itself.
    pub field: Field,
}

/// A type with its full inheritance chain flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// Type name.
    pub name: String,
    /// Fields to code, ancestors first, each in declaration order.
    pub steps: Vec<Step>,
    /// Capture trailing bytes after the last step.
    pub dynamic: bool,
}

impl ResolvedSchema {
    /// Find a step by field name.
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.field.name == name)
    }
}

/// Immutable set of validated, resolved schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    resolved: HashMap<String, Arc<ResolvedSchema>>,
}

impl SchemaRegistry {
    /// Validate a set of schemas and resolve every type.
    pub fn new(schemas: impl IntoIterator<Item = Schema>) -> Result<Self> {
        let mut map = HashMap::new();
        for schema in schemas {
            schema.validate()?;
            if map.contains_key(&schema.name) {
                return Err(CodecError::SchemaValidation(format!(
                    "type '{}' registered twice",
                    schema.name
                )));
            }
            map.insert(schema.name.clone(), schema);
        }

        let mut registry = Self {
            schemas: map,
            resolved: HashMap::new(),
        };

        let mut names: Vec<String> = registry.schemas.keys().cloned().collect();
        names.sort();
        for name in &names {
            let resolved = registry.resolve_chain(name)?;
            registry.check_steps(&resolved)?;
            tracing::trace!(
                "Resolved schema {} with {} steps",
                name,
                resolved.steps.len()
            );
            registry.resolved.insert(name.clone(), Arc::new(resolved));
        }

        let mut finite = HashSet::new();
        for name in &names {
            registry.check_containment(name, &mut Vec::new(), &mut finite)?;
        }

        Ok(registry)
    }

    /// Load a JSON array of schemas.
    pub fn from_json(json: &str) -> Result<Self> {
        let schemas: Vec<Schema> = serde_json::from_str(json)?;
        Self::new(schemas)
    }

    /// Get the resolved form of a type.
    pub fn resolve(&self, name: &str) -> Result<Arc<ResolvedSchema>> {
        self.resolved
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))
    }

    /// Get a type's own schema as declared.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Check if a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Walk the parent chain and flatten it, ancestors first.
    fn resolve_chain(&self, name: &str) -> Result<ResolvedSchema> {
        let leaf = self
            .schemas
            .get(name)
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))?;

        let mut chain = vec![leaf];
        let mut visited = HashSet::from([name]);
        let mut current = leaf;
        while let Some(parent_name) = current.parent.as_deref() {
            let parent = self.schemas.get(parent_name).ok_or_else(|| {
                CodecError::SchemaValidation(format!(
                    "type '{}' has unknown parent '{}'",
                    current.name, parent_name
                ))
            })?;
            if !visited.insert(parent_name) {
                return Err(CodecError::SchemaValidation(format!(
                    "inheritance cycle through '{}'",
                    parent_name
                )));
            }
            if parent.dynamic {
                return Err(CodecError::SchemaValidation(format!(
                    "dynamic type '{}' cannot be a parent of '{}'",
                    parent.name, current.name
                )));
            }
            chain.push(parent);
            current = parent;
        }

        let steps = chain
            .iter()
            .rev()
            .flat_map(|schema| {
                schema.fields.iter().map(|field| Step {
                    declaring_type: schema.name.clone(),
                    field: field.clone(),
                })
            })
            .collect();

        Ok(ResolvedSchema {
            name: leaf.name.clone(),
            steps,
            dynamic: leaf.dynamic,
        })
    }

    /// Cross-field checks over the flattened chain.
    fn check_steps(&self, resolved: &ResolvedSchema) -> Result<()> {
        let mut earlier: HashMap<&str, &FieldType> = HashMap::new();

        for step in &resolved.steps {
            let field = &step.field;
            let fail = |msg: String| {
                CodecError::SchemaValidation(msg).in_field(&step.declaring_type, &field.name)
            };

            if earlier.contains_key(field.name.as_str()) {
                return Err(fail(format!(
                    "field '{}' is already declared by an ancestor of '{}'",
                    field.name, resolved.name
                )));
            }

            if let Some(guard) = &field.condition {
                match earlier.get(guard.as_str()) {
                    Some(FieldType::Scalar(ScalarKind::Bool)) => {}
                    Some(other) => {
                        return Err(fail(format!(
                            "condition '{}' must be a bool field, not {}",
                            guard,
                            other.describe()
                        )))
                    }
                    None => {
                        return Err(fail(format!(
                            "condition '{}' must name an earlier field",
                            guard
                        )))
                    }
                }
            }

            if let Some(CountSource::Field { field: count, .. }) = &field.fixed_count {
                match earlier.get(count.as_str()) {
                    Some(FieldType::Scalar(kind)) if kind.is_integer() => {}
                    Some(other) => {
                        return Err(fail(format!(
                            "count '{}' must be an integer field, not {}",
                            count,
                            other.describe()
                        )))
                    }
                    None => {
                        return Err(fail(format!(
                            "count '{}' must name an earlier field",
                            count
                        )))
                    }
                }
            }

            self.check_nested(&field.ty).map_err(fail)?;
            earlier.insert(field.name.as_str(), &field.ty);
        }

        Ok(())
    }

    /// A type must not inline itself through unguarded object fields.
    ///
    /// Such a type has no finite layout. Lists and `when` guards end the
    /// chain, since both can be empty on the wire. `path` holds the types
    /// being walked; `finite` the types already proven to terminate.
    fn check_containment<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        finite: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if finite.contains(name) {
            return Ok(());
        }
        if path.contains(&name) {
            path.push(name);
            return Err(CodecError::SchemaValidation(format!(
                "type '{}' contains itself: {}",
                name,
                path.join(" -> ")
            )));
        }
        let Some(resolved) = self.resolved.get(name) else {
            return Ok(());
        };

        path.push(name);
        for step in &resolved.steps {
            if step.field.condition.is_some() {
                continue;
            }
            if let FieldType::Object(inner) = &step.field.ty {
                self.check_containment(inner, path, finite)?;
            }
        }
        path.pop();
        finite.insert(name);
        Ok(())
    }

    /// Nested object types must exist and must not be dynamic.
    fn check_nested(&self, ty: &FieldType) -> std::result::Result<(), String> {
        match ty {
            FieldType::Object(name) => match self.schemas.get(name) {
                None => Err(format!("unknown nested type '{}'", name)),
                Some(schema) if schema.dynamic => Err(format!(
                    "dynamic type '{}' cannot be nested",
                    name
                )),
                Some(_) => Ok(()),
            },
            FieldType::List { element, .. } => self.check_nested(element),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u8_field(name: &str) -> Field {
        Field::new(name, FieldType::Scalar(ScalarKind::U8))
    }

    fn schema(name: &str, parent: Option<&str>, fields: Vec<Field>) -> Schema {
        Schema {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            dynamic: false,
            fields,
        }
    }

    #[test]
    fn test_resolve_ancestor_first() {
        let registry = SchemaRegistry::new([
            schema("C", Some("B"), vec![u8_field("c")]),
            schema("A", None, vec![u8_field("a1"), u8_field("a2")]),
            schema("B", Some("A"), vec![u8_field("b")]),
        ])
        .unwrap();

        let resolved = registry.resolve("C").unwrap();
        let order: Vec<_> = resolved
            .steps
            .iter()
            .map(|s| (s.declaring_type.as_str(), s.field.name.as_str()))
            .collect();
        assert_eq!(order, [("A", "a1"), ("A", "a2"), ("B", "b"), ("C", "c")]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unknown_type() {
        let registry = SchemaRegistry::new([schema("A", None, vec![])]).unwrap();
        assert!(matches!(
            registry.resolve("Nope"),
            Err(CodecError::UnknownType(_))
        ));
        assert!(registry.contains("A"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let result = SchemaRegistry::new([schema("A", Some("Missing"), vec![])]);
        assert!(result.unwrap_err().to_string().contains("unknown parent"));
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let result = SchemaRegistry::new([
            schema("A", Some("B"), vec![]),
            schema("B", Some("A"), vec![]),
        ]);
        assert!(result.unwrap_err().to_string().contains("cycle"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let result = SchemaRegistry::new([schema("A", None, vec![]), schema("A", None, vec![])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dynamic_parent_rejected() {
        let mut base = schema("Base", None, vec![]);
        base.dynamic = true;
        let result = SchemaRegistry::new([base, schema("D", Some("Base"), vec![])]);
        assert!(result.unwrap_err().to_string().contains("cannot be a parent"));
    }

    #[test]
    fn test_dynamic_nested_rejected() {
        let mut inner = schema("Inner", None, vec![]);
        inner.dynamic = true;
        let outer = schema(
            "Outer",
            None,
            vec![Field::new("xs", FieldType::list(FieldType::object("Inner")))],
        );
        let result = SchemaRegistry::new([inner, outer]);
        assert!(result.unwrap_err().to_string().contains("cannot be nested"));
    }

    #[test]
    fn test_unknown_nested_rejected() {
        let result = SchemaRegistry::new([schema(
            "Outer",
            None,
            vec![Field::new("x", FieldType::object("Ghost"))],
        )]);
        assert!(result.unwrap_err().to_string().contains("unknown nested type"));
    }

    #[test]
    fn test_recursive_nested_type_allowed() {
        let node = schema(
            "Node",
            None,
            vec![
                u8_field("value"),
                Field::new("children", FieldType::list(FieldType::object("Node"))),
            ],
        );
        assert!(SchemaRegistry::new([node]).is_ok());
    }

    #[test]
    fn test_self_containing_type_rejected() {
        let node = schema("Node", None, vec![Field::new("next", FieldType::object("Node"))]);
        let err = SchemaRegistry::new([node]).unwrap_err();
        assert!(matches!(err, CodecError::SchemaValidation(_)));
        assert!(err.to_string().contains("Node -> Node"));
    }

    #[test]
    fn test_indirect_containment_rejected() {
        let a = schema("A", None, vec![Field::new("b", FieldType::object("B"))]);
        let b = schema("B", None, vec![u8_field("v"), Field::new("a", FieldType::object("A"))]);
        let err = SchemaRegistry::new([a, b]).unwrap_err();
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn test_inherited_containment_rejected() {
        let base = schema("Base", None, vec![Field::new("d", FieldType::object("D"))]);
        let derived = schema("D", Some("Base"), vec![u8_field("v")]);
        assert!(SchemaRegistry::new([base, derived])
            .unwrap_err()
            .to_string()
            .contains("contains itself"));
    }

    #[test]
    fn test_guarded_self_reference_allowed() {
        let link = schema(
            "Link",
            None,
            vec![
                Field::new("has", FieldType::Scalar(ScalarKind::Bool)),
                Field::new("next", FieldType::object("Link")).when("has"),
            ],
        );
        assert!(SchemaRegistry::new([link]).is_ok());
    }

    #[test]
    fn test_shared_nested_type_allowed() {
        let leaf = schema("Leaf", None, vec![u8_field("v")]);
        let pair = schema(
            "Pair",
            None,
            vec![
                Field::new("l", FieldType::object("Leaf")),
                Field::new("r", FieldType::object("Leaf")),
            ],
        );
        assert!(SchemaRegistry::new([leaf, pair]).is_ok());
    }

    #[test]
    fn test_condition_must_be_earlier_bool() {
        let later = schema(
            "T",
            None,
            vec![
                u8_field("x").fixed_length(2).when("flag"),
                Field::new("flag", FieldType::Scalar(ScalarKind::Bool)),
            ],
        );
        assert!(SchemaRegistry::new([later])
            .unwrap_err()
            .to_string()
            .contains("earlier field"));

        let not_bool = schema("T", None, vec![u8_field("flag"), u8_field("x").when("flag")]);
        assert!(SchemaRegistry::new([not_bool])
            .unwrap_err()
            .to_string()
            .contains("must be a bool field"));
    }

    #[test]
    fn test_condition_may_reference_ancestor() {
        let base = schema(
            "Base",
            None,
            vec![Field::new("flag", FieldType::Scalar(ScalarKind::Bool))],
        );
        let derived = schema("D", Some("Base"), vec![u8_field("x").when("flag")]);
        assert!(SchemaRegistry::new([base, derived]).is_ok());
    }

    #[test]
    fn test_count_must_be_earlier_integer() {
        let bad = schema(
            "T",
            None,
            vec![
                Field::new("n", FieldType::String),
                Field::new("xs", FieldType::Bytes).count_from("n"),
            ],
        );
        assert!(SchemaRegistry::new([bad])
            .unwrap_err()
            .to_string()
            .contains("must be an integer field"));

        let good = schema(
            "T",
            None,
            vec![u8_field("n"), Field::new("xs", FieldType::Bytes).count_from("n")],
        );
        assert!(SchemaRegistry::new([good]).is_ok());
    }

    #[test]
    fn test_shadowed_field_rejected() {
        let result = SchemaRegistry::new([
            schema("A", None, vec![u8_field("x")]),
            schema("B", Some("A"), vec![u8_field("x")]),
        ]);
        assert!(result.unwrap_err().to_string().contains("already declared"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            { "name": "Inner", "fields": [ { "name": "v", "type": { "scalar": "i16" } } ] },
            { "name": "Outer", "fields": [
                { "name": "n", "type": { "scalar": "u8" } },
                { "name": "items", "type": { "list": { "element": { "object": "Inner" } } },
                  "fixed_count": { "field": "n" } }
            ] }
        ]"#;
        let registry = SchemaRegistry::from_json(json).unwrap();
        let outer = registry.resolve("Outer").unwrap();
        assert_eq!(outer.steps.len(), 2);
        assert!(outer.step("items").is_some());
        assert!(registry.get("Inner").is_some());
    }
}
