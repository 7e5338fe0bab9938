//! # Resource Instances
//!
//! Access-level predicates are evaluated against concrete resource values.
//! A type becomes usable as a resource by implementing [`Resource`], which
//! exposes its field names (checked when the definition is registered) and
//! the string value of a field (read for the audit record).

use std::any::{Any, TypeId};

/// A value subject to access control.
///
/// # Example
///
/// ```
/// use warden_registry::Resource;
///
/// struct Document {
///     document_id: String,
///     owner_id: String,
/// }
///
/// impl Resource for Document {
///     fn fields() -> &'static [&'static str] {
///         &["document_id", "owner_id"]
///     }
///
///     fn field_value(&self, field: &str) -> Option<String> {
///         match field {
///             "document_id" => Some(self.document_id.clone()),
///             "owner_id" => Some(self.owner_id.clone()),
///             _ => None,
///         }
///     }
/// }
///
/// let doc = Document { document_id: "doc-1".into(), owner_id: "u1".into() };
/// assert_eq!(doc.field_value("document_id"), Some("doc-1".to_string()));
/// ```
pub trait Resource: Any + Send + Sync {
    /// Names of the fields an identifier may refer to.
    fn fields() -> &'static [&'static str]
    where
        Self: Sized;

    /// String value of a field, if the field exists.
    fn field_value(&self, field: &str) -> Option<String>;
}

/// A borrowed resource instance with its concrete type erased.
///
/// Built with [`Instance::of`]; carries both the [`Any`] view used to hand
/// the value back to typed predicates and the [`Resource`] view used to read
/// the identifier.
#[derive(Clone, Copy)]
pub struct Instance<'a> {
    any: &'a dyn Any,
    resource: &'a dyn Resource,
    type_name: &'static str,
}

impl<'a> Instance<'a> {
    /// Wrap a typed resource value.
    pub fn of<R: Resource>(value: &'a R) -> Self {
        Self {
            any: value,
            resource: value,
            type_name: std::any::type_name::<R>(),
        }
    }

    /// Concrete type of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.any.type_id()
    }

    /// Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Downcast back to the concrete type.
    pub fn downcast<R: Resource>(&self) -> Option<&'a R> {
        self.any.downcast_ref::<R>()
    }

    /// Read a field value.
    pub fn field_value(&self, field: &str) -> Option<String> {
        self.resource.field_value(field)
    }
}

impl std::fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish()
    }
}
