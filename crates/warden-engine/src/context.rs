//! Resolved caller context
//!
//! The decision engine is generic over the context type so hosts can carry
//! whatever attributes their access-level predicates need. The engine itself
//! only reads the user id and the role.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the engine needs to know about a resolved caller.
pub trait AuthContext: Send + Sync + 'static {
    /// Identifier of the caller, reported in audit records.
    fn user_id(&self) -> Option<&str>;

    /// Role of the caller. A context without a role is rejected.
    fn role(&self) -> Option<&str>;
}

/// General-purpose context with free-form attributes.
///
/// # Examples
///
/// ```
/// use warden_engine::{AuthContext, Principal};
///
/// let principal = Principal::new("u1", "MANAGER")
///     .with_attribute("assignedUsers", vec!["u2", "u3"]);
///
/// assert_eq!(principal.role(), Some("MANAGER"));
/// let assigned: Vec<String> = principal.attr("assignedUsers").unwrap();
/// assert_eq!(assigned, vec!["u2", "u3"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User ID
    pub user_id: String,

    /// Role, if one has been assigned
    pub role: Option<String>,

    /// Extra attributes read by access-level predicates
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Principal {
    /// Create a principal with a role.
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Some(role.into()),
            attributes: Map::new(),
        }
    }

    /// Create a principal that has no role yet.
    pub fn without_role(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Attach an attribute.
    ///
    /// Values that cannot be represented as JSON are stored as `null`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.attributes.insert(key.into(), value);
        self
    }

    /// Read an attribute as a typed value.
    pub fn attr<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Check whether a string-list attribute contains `needle`.
    pub fn attr_contains(&self, key: &str, needle: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(needle)))
    }
}

impl AuthContext for Principal {
    fn user_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}
