use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

const TARGETING_KEY_ATTRIBUTE: &str = "targetingKey";

/// Attributes attached to an evaluation context.
pub type Attributes = HashMap<String, AttributeValue>;

/// Value of a context attribute.
#[derive(Debug, Serialize, Deserialize, PartialEq, From, Clone)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<AttributeValue>),
    Struct(HashMap<String, AttributeValue>),
    Null,
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Subject of a flag resolution: a targeting key plus arbitrary attributes.
///
/// The remote service needs the targeting key to evaluate targeting rules, so resolving against
/// a context with an empty key fails locally without contacting the service.
///
/// ```
/// # use remote_flags::EvaluationContext;
/// let context = EvaluationContext::new("d45e303a-38c2-11ed-a261-0242ac120002")
///     .with_attribute("email", "john.doe@example.org")
///     .with_attribute("admin", true);
/// assert_eq!(context.targeting_key(), "d45e303a-38c2-11ed-a261-0242ac120002");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    targeting_key: String,
    #[serde(flatten)]
    attributes: Attributes,
}

impl EvaluationContext {
    /// Create a context for the given targeting key with no attributes.
    pub fn new(targeting_key: impl Into<String>) -> Self {
        EvaluationContext {
            targeting_key: targeting_key.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute, replacing any previous value under the same name.
    ///
    /// An attribute named `targetingKey` is ignored: the targeting key can only be set through
    /// [`EvaluationContext::new`].
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        let name = name.into();
        if name == TARGETING_KEY_ATTRIBUTE {
            warn_shadowed_targeting_key();
        } else {
            self.attributes.insert(name, value.into());
        }
        self
    }

    /// Replace all attributes. A `targetingKey` entry is dropped, see
    /// [`EvaluationContext::with_attribute`].
    pub fn with_attributes(mut self, mut attributes: Attributes) -> Self {
        if attributes.remove(TARGETING_KEY_ATTRIBUTE).is_some() {
            warn_shadowed_targeting_key();
        }
        self.attributes = attributes;
        self
    }

    /// Identifier of the subject the flag is resolved for.
    pub fn targeting_key(&self) -> &str {
        &self.targeting_key
    }

    /// Attributes sent along with the targeting key.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

fn warn_shadowed_targeting_key() {
    log::warn!(target: "remote_flags",
               "ignoring `targetingKey` attribute, it cannot override the targeting key");
}
