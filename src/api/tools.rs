//! Tool Calling Types
//!
//! Tool declarations sent with a request and the tool calls the model
//! emits in its reply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A single declared function argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// JSON type name ("number", "string", ...)
    #[serde(rename = "type")]
    pub param_type: String,

    /// What the argument means
    pub description: String,

    /// Example value shown to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_value: Option<String>,
}

impl FunctionParameter {
    /// Create a parameter without an example value
    pub fn new(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            description: description.into(),
            example_value: None,
        }
    }

    /// Attach an example value
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example_value = Some(example.into());
        self
    }
}

/// JSON-Schema-like description of a function's arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    /// Always "object"
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Declared arguments keyed by name
    pub properties: BTreeMap<String, FunctionParameter>,

    /// Names that must be supplied
    pub required: Vec<String>,

    /// Names that may be supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<Vec<String>>,
}

impl FunctionParameters {
    /// Create an object schema from its properties and required names
    pub fn new(
        properties: impl IntoIterator<Item = (String, FunctionParameter)>,
        required: Vec<String>,
    ) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: properties.into_iter().collect(),
            required,
            optional: None,
        }
    }

    /// Set the optional argument names
    pub fn with_optional(mut self, optional: Vec<String>) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Required names that have no matching entry in `properties`
    pub fn undeclared_required(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|name| !self.properties.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Function definition nested under a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<FunctionParameters>,
}

/// Tool definition
///
/// The API reads name, description and parameters both at the top level and
/// from the nested `function` object, so both are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Tool name, unique within a request
    pub name: String,

    /// Description shown to the model
    pub description: String,

    /// Arguments schema
    pub parameters: FunctionParameters,

    /// Function definition
    pub function: FunctionDefinition,
}

impl Tool {
    /// Declare a function tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: FunctionParameters,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.clone(),
                description: Some(description.clone()),
                parameters: Some(parameters.clone()),
            },
            name,
            description,
            parameters,
        }
    }
}

/// Tool choice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// String values: "none", "auto", "required"
    Mode(String),

    /// Specific function
    Function {
        #[serde(rename = "type")]
        choice_type: String,
        function: ToolChoiceFunction,
    },
}

impl ToolChoice {
    /// Let the model decide
    pub fn auto() -> Self {
        ToolChoice::Mode("auto".to_string())
    }

    /// Never call tools
    pub fn none() -> Self {
        ToolChoice::Mode("none".to_string())
    }

    /// Always call some tool
    pub fn required() -> Self {
        ToolChoice::Mode("required".to_string())
    }

    /// Force a call to the named function
    pub fn function(name: impl Into<String>) -> Self {
        ToolChoice::Function {
            choice_type: "function".to_string(),
            function: ToolChoiceFunction { name: name.into() },
        }
    }
}

/// Specific function for tool choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolChoiceFunction {
    pub name: String,
}

/// A tool call made by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Position within the assistant turn
    pub index: u32,

    /// Type of tool call (usually "function")
    #[serde(rename = "type")]
    pub call_type: String,

    /// Function details
    pub function: FunctionCallDetails,
}

/// Function call details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallDetails {
    /// Name of the function
    pub name: String,

    /// Arguments, carried on the wire as a JSON string holding an object
    #[serde(with = "string_encoded_map")]
    pub arguments: BTreeMap<String, String>,
}

impl FunctionCallDetails {
    /// Parse one argument into a typed value
    pub fn argument<T: FromStr>(&self, key: &str) -> Option<T> {
        self.arguments.get(key).and_then(|v| v.trim().parse().ok())
    }
}

/// Serde adapter for an object that travels as an escaped JSON string.
///
/// Scalars are flattened to their text; nested values keep their compact
/// JSON text. An unparseable or non-object inner string becomes an empty map.
mod string_encoded_map {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<String, String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = serde_json::to_string(map).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => Ok(parse_object(&raw)),
            Value::Object(obj) => Ok(flatten(obj)),
            other => Err(D::Error::custom(format!(
                "invalid type for arguments: expected a JSON string, found {}",
                other
            ))),
        }
    }

    fn parse_object(raw: &str) -> BTreeMap<String, String> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(obj)) => flatten(obj),
            _ => {
                tracing::debug!(arguments = raw, "tool call arguments are not a JSON object");
                BTreeMap::new()
            }
        }
    }

    fn flatten(obj: serde_json::Map<String, Value>) -> BTreeMap<String, String> {
        obj.into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect()
    }
}
