//! Structured Output
//!
//! Response format descriptors that constrain the model to a JSON shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Requested output format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// "text", "json_object" or "json_schema"
    #[serde(rename = "type")]
    pub format_type: String,

    /// Schema, only for "json_schema"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchema>,
}

impl ResponseFormat {
    /// Free-form text
    pub fn text() -> Self {
        Self {
            format_type: "text".to_string(),
            json_schema: None,
        }
    }

    /// Any JSON object
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
            json_schema: None,
        }
    }

    /// JSON matching the given schema
    pub fn json_schema(schema: JsonSchema) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: Some(schema),
        }
    }
}

/// A named schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    pub name: String,
    pub schema: SchemaDetails,

    /// Server must enforce the schema exactly
    pub strict: bool,
}

impl JsonSchema {
    /// Create a strict schema
    pub fn strict(name: impl Into<String>, schema: SchemaDetails) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: true,
        }
    }
}

/// Object shape of a structured output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDetails {
    #[serde(rename = "type")]
    pub schema_type: String,

    pub properties: BTreeMap<String, SchemaProperty>,

    pub required: Vec<String>,

    /// `false` closes the object to keys outside `properties`
    pub additional_properties: bool,
}

impl SchemaDetails {
    /// A closed object where every property is required
    pub fn closed_object(properties: impl IntoIterator<Item = (String, SchemaProperty)>) -> Self {
        let properties: BTreeMap<_, _> = properties.into_iter().collect();
        Self {
            schema_type: "object".to_string(),
            required: properties.keys().cloned().collect(),
            properties,
            additional_properties: false,
        }
    }
}

/// One property in a structured output schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub property_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaProperty {
    pub fn new(property_type: impl Into<String>) -> Self {
        Self {
            property_type: property_type.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_schema() -> JsonSchema {
        JsonSchema::strict(
            "movie_response",
            SchemaDetails::closed_object([
                ("title".to_string(), SchemaProperty::new("string")),
                (
                    "rating".to_string(),
                    SchemaProperty::new("number")
                        .with_description("The rating of the movie, typically out of 10"),
                ),
                ("summary".to_string(), SchemaProperty::new("string")),
            ]),
        )
    }

    #[test]
    fn test_json_schema_serialization() {
        let format = ResponseFormat::json_schema(movie_schema());
        let json = serde_json::to_value(&format).unwrap();

        assert_eq!(json["type"], "json_schema");
        assert_eq!(json["json_schema"]["name"], "movie_response");
        assert_eq!(json["json_schema"]["strict"], true);
        assert_eq!(json["json_schema"]["schema"]["additional_properties"], false);
        assert_eq!(
            json["json_schema"]["schema"]["required"],
            serde_json::json!(["rating", "summary", "title"])
        );
        assert!(json["json_schema"]["schema"]["properties"]["title"]
            .get("description")
            .is_none());

        let decoded: ResponseFormat = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, format);
    }

    #[test]
    fn test_plain_formats_omit_schema() {
        let json = serde_json::to_string(&ResponseFormat::json_object()).unwrap();
        assert_eq!(json, r#"{"type":"json_object"}"#);

        let decoded: ResponseFormat = serde_json::from_str(r#"{"type":"text"}"#).unwrap();
        assert_eq!(decoded, ResponseFormat::text());
    }

    #[test]
    fn test_missing_required_key_is_named() {
        let err = serde_json::from_str::<JsonSchema>(
            r#"{"name":"x","schema":{"type":"object","properties":{},"required":[]},"strict":true}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("additional_properties"));
    }
}
