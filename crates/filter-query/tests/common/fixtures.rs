//! Schema fixtures.
//!
//! Every registry here is anchored at Wednesday 2024-03-13 12:00:00 so that
//! relative phrases such as `yesterday` compile to fixed dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};

use filter_query::schema::{FieldRegistry, SchemaConfig};

/// The reference instant used by every fixture registry.
pub fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 13)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// A server inventory schema covering every field kind.
pub fn inventory_schema() -> Value {
    json!({
        "fields": [
            {"name": "name", "type": "string", "aliases": ["hostname"]},
            {"name": "comment", "type": "text"},
            {"name": "memory", "type": "integer"},
            {"name": "created", "type": "date"},
            {"name": "updated", "type": "timestamp", "only_explicit": true},
            {"name": "secret", "type": "string", "only_explicit": true},
            {
                "name": "status",
                "type": "integer",
                "values": [
                    {"name": "active", "value": true},
                    {"name": "inactive", "value": false}
                ]
            },
            {
                "name": "flag",
                "type": "string",
                "values": [
                    {"name": "yes", "value": true},
                    {"name": "no", "value": false}
                ]
            },
            {
                "name": "tier",
                "type": "string",
                "operators": ["eq", "ne"],
                "values": [
                    {"name": "gold", "value": "G"},
                    {"name": "silver", "value": "S"},
                    {"name": "legacy", "value": 7}
                ]
            }
        ]
    })
}

/// Builds a registry from a JSON schema, anchored at [`reference_time`].
pub fn registry_from(schema: Value) -> FieldRegistry {
    let config: SchemaConfig = serde_json::from_value(schema).expect("fixture schema is valid");
    config
        .fields
        .into_iter()
        .fold(FieldRegistry::builder(), |builder, field| {
            builder.register(field).expect("fixture fields are unique")
        })
        .with_reference_time(reference_time())
        .build()
}

/// The inventory registry.
pub fn inventory_registry() -> FieldRegistry {
    registry_from(inventory_schema())
}
