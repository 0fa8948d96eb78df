// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Filters of an execution request.
//!
//! On the wire a filter is an object with a single key naming its kind:
//!
//! ```json
//! {
//!     "negativeAttributeFilter": {
//!         "label": { "identifier": { "id": "attribute1", "type": "label" } },
//!         "notIn": { "values": ["id1"] }
//!     }
//! }
//! ```
//!
//! Kinds this crate does not model are kept as [`Filter::Other`].

use super::IdentifierRef;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The elements an attribute filter selects, either by value or by URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeFilterElements {
    /// Element values. `None` stands for the empty (null) value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Option<String>>>,
    /// Element URIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris:   Option<Vec<String>>,
}

/// Keeps the rows whose label value is one of the elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositiveAttributeFilter {
    /// The filtered label.
    pub label:           IdentifierRef,
    /// The selected elements.
    #[serde(rename = "in")]
    pub elements:        AttributeFilterElements,
    /// Whether the filter applies on the computed result.
    #[serde(default)]
    pub apply_on_result: Option<bool>,
}

/// Drops the rows whose label value is one of the elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeAttributeFilter {
    /// The filtered label.
    pub label:           IdentifierRef,
    /// The excluded elements.
    pub not_in:          AttributeFilterElements,
    /// Whether the filter applies on the computed result.
    #[serde(default)]
    pub apply_on_result: Option<bool>,
}

/// A date range relative to now, in units of `granularity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeDateFilter {
    /// The filtered date dataset.
    pub dataset:         IdentifierRef,
    /// e.g. `GDC.time.month`.
    pub granularity:     String,
    /// Start offset, inclusive.
    pub from:            i64,
    /// End offset, inclusive.
    pub to:              i64,
    /// Whether the filter applies on the computed result.
    #[serde(default)]
    pub apply_on_result: Option<bool>,
}

/// A fixed date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteDateFilter {
    /// The filtered date dataset.
    pub dataset:         IdentifierRef,
    /// Start date, inclusive.
    pub from:            String,
    /// End date, inclusive.
    pub to:              String,
    /// Whether the filter applies on the computed result.
    #[serde(default)]
    pub apply_on_result: Option<bool>,
}

/// A filter of an execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Filter {
    /// `positiveAttributeFilter`
    PositiveAttribute(PositiveAttributeFilter),
    /// `negativeAttributeFilter`
    NegativeAttribute(NegativeAttributeFilter),
    /// `relativeDateFilter`
    RelativeDate(RelativeDateFilter),
    /// `absoluteDateFilter`
    AbsoluteDate(AbsoluteDateFilter),
    /// Any other filter, as received.
    Other(Value),
}

const POSITIVE_ATTRIBUTE: &str = "positiveAttributeFilter";
const NEGATIVE_ATTRIBUTE: &str = "negativeAttributeFilter";
const RELATIVE_DATE: &str = "relativeDateFilter";
const ABSOLUTE_DATE: &str = "absoluteDateFilter";

impl Filter {
    /// The identifier of the label or dataset the filter applies to, if the
    /// filter is one of the modeled kinds.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Filter::PositiveAttribute(f) => Some(&f.label.identifier.id),
            Filter::NegativeAttribute(f) => Some(&f.label.identifier.id),
            Filter::RelativeDate(f) => Some(&f.dataset.identifier.id),
            Filter::AbsoluteDate(f) => Some(&f.dataset.identifier.id),
            Filter::Other(_) => None,
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    kind: &str,
    body: &Value,
    variant: fn(T) -> Filter,
) -> Option<Filter> {
    match serde_json::from_value(body.clone()) {
        Ok(f) => Some(variant(f)),
        Err(e) => {
            debug!("Keeping malformed {} as raw filter: {}", kind, e);
            None
        }
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        let parsed = match &value {
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((kind, body)) => match kind.as_str() {
                    POSITIVE_ATTRIBUTE => parse(kind, body, Filter::PositiveAttribute),
                    NEGATIVE_ATTRIBUTE => parse(kind, body, Filter::NegativeAttribute),
                    RELATIVE_DATE => parse(kind, body, Filter::RelativeDate),
                    ABSOLUTE_DATE => parse(kind, body, Filter::AbsoluteDate),
                    _ => None,
                },
                None => None,
            },
            _ => None,
        };
        parsed.unwrap_or(Filter::Other(value))
    }
}

fn wrap<T: Serialize>(kind: &str, body: &T) -> Value {
    let mut map = Map::new();
    map.insert(
        kind.to_owned(),
        serde_json::to_value(body).unwrap_or(Value::Null),
    );
    Value::Object(map)
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::PositiveAttribute(f) => wrap(POSITIVE_ATTRIBUTE, &f),
            Filter::NegativeAttribute(f) => wrap(NEGATIVE_ATTRIBUTE, &f),
            Filter::RelativeDate(f) => wrap(RELATIVE_DATE, &f),
            Filter::AbsoluteDate(f) => wrap(ABSOLUTE_DATE, &f),
            Filter::Other(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn negative_attribute_filter() {
        let filter: Filter = serde_json::from_value(json!({
            "negativeAttributeFilter": {
                "label": { "identifier": { "id": "attribute1", "type": "label" } },
                "notIn": { "values": ["id1", null] },
                "applyOnResult": null
            }
        }))
        .unwrap();

        match &filter {
            Filter::NegativeAttribute(f) => {
                assert_eq!("attribute1", f.label.identifier.id);
                assert_eq!("label", f.label.identifier.object_type);
                assert_eq!(
                    Some(vec![Some("id1".to_owned()), None]),
                    f.not_in.values
                );
                assert_eq!(None, f.apply_on_result);
            }
            other => panic!("unexpected filter {:?}", other),
        }
        assert_eq!(Some("attribute1"), filter.target_id());
    }

    #[test]
    fn positive_attribute_filter_by_uri() {
        let filter = Filter::from(json!({
            "positiveAttributeFilter": {
                "label": { "identifier": { "id": "attribute2", "type": "label" } },
                "in": { "uris": ["/elements?id=1"] }
            }
        }));
        match filter {
            Filter::PositiveAttribute(f) => {
                assert_eq!(None, f.elements.values);
                assert_eq!(Some(vec!["/elements?id=1".to_owned()]), f.elements.uris);
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn date_filters() {
        let relative = Filter::from(json!({
            "relativeDateFilter": {
                "dataset": { "identifier": { "id": "date", "type": "dataset" } },
                "granularity": "GDC.time.month",
                "from": -11,
                "to": 0
            }
        }));
        assert!(matches!(relative, Filter::RelativeDate(ref f) if f.from == -11 && f.to == 0));

        let absolute = Filter::from(json!({
            "absoluteDateFilter": {
                "dataset": { "identifier": { "id": "date", "type": "dataset" } },
                "from": "2024-01-01",
                "to": "2024-12-31"
            }
        }));
        assert_eq!(Some("date"), absolute.target_id());
    }

    #[test]
    fn unknown_and_malformed_filters_are_kept() {
        let ranking = json!({ "rankingFilter": { "operator": "TOP", "value": 3 } });
        assert_eq!(Filter::Other(ranking.clone()), Filter::from(ranking));

        let malformed = json!({ "negativeAttributeFilter": { "notIn": {} } });
        assert_eq!(Filter::Other(malformed.clone()), Filter::from(malformed));
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let wire = json!({
            "negativeAttributeFilter": {
                "label": { "identifier": { "id": "attribute1", "type": "label" } },
                "notIn": { "values": ["id1"] },
                "applyOnResult": true
            }
        });
        let filter = Filter::from(wire.clone());
        assert_eq!(wire, serde_json::to_value(&filter).unwrap());
    }
}
