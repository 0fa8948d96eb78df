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

//! The execution context tells a function who calls it and what the caller
//! wants computed. It travels inside the invocation parameters:
//!
//! ```json
//! {
//!     "executionContext": {
//!         "executionType": "REPORT",
//!         "organizationId": "default",
//!         "workspaceId": "demo",
//!         "userId": "demo",
//!         "timestamp": "2024-09-12T12:51:26+00:00",
//!         "timezone": "Etc/UTC",
//!         "weekStart": "sunday",
//!         "reportExecutionRequest": { "attributes": [], "filters": [], "measures": [] }
//!     }
//! }
//! ```

pub mod filter;
pub mod label;
pub mod report;

pub use filter::*;
pub use label::LabelElementsExecutionRequest;
pub use report::*;

use chrono::{DateTime, FixedOffset};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The key of the execution context in the invocation parameters.
pub const EXECUTION_CONTEXT_KEY: &str = "executionContext";

/// What kind of computation the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    /// A report: attributes, filters and measures.
    Report,
    /// The distinct values of a label.
    LabelElements,
    /// A kind this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// A reference to a metadata object by its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectIdentifier {
    /// The object id, e.g. `attribute1`.
    pub id:          String,
    /// The object type, e.g. `label`, `fact`, `dataset`.
    #[serde(rename = "type")]
    pub object_type: String,
}

/// `{"identifier": {"id": ..., "type": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRef {
    /// The referenced object.
    pub identifier: ObjectIdentifier,
}

/// An attribute taking part in the execution, as resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAttribute {
    /// Identifier of the attribute.
    pub attribute_identifier: String,
    /// Title of the attribute.
    #[serde(default)]
    pub attribute_title:      Option<String>,
    /// Identifier of the label used to display the attribute.
    pub label_identifier:     String,
    /// Title of the label.
    #[serde(default)]
    pub label_title:          Option<String>,
    /// Granularity for date attributes, e.g. `MONTH`.
    #[serde(default)]
    pub date_granularity:     Option<String>,
}

/// The parsed execution context of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    /// What kind of computation the caller asks for.
    pub execution_type: ExecutionType,
    /// Organization of the caller.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Workspace the execution runs in.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// User who triggered the execution.
    #[serde(default)]
    pub user_id: Option<String>,
    /// RFC 3339 time of the execution, see
    /// [`ExecutionContext::parsed_timestamp`].
    #[serde(default)]
    pub timestamp: Option<String>,
    /// IANA time zone of the caller.
    #[serde(default)]
    pub timezone: Option<String>,
    /// First day of the week, e.g. `sunday`.
    #[serde(default)]
    pub week_start: Option<String>,
    /// Attributes taking part in the execution.
    #[serde(default)]
    pub attributes: Vec<ContextAttribute>,
    /// Filters of the execution.
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Older name of `report_execution_request`.
    #[serde(default)]
    pub execution_request: Option<ReportExecutionRequest>,
    /// The report request of a `REPORT` execution.
    #[serde(default)]
    pub report_execution_request: Option<ReportExecutionRequest>,
    /// The request of a `LABEL_ELEMENTS` execution.
    #[serde(default)]
    pub label_elements_execution_request: Option<LabelElementsExecutionRequest>,
}

impl ExecutionContext {
    /// Extracts the execution context from invocation parameters.
    ///
    /// Returns `None` if the parameters have no execution context or it does
    /// not parse, which is the case for calls that do not come from a
    /// conformant caller.
    pub fn from_parameters(parameters: &Value) -> Option<Self> {
        let context = parameters.get(EXECUTION_CONTEXT_KEY)?;
        match serde_json::from_value(context.clone()) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("Invalid execution context: {}", e);
                None
            }
        }
    }

    /// The report request, preferring `reportExecutionRequest` over the
    /// older `executionRequest`.
    pub fn report_execution_request(&self) -> Option<&ReportExecutionRequest> {
        self.report_execution_request
            .as_ref()
            .or(self.execution_request.as_ref())
    }

    /// The label elements request.
    pub fn label_elements_execution_request(&self) -> Option<&LabelElementsExecutionRequest> {
        self.label_elements_execution_request.as_ref()
    }

    /// The execution time, if present and valid RFC 3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::test_util::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn report_context() -> Result<()> {
        let ctx = ExecutionContext::from_parameters(&report_parameters()?).ok_or("no context")?;

        assert_eq!(ExecutionType::Report, ctx.execution_type);
        assert_eq!(Some("default"), ctx.organization_id.as_deref());
        assert_eq!(Some("demo"), ctx.workspace_id.as_deref());
        assert_eq!(Some("Etc/UTC"), ctx.timezone.as_deref());
        assert_eq!(Some("sunday"), ctx.week_start.as_deref());

        let ts = ctx.parsed_timestamp().ok_or("no timestamp")?;
        assert_eq!((2024, 9, 12), (ts.year(), ts.month(), ts.day()));
        assert_eq!((12, 51, 26), (ts.hour(), ts.minute(), ts.second()));

        let request = ctx.report_execution_request().ok_or("no report request")?;
        assert_eq!(1, request.attributes.len());
        assert_eq!("a_attribute1", request.attributes[0].local_identifier);
        assert_eq!("attribute1", request.attributes[0].label.identifier.id);
        assert_eq!(Some(false), request.attributes[0].show_all_values);

        match &request.filters[..] {
            [Filter::NegativeAttribute(f)] => {
                assert_eq!(Some(vec![Some("id1".to_owned())]), f.not_in.values)
            }
            other => panic!("unexpected filters {:?}", other),
        }

        let measure = request.measure("m_fact1_min").ok_or("no measure")?;
        let simple = measure.definition.measure.as_ref().ok_or("not simple")?;
        assert_eq!("fact1", simple.item.identifier.id);
        assert_eq!("fact", simple.item.identifier.object_type);
        assert_eq!(Some("MIN"), simple.aggregation.as_deref());
        assert!(!simple.compute_ratio);
        assert!(request.aux_measures.is_empty());

        assert!(ctx.label_elements_execution_request().is_none());
        Ok(())
    }

    #[test]
    fn label_elements_context() -> Result<()> {
        let ctx = ExecutionContext::from_parameters(&label_elements_parameters()?)
            .ok_or("no context")?;

        assert_eq!(ExecutionType::LabelElements, ctx.execution_type);
        assert!(ctx.report_execution_request().is_none());

        let request = ctx
            .label_elements_execution_request()
            .ok_or("no label elements request")?;
        assert_eq!("attribute2", request.label);
        assert_eq!(Some(0), request.offset);
        assert_eq!(Some(1000), request.limit);
        assert_eq!(Some("ASC"), request.sort_order.as_deref());
        assert_eq!(Some("value*"), request.pattern_filter.as_deref());
        Ok(())
    }

    #[test]
    fn older_execution_request_is_used() {
        let ctx = ExecutionContext::from_parameters(&json!({
            "executionContext": {
                "executionType": "REPORT",
                "executionRequest": {
                    "attributes": [],
                    "filters": [],
                    "measures": [{
                        "localIdentifier": "m1",
                        "definition": { "arithmeticMeasure": { "operator": "SUM" } }
                    }]
                }
            }
        }))
        .unwrap();

        let request = ctx.report_execution_request().unwrap();
        let definition = &request.measures[0].definition;
        assert!(definition.measure.is_none());
        assert!(definition.other.contains_key("arithmeticMeasure"));
    }

    #[test]
    fn unknown_execution_type() {
        let ctx = ExecutionContext::from_parameters(&json!({
            "executionContext": { "executionType": "SOMETHING_NEW" }
        }))
        .unwrap();

        assert_eq!(ExecutionType::Unknown, ctx.execution_type);
        assert!(ctx.report_execution_request().is_none());
        assert!(ctx.parsed_timestamp().is_none());
    }

    #[test]
    fn missing_or_invalid_context() {
        assert!(ExecutionContext::from_parameters(&json!({})).is_none());
        assert!(ExecutionContext::from_parameters(&json!({"foo": 1})).is_none());
        assert!(ExecutionContext::from_parameters(&json!({"executionContext": 42})).is_none());
        assert!(ExecutionContext::from_parameters(&json!({
            "executionContext": { "workspaceId": "demo" }
        }))
        .is_none());
        assert!(ExecutionContext::from_parameters(&Value::Null).is_none());
    }

    #[test]
    fn context_attributes() {
        let ctx = ExecutionContext::from_parameters(&json!({
            "executionContext": {
                "executionType": "REPORT",
                "attributes": [{
                    "attributeIdentifier": "date.month",
                    "attributeTitle": "Date - Month/Year",
                    "labelIdentifier": "date.month",
                    "labelTitle": "Date - Month/Year",
                    "dateGranularity": "MONTH"
                }]
            }
        }))
        .unwrap();

        assert_eq!(1, ctx.attributes.len());
        assert_eq!(Some("MONTH"), ctx.attributes[0].date_granularity.as_deref());
    }
}
