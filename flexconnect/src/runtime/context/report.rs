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

//! The request shape of a `REPORT` execution.

use super::filter::Filter;
use super::IdentifierRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The attributes, filters and measures a report asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportExecutionRequest {
    /// Attributes to slice by.
    #[serde(default)]
    pub attributes:   Vec<Attribute>,
    /// Filters to apply.
    #[serde(default)]
    pub filters:      Vec<Filter>,
    /// Measures to compute.
    #[serde(default)]
    pub measures:     Vec<Measure>,
    /// Measures needed to compute other measures, not shown in the report.
    #[serde(default)]
    pub aux_measures: Vec<Measure>,
}

impl ReportExecutionRequest {
    /// Returns the measure with the given local identifier.
    pub fn measure(&self, local_identifier: &str) -> Option<&Measure> {
        self.measures
            .iter()
            .chain(self.aux_measures.iter())
            .find(|m| m.local_identifier == local_identifier)
    }
}

/// An attribute of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Identifier of the attribute within the request.
    pub local_identifier: String,
    /// The label whose values are shown.
    pub label:            IdentifierRef,
    /// Whether to show values with no data.
    #[serde(default)]
    pub show_all_values:  Option<bool>,
}

/// A measure of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    /// Identifier of the measure within the request.
    pub local_identifier: String,
    /// How the measure is computed.
    pub definition:       MeasureDefinition,
}

/// The definition of a measure. Simple measures are typed; arithmetic,
/// period-over-period and other definitions are kept as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureDefinition {
    /// A simple measure over a fact, attribute or metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<SimpleMeasure>,
    /// Any other definition keys.
    #[serde(flatten)]
    pub other:   Map<String, Value>,
}

/// An aggregation over a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMeasure {
    /// The aggregated fact, attribute or metric.
    pub item:          IdentifierRef,
    /// e.g. `SUM`, `MIN`, `COUNT`.
    #[serde(default)]
    pub aggregation:   Option<String>,
    /// Whether to show the value as a share of the total.
    #[serde(default)]
    pub compute_ratio: bool,
    /// Filters that apply to this measure only.
    #[serde(default)]
    pub filters:       Vec<Filter>,
}
