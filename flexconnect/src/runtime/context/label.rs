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

//! The request shape of a `LABEL_ELEMENTS` execution, which asks for the
//! distinct values of one label.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The parameters of a label elements execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelElementsExecutionRequest {
    /// The label whose elements are requested.
    pub label: String,
    /// Number of elements to skip.
    #[serde(default)]
    pub offset: Option<u64>,
    /// Maximum number of elements to return.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Skip the elements of the attribute's primary label.
    #[serde(default)]
    pub exclude_primary_label: Option<bool>,
    /// Only return these exact values.
    #[serde(default)]
    pub exact_filter: Option<Vec<Option<String>>>,
    /// Only return values matching this pattern.
    #[serde(default)]
    pub pattern_filter: Option<String>,
    /// Invert `exact_filter`.
    #[serde(default)]
    pub complement_filter: Option<bool>,
    /// Which label of the attribute the filters match against.
    #[serde(default)]
    pub filter_by: Option<Value>,
    /// Filters on other labels that the returned elements depend on.
    #[serde(default)]
    pub depends_on: Option<Vec<Value>>,
    /// Items the returned elements must have data for.
    #[serde(default)]
    pub validate_by: Option<Vec<Value>>,
    /// `ASC` or `DESC`.
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl LabelElementsExecutionRequest {
    /// Returns true if `value` passes the exact filter, honoring
    /// `complement_filter`. Without an exact filter every value passes.
    pub fn accepts(&self, value: Option<&str>) -> bool {
        match &self.exact_filter {
            Some(values) => {
                let listed = values.iter().any(|v| v.as_deref() == value);
                listed != self.complement_filter.unwrap_or(false)
            }
            None => true,
        }
    }
}
