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

//! Common test utility methods, shared with the function crates.

use crate::error::Result;
use serde_json::Value;

/// Invocation parameters with a valid `REPORT` execution context. The report
/// slices by `attribute1`, excludes the value `id1` and asks for
/// `MIN(fact1)`.
pub fn report_parameters() -> Result<Value> {
    Ok(serde_json::from_str(include_str!(
        "../tests/data/report_parameters.json"
    ))?)
}

/// Invocation parameters with a valid `LABEL_ELEMENTS` execution context for
/// `attribute2`.
pub fn label_elements_parameters() -> Result<Value> {
    Ok(serde_json::from_str(include_str!(
        "../tests/data/label_elements_parameters.json"
    ))?)
}

/// Compares formatted output of a record batch with an expected
/// vector of strings, with the result of pretty formatting record batches.
/// This is a macro so errors appear on the correct line.
///
/// Designed so that failure output can be directly copy/pasted
/// into the test code as expected results.
#[macro_export]
macro_rules! assert_batches_eq {
    ($EXPECTED_LINES: expr, $CHUNKS: expr) => {
        let expected_lines: Vec<String> = $EXPECTED_LINES.iter().map(|&s| s.into()).collect();

        let formatted = $crate::arrow::util::pretty::pretty_format_batches($CHUNKS)
            .unwrap()
            .to_string();

        let actual_lines: Vec<&str> = formatted.trim().lines().collect();

        assert_eq!(
            expected_lines, actual_lines,
            "\n\nexpected:\n\n{:#?}\nactual:\n\n{:#?}\n\n",
            expected_lines, actual_lines
        );
    };
}
