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

#![warn(missing_docs, clippy::needless_borrow)]
// Clippy lints, some should be disabled incrementally
#![allow(
    clippy::float_cmp,
    clippy::module_inception,
    clippy::new_without_default,
    clippy::type_complexity,
    clippy::upper_case_acronyms
)]

//! FlexConnect lets a data platform pull tables from user code. A function
//! declares a name and an Arrow schema, receives an execution context with
//! each call, and answers with Arrow record batches.
//!
//! The crate holds the function contract, the execution context model, the
//! result payload with its side messages, and an in-process host that
//! serves functions over Arrow Flight message types.

pub mod config;
pub mod error;
pub mod function;
pub mod launcher;
pub mod prelude;
pub mod registry;
pub mod runtime;
pub mod test_util;

pub use arrow;
pub use arrow_flight;
