// MIT License
//
// Copyright (c) 2024 Erik Holum
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Fatal error types for the planners.
//!
//! Per-iteration infeasibility (invalid segments, degenerate edges, empty
//! neighborhoods) is never an error: those iterations are simply discarded.
//! Only the two failure classes below abort a run.

/// Errors that abort a planning run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tunable parameter was rejected during setup. The run never starts.
    #[error("invalid planner configuration: {param} {reason}")]
    Config {
        /// Name of the offending parameter.
        param: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An internal invariant broke mid-run. This indicates a defect in the
    /// tree bookkeeping or rewiring logic, never a property of the problem
    /// being solved.
    #[error("planner invariant violated: {0}")]
    InvariantViolation(&'static str),
}
