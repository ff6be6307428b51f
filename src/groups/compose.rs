//! Aggregation of independent sub-operation results.

use crate::http::response::{ApiError, ResponseData};

/// A sub-operation: runs when called, yields a payload or an error.
pub type SubOp<'a> = Box<dyn FnOnce() -> Result<ResponseData, ApiError> + 'a>;

/// Run sub-operations in order and merge their success payloads.
///
/// The first error aborts the sequence: later sub-operations never execute,
/// and the error becomes the request error. Mutations already applied by
/// earlier sub-operations are NOT rolled back; callers must not assume a
/// transaction spanning sub-operations.
///
/// Key collisions are resolved deterministically: later sub-operations win.
pub fn compose_results(ops: Vec<SubOp<'_>>) -> Result<ResponseData, ApiError> {
    let mut merged = ResponseData::new();
    for op in ops {
        merged.extend(op()?);
    }
    Ok(merged)
}
