//! The `{ "data": ... }` envelope every successful response is wrapped in.
//! Errors use `{ "error", "code" }` instead (see [`crate::error`]).

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
