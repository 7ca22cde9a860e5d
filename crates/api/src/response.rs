//! `{ "data": ... }` envelope for read endpoints.
//!
//! Monitoring mutations (provision, thresholds) answer with their own flat
//! shapes carrying `ok` or `status`, so only user-home and template
//! responses go through here.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
