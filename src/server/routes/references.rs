//! Reference listing endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::server::envelope::Payload;
use crate::server::error::Result;
use crate::server::middleware::RepoDir;
use crate::server::state::AppState;

/// One reference on the wire.
#[derive(Debug, Serialize)]
pub struct ReferenceRecord {
    /// The hash of the commit this reference points to
    pub hash: String,
    /// The full reference name, e.g. `refs/heads/master`
    pub name: String,
}

/// `GET /v1/repositories/{directory}/references`
///
/// Every reference in the store, in enumeration order. Defective
/// individual references are skipped, matching the reference index.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(RepoDir(dir)): Extension<RepoDir>,
) -> Result<Json<Payload>> {
    let repo = state.reader.open(&dir)?;

    let mut records = Vec::new();
    for reference in repo.references()? {
        let Ok(reference) = reference else { continue };
        records.push(ReferenceRecord {
            hash: reference.hash.to_string(),
            name: reference.name,
        });
    }

    Ok(Json(Payload::with_data(records)?))
}
