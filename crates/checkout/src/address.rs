//! Delivery address resolution.
//!
//! A checkout session either reuses a saved address (already has an id) or
//! carries a draft entered during checkout. Drafts are only turned into
//! saved addresses once, at final submission, so back-and-forward wizard
//! navigation never creates duplicates.
//!
//! Geocoding is best-effort: a draft that cannot be geocoded is created
//! without coordinates rather than failing checkout.

use thiserror::Error;
use tracing::instrument;
use vendora_core::AddressId;

use crate::api::types::{GeocodeRequest, NewAddress};
use crate::api::{ApiError, CommerceClient};

/// Errors from resolving a delivery address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// Required draft fields are missing; no network call was made.
    #[error("address is incomplete: missing {0}")]
    Incomplete(String),

    /// The server rejected the address, message preserved verbatim.
    #[error("{0}")]
    CreationFailed(String),

    /// Transport-level failure talking to the API.
    #[error(transparent)]
    Api(ApiError),
}

/// A delivery address entered during checkout, not yet persisted.
#[derive(Debug, Clone, Default)]
pub struct DraftAddress {
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    /// When set, the saved-address list is refreshed after creation so the
    /// new address shows up in profile management immediately.
    pub save_for_later: bool,
}

impl DraftAddress {
    /// Validate the required fields (`line1`, `city`, `state`).
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Incomplete`] naming every missing field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let mut missing = Vec::new();
        if self.line1.trim().is_empty() {
            missing.push("address line 1");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.state.trim().is_empty() {
            missing.push("state");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError::Incomplete(missing.join(", ")))
        }
    }

    /// Free-text form for the geocoder.
    fn geocode_text(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref() {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.state);
        parts.push(&self.country);
        parts.join(", ")
    }
}

/// Either a saved address or a draft pending creation.
#[derive(Debug, Clone)]
pub enum AddressChoice {
    /// A saved address selected from the buyer's list.
    Selected(AddressId),
    /// An address entered ad hoc during checkout.
    Draft(DraftAddress),
}

impl AddressChoice {
    /// The saved-address id, if one is already selected.
    #[must_use]
    pub const fn selected_id(&self) -> Option<AddressId> {
        match self {
            Self::Selected(id) => Some(*id),
            Self::Draft(_) => None,
        }
    }
}

/// Resolve an address choice into a saved-address id.
///
/// A selected address returns immediately with no network call. A draft is
/// validated locally (fail fast), geocoded best-effort, and then created;
/// when `save_for_later` is set the saved list is refreshed afterwards.
///
/// # Errors
///
/// Returns [`AddressError::Incomplete`] before any network call if the
/// draft is missing required fields, [`AddressError::CreationFailed`] with
/// the server's message verbatim if creation is rejected, or
/// [`AddressError::Api`] on transport failure.
#[instrument(skip(client, choice))]
pub async fn resolve(
    client: &CommerceClient,
    choice: &AddressChoice,
) -> Result<AddressId, AddressError> {
    let draft = match choice {
        AddressChoice::Selected(id) => return Ok(*id),
        AddressChoice::Draft(draft) => draft,
    };

    draft.validate()?;

    // Best-effort geocoding; failure degrades to a coordinate-less address.
    let coordinates = match client
        .geocode(&GeocodeRequest {
            address: draft.geocode_text(),
        })
        .await
    {
        Ok(coordinates) => Some(coordinates),
        Err(e) => {
            tracing::warn!(error = %e, "geocoding failed, creating address without coordinates");
            None
        }
    };

    let created = client
        .create_address(&NewAddress {
            label: draft.label.clone(),
            line1: draft.line1.clone(),
            line2: draft.line2.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            country: draft.country.clone(),
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        })
        .await
        .map_err(|e| match e {
            ApiError::Remote { messages, .. } => AddressError::CreationFailed(messages.join("; ")),
            other => AddressError::Api(other),
        })?;

    if draft.save_for_later
        && let Err(e) = client.refresh_addresses().await
    {
        // The address exists; a stale saved list is not worth failing for.
        tracing::warn!(error = %e, "failed to refresh saved addresses after creation");
    }

    Ok(created.id)
}
