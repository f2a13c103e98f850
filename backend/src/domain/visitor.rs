//! Visitor entry entity and its lifecycle state machine.
//!
//! An entry is created `Pending`, is approved or rejected exactly once, and
//! is closed by a single checkout. Deliveries additionally carry a
//! handed-off marker that can only be set while approved.
//!
//! ```text
//! Pending ──approve──▶ Approved ──checkout──▶ CheckedOut
//!    │                    │ ▲
//!    │                    └─┘ handoff (Delivery only, status unchanged)
//!    └───reject──▶ Rejected ──checkout──▶ CheckedOut
//! ```
//!
//! Checkout is also allowed straight from `Pending` to close out entries
//! that were never triaged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Classification of a check-in request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitorKind {
    /// A common visitor.
    #[default]
    Visitor,
    /// A courier dropping off packages.
    Delivery,
    /// A service provider.
    Service,
}

/// Lifecycle state of a visitor entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitorStatus {
    /// Awaiting approval or rejection.
    #[default]
    Pending,
    /// Cleared to enter.
    Approved,
    /// Denied entry; kept on record until checked out.
    Rejected,
    /// Closed; terminal.
    CheckedOut,
}

impl VisitorStatus {
    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut)
    }

    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::CheckedOut => "CHECKED_OUT",
        }
    }
}

impl VisitorKind {
    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visitor => "VISITOR",
            Self::Delivery => "DELIVERY",
            Self::Service => "SERVICE",
        }
    }
}

/// Error raised when parsing an unknown status/kind string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field}: {value}")]
pub struct VisitorEnumParseError {
    /// Which enum failed to parse.
    pub field: &'static str,
    /// The unrecognised input.
    pub value: String,
}

impl FromStr for VisitorStatus {
    type Err = VisitorEnumParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CHECKED_OUT" => Ok(Self::CheckedOut),
            other => Err(VisitorEnumParseError {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for VisitorKind {
    type Err = VisitorEnumParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "VISITOR" => Ok(Self::Visitor),
            "DELIVERY" => Ok(Self::Delivery),
            "SERVICE" => Ok(Self::Service),
            other => Err(VisitorEnumParseError {
                field: "kind",
                value: other.to_owned(),
            }),
        }
    }
}

/// Rejected lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The action is not valid from the entry's current status.
    #[error("cannot {action} a {from} entry")]
    InvalidTransition {
        /// Current status name.
        from: &'static str,
        /// Attempted action name.
        action: &'static str,
    },
    /// Checkout was already performed; the timestamp must not be rewritten.
    #[error("entry is already checked out")]
    AlreadyCheckedOut,
    /// Handoff applies to deliveries only.
    #[error("handoff applies only to delivery entries")]
    KindMismatch,
}

impl TransitionError {
    fn invalid(from: VisitorStatus, action: &'static str) -> Self {
        Self::InvalidTransition {
            from: from.as_str(),
            action,
        }
    }
}

/// A check-in record for a visitor, delivery, or service provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorEntry {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Destination unit, if any.
    pub unit_id: Option<Uuid>,
    /// Entry classification.
    pub kind: VisitorKind,
    /// Lifecycle status.
    pub status: VisitorStatus,
    /// Person name (required, trimmed).
    pub name: String,
    /// Identity document, if provided.
    pub document: Option<String>,
    /// Vehicle plate, if provided.
    pub plate: Option<String>,
    /// Contact phone, if provided.
    pub phone: Option<String>,
    /// Contact email, if provided.
    pub email: Option<String>,
    /// Free-form gate note.
    pub note: Option<String>,
    /// Carrier name; meaningful for deliveries only.
    pub carrier: Option<String>,
    /// Package count; meaningful for deliveries only.
    pub packages: Option<i32>,
    /// Whether a delivery has been handed to the resident.
    pub handed_off: bool,
    /// Actual arrival timestamp.
    pub check_in_at: DateTime<Utc>,
    /// Departure timestamp; set exactly once by checkout.
    pub check_out_at: Option<DateTime<Utc>>,
    /// Scheduled arrival, if announced in advance.
    pub expected_in_at: Option<DateTime<Utc>>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Subject id of the approver.
    pub approved_by: Option<String>,
    /// Free-text rejection reason.
    pub rejection_reason: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl VisitorEntry {
    /// Approve a pending entry.
    pub fn approve(
        &mut self,
        at: DateTime<Utc>,
        approved_by: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if self.status != VisitorStatus::Pending {
            return Err(TransitionError::invalid(self.status, "approve"));
        }
        self.status = VisitorStatus::Approved;
        self.approved_at = Some(at);
        self.approved_by = Some(approved_by.into());
        Ok(())
    }

    /// Reject a pending entry with an optional reason.
    pub fn reject(&mut self, reason: Option<String>) -> Result<(), TransitionError> {
        if self.status != VisitorStatus::Pending {
            return Err(TransitionError::invalid(self.status, "reject"));
        }
        self.status = VisitorStatus::Rejected;
        self.rejection_reason = reason.map(|r| r.trim().to_owned()).filter(|r| !r.is_empty());
        Ok(())
    }

    /// Close out the entry, stamping the departure time exactly once.
    pub fn checkout(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status.is_terminal() || self.check_out_at.is_some() {
            return Err(TransitionError::AlreadyCheckedOut);
        }
        self.status = VisitorStatus::CheckedOut;
        self.check_out_at = Some(at);
        Ok(())
    }

    /// Mark an approved delivery as handed to the resident.
    ///
    /// Leaves `status` untouched; the courier may still be on site.
    pub fn handoff(&mut self) -> Result<(), TransitionError> {
        if self.kind != VisitorKind::Delivery {
            return Err(TransitionError::KindMismatch);
        }
        if self.status != VisitorStatus::Approved {
            return Err(TransitionError::invalid(self.status, "hand off"));
        }
        self.handed_off = true;
        Ok(())
    }
}

/// Validation failures for visitor payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisitorValidationError {
    /// Name was empty after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// Package count was negative.
    #[error("package count must not be negative")]
    NegativePackages,
}

/// Validated creation payload for a check-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitorEntry {
    condo_id: Uuid,
    unit_id: Option<Uuid>,
    kind: VisitorKind,
    name: String,
    document: Option<String>,
    plate: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    note: Option<String>,
    carrier: Option<String>,
    packages: Option<i32>,
    check_in_at: Option<DateTime<Utc>>,
    expected_in_at: Option<DateTime<Utc>>,
}

/// Optional identification fields accepted at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorIdentification {
    /// Identity document.
    pub document: Option<String>,
    /// Vehicle plate.
    pub plate: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Free-form gate note.
    pub note: Option<String>,
}

impl NewVisitorEntry {
    /// Validate a check-in request.
    ///
    /// `kind` defaults to [`VisitorKind::Visitor`]. Delivery-specific fields
    /// are cleared unless `kind` is `Delivery`. A missing `check_in_at`
    /// means "use the server clock at persistence time".
    #[allow(clippy::too_many_arguments, reason = "mirrors the wire payload")]
    pub fn try_new(
        condo_id: Uuid,
        unit_id: Option<Uuid>,
        kind: Option<VisitorKind>,
        name: &str,
        identification: VisitorIdentification,
        carrier: Option<&str>,
        packages: Option<i32>,
        check_in_at: Option<DateTime<Utc>>,
        expected_in_at: Option<DateTime<Utc>>,
    ) -> Result<Self, VisitorValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(VisitorValidationError::EmptyName);
        }
        let kind = kind.unwrap_or_default();

        let (carrier, packages) = if kind == VisitorKind::Delivery {
            if packages.is_some_and(|p| p < 0) {
                return Err(VisitorValidationError::NegativePackages);
            }
            (normalize(carrier), packages)
        } else {
            (None, None)
        };

        Ok(Self {
            condo_id,
            unit_id,
            kind,
            name: trimmed.to_owned(),
            document: normalize(identification.document.as_deref()),
            plate: normalize(identification.plate.as_deref()),
            phone: normalize(identification.phone.as_deref()),
            email: normalize(identification.email.as_deref()),
            note: normalize(identification.note.as_deref()),
            carrier,
            packages,
            check_in_at,
            expected_in_at,
        })
    }

    /// Owning condominium id.
    pub fn condo_id(&self) -> Uuid {
        self.condo_id
    }

    /// Destination unit, if any.
    pub fn unit_id(&self) -> Option<Uuid> {
        self.unit_id
    }

    /// Materialize a full entry, filling defaults.
    ///
    /// `id` is assigned by the caller (repositories delegate to the store's
    /// default, in-memory fixtures generate one); `now` stamps both
    /// `created_at` and a missing `check_in_at`.
    pub fn into_entry(self, id: Uuid, now: DateTime<Utc>) -> VisitorEntry {
        VisitorEntry {
            id,
            condo_id: self.condo_id,
            unit_id: self.unit_id,
            kind: self.kind,
            status: VisitorStatus::Pending,
            name: self.name,
            document: self.document,
            plate: self.plate,
            phone: self.phone,
            email: self.email,
            note: self.note,
            carrier: self.carrier,
            packages: self.packages,
            handed_off: false,
            check_in_at: self.check_in_at.unwrap_or(now),
            check_out_at: None,
            expected_in_at: self.expected_in_at,
            approved_at: None,
            approved_by: None,
            rejection_reason: None,
            created_at: now,
        }
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validated partial update of identification and schedule fields.
///
/// Status never moves through a patch; the lifecycle actions are the only
/// way to transition an entry. `unit_id` is tri-state like the resident
/// patch: absent, unlink, or relink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorPatch {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement document, when present.
    pub document: Option<String>,
    /// Replacement plate, when present.
    pub plate: Option<String>,
    /// Replacement phone, when present.
    pub phone: Option<String>,
    /// Replacement email, when present.
    pub email: Option<String>,
    /// Replacement gate note, when present.
    pub note: Option<String>,
    /// Replacement carrier, when present (deliveries only).
    pub carrier: Option<String>,
    /// Replacement package count, when present (deliveries only).
    pub packages: Option<i32>,
    /// Unit-link change, when present.
    pub unit_id: Option<Option<Uuid>>,
    /// Replacement expected arrival, when present.
    pub expected_in_at: Option<DateTime<Utc>>,
}

impl VisitorPatch {
    /// Validate the fields present in a partial update.
    #[allow(clippy::too_many_arguments, reason = "mirrors the wire payload")]
    pub fn try_new(
        name: Option<&str>,
        identification: VisitorIdentification,
        carrier: Option<&str>,
        packages: Option<i32>,
        unit_id: Option<Option<Uuid>>,
        expected_in_at: Option<DateTime<Utc>>,
    ) -> Result<Self, VisitorValidationError> {
        let name = match name {
            Some(n) => {
                let trimmed = n.trim();
                if trimmed.is_empty() {
                    return Err(VisitorValidationError::EmptyName);
                }
                Some(trimmed.to_owned())
            }
            None => None,
        };
        if packages.is_some_and(|p| p < 0) {
            return Err(VisitorValidationError::NegativePackages);
        }
        Ok(Self {
            name,
            document: normalize(identification.document.as_deref()),
            plate: normalize(identification.plate.as_deref()),
            phone: normalize(identification.phone.as_deref()),
            email: normalize(identification.email.as_deref()),
            note: normalize(identification.note.as_deref()),
            carrier: normalize(carrier),
            packages,
            unit_id,
            expected_in_at,
        })
    }

    /// Apply the patch to an entry in place.
    ///
    /// Delivery-only fields are ignored for other kinds.
    pub fn apply(&self, entry: &mut VisitorEntry) {
        if let Some(name) = &self.name {
            entry.name.clone_from(name);
        }
        if let Some(document) = &self.document {
            entry.document = Some(document.clone());
        }
        if let Some(plate) = &self.plate {
            entry.plate = Some(plate.clone());
        }
        if let Some(phone) = &self.phone {
            entry.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            entry.email = Some(email.clone());
        }
        if let Some(note) = &self.note {
            entry.note = Some(note.clone());
        }
        if entry.kind == VisitorKind::Delivery {
            if let Some(carrier) = &self.carrier {
                entry.carrier = Some(carrier.clone());
            }
            if let Some(packages) = self.packages {
                entry.packages = Some(packages);
            }
        }
        if let Some(unit_id) = self.unit_id {
            entry.unit_id = unit_id;
        }
        if let Some(expected) = self.expected_in_at {
            entry.expected_in_at = Some(expected);
        }
    }
}
