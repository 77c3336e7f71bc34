//! The staff permission gate.
//!
//! Decides whether an actor may view or change another user's
//! `staff_member` flag. The decision is a pure function of the two user rows;
//! callers load both fresh for every request and pass them in.
//!
//! Changing the flag requires a [`StaffGrant`], which can only be obtained by
//! passing the gate (or explicitly, by operator tooling), so the store cannot
//! be asked to persist an ungated change.
//!
//! ```ignore
//! match permission::evaluate(&actor, &target) {
//!     Decision::Authorized(grant) => users::store::set_staff_member(&conn, grant, true).await?,
//!     Decision::Denied => return response::redirect(&urls::home()),
//! }
//! ```

use crate::users::model::User;

/// Whether `actor` may view or change `target`'s `staff_member` flag.
///
/// True exactly when the actor is a staff member and the target is not a
/// superuser. Superusers are out of reach for everyone, including other
/// superusers and the target itself.
pub fn can_act_on(actor: &User, target: &User) -> bool {
    actor.staff_member && !target.is_superuser
}

/// Whether `actor` may change permissions of anyone at all.
///
/// Checked before the target is looked up, so actors without the flag learn
/// nothing about which usernames exist.
pub fn may_manage_staff(actor: &User) -> bool {
    actor.staff_member
}

/// Proof that a change to one user's `staff_member` flag was authorized.
#[derive(Debug)]
pub struct StaffGrant {
    target: String,
}

impl StaffGrant {
    /// Username the grant applies to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Grant for operator tooling that runs outside any request, such as
    /// `fare set-staff`. Bypasses the gate entirely.
    pub fn administrative(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Outcome of evaluating the gate for one request.
#[derive(Debug)]
pub enum Decision {
    Authorized(StaffGrant),
    Denied,
}

impl Decision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Decision::Authorized(_))
    }
}

/// Evaluate the gate, producing a grant for `target` on success.
pub fn evaluate(actor: &User, target: &User) -> Decision {
    if can_act_on(actor, target) {
        Decision::Authorized(StaffGrant {
            target: target.username.clone(),
        })
    } else {
        Decision::Denied
    }
}
