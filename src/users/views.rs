//! Request handlers for user pages.
//!
//! Every handler requires an authenticated actor. The actor row is reloaded
//! from the store on each request, so flags changed between a GET and the
//! following POST take effect immediately.

use std::sync::Arc;

use hyper::{Method, StatusCode};
use libsql::Connection;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::model::{MAX_NAME_LEN, User};
use super::store;
use crate::error::{Error, FieldErrors, Result};
use crate::permission::{self, Decision};
use crate::response::{self, HttpResponse};
use crate::router::Context;
use crate::templates::{self, Templates};
use crate::urls;

/// `users:list`
pub async fn list(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    let username = ctx.require_username()?;
    let conn = ctx.connection()?;
    let actor = store::require_actor(&conn, &username).await?;
    let users = store::list(&conn).await?;

    templates.page(
        StatusCode::OK,
        templates::USER_LIST,
        &json!({
            "actor": actor.username,
            "can_manage_staff": permission::may_manage_staff(&actor),
            "users": users,
        }),
    )
}

/// `users:detail`
pub async fn detail(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    let username = ctx.require_username()?;
    let conn = ctx.connection()?;
    let actor = store::require_actor(&conn, &username).await?;
    let user = store::require(&conn, ctx.require_param("username")?).await?;

    templates.page(
        StatusCode::OK,
        templates::USER_DETAIL,
        &json!({
            "actor": actor.username,
            "is_self": actor.username == user.username,
            "user": user,
        }),
    )
}

/// `users:redirect`: send the actor to their own detail page.
pub async fn redirect(ctx: Context) -> Result<HttpResponse> {
    let username = ctx.require_username()?;
    let conn = ctx.connection()?;
    let actor = store::require_actor(&conn, &username).await?;
    response::redirect(&get_success_url(&actor))
}

/// The object edited by `users:update`: always the authenticated actor,
/// whatever the path or body says.
pub async fn get_object(conn: &Connection, ctx: &Context) -> Result<User> {
    store::require_actor(conn, &ctx.require_username()?).await
}

/// Where `users:update` sends the actor after a successful save.
pub fn get_success_url(actor: &User) -> String {
    urls::user_detail(&actor.username)
}

#[derive(Debug, Default, Deserialize)]
struct UpdateForm {
    #[serde(default)]
    name: String,
}

impl UpdateForm {
    /// Surrounding whitespace is not part of the name.
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            errors.entry("name").or_default().push(format!(
                "Ensure this value has at most {MAX_NAME_LEN} characters (it has {len})."
            ));
        }
        errors
    }
}

/// `users:update`: GET shows the form, POST saves the actor's name.
pub async fn update(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    let conn = ctx.connection()?;
    let actor = get_object(&conn, &ctx).await?;

    if ctx.method != Method::POST {
        return templates.page(
            StatusCode::OK,
            templates::USER_FORM,
            &json!({ "user": &actor, "name": &actor.name, "errors": {} }),
        );
    }

    let form = ctx.form::<UpdateForm>()?.trimmed();
    let errors = form.validate();
    if !errors.is_empty() {
        if ctx.wants_json() {
            return Err(Error::Validation(errors));
        }
        return templates.page(
            StatusCode::BAD_REQUEST,
            templates::USER_FORM,
            &json!({ "user": &actor, "name": form.name, "errors": errors }),
        );
    }

    store::update_name(&conn, &actor.username, &form.name).await?;
    info!(username = %actor.username, "Updated profile");
    response::redirect(&get_success_url(&actor))
}

/// Body of the change-permission form.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionForm {
    #[serde(default)]
    staff_member: Option<String>,
}

impl PermissionForm {
    /// Checkbox semantics: absent, empty or `false` (any case) is unchecked;
    /// any other value, typically `on`, is checked.
    pub fn staff_member(&self) -> bool {
        match self.staff_member.as_deref() {
            None | Some("") => false,
            Some(v) => !v.eq_ignore_ascii_case("false"),
        }
    }
}

fn denied(actor: &User, target: &str) -> Result<HttpResponse> {
    warn!(actor = %actor.username, target_user = target, "Staff permission change denied");
    response::redirect(&urls::home())
}

/// `users:staff_permission`: view (GET) or change (POST) another user's
/// `staff_member` flag.
///
/// Actors without the flag are sent home before the target is looked up.
/// For staff actors an unknown target is a 404, and a superuser target is
/// sent home like any other denial.
pub async fn staff_permission(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    let username = ctx.require_username()?;
    let target_name = ctx.require_param("username")?;
    let conn = ctx.connection()?;
    let actor = store::require_actor(&conn, &username).await?;

    if !permission::may_manage_staff(&actor) {
        return denied(&actor, target_name);
    }
    let target = store::require(&conn, target_name).await?;
    let grant = match permission::evaluate(&actor, &target) {
        Decision::Authorized(grant) => grant,
        Decision::Denied => return denied(&actor, target_name),
    };

    if ctx.method == Method::POST {
        let staff_member = ctx.form::<PermissionForm>()?.staff_member();
        store::set_staff_member(&conn, grant, staff_member).await?;
        info!(
            actor = %actor.username,
            target_user = %target.username,
            staff_member,
            "Staff permission updated"
        );
        return response::redirect(&urls::user_list());
    }

    templates.page(
        StatusCode::OK,
        templates::USER_CHANGE_PERMISSION,
        &json!({
            "action": urls::staff_permission(&target.username),
            "target": target,
        }),
    )
}
