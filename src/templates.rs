//! HTML templates.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Handlebars escapes every `{{value}}`, so user-supplied names and titles
//! are safe to interpolate.

use std::fmt::Debug;

use handlebars::{Handlebars, handlebars_helper};
use hyper::StatusCode;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::response::{self, HttpResponse};

pub const HOME: &str = "pages/home";
pub const USER_LIST: &str = "users/user_list";
pub const USER_DETAIL: &str = "users/user_detail";
pub const USER_FORM: &str = "users/user_form";
pub const USER_CHANGE_PERMISSION: &str = "users/user_change_permission";
pub const FILES_UPLOAD: &str = "documents/filesupload";

const SOURCES: &[(&str, &str)] = &[
    (HOME, include_str!("../templates/pages/home.html")),
    (USER_LIST, include_str!("../templates/users/user_list.html")),
    (USER_DETAIL, include_str!("../templates/users/user_detail.html")),
    (USER_FORM, include_str!("../templates/users/user_form.html")),
    (
        USER_CHANGE_PERMISSION,
        include_str!("../templates/users/user_change_permission.html"),
    ),
    (FILES_UPLOAD, include_str!("../templates/documents/filesupload.html")),
];

// `{{urlencode username}}` for path segments in links.
handlebars_helper!(urlencode: |value: str| urlencoding::encode(value).into_owned());

/// Registry of every page template.
#[derive(Debug)]
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_helper("urlencode", Box::new(urlencode));
        registry
            .register_partial("layout", include_str!("../templates/layout.html"))
            .map_err(|e| Error::Internal(format!("Error registering layout: {e}")))?;
        for (name, source) in SOURCES {
            registry
                .register_template_string(name, source)
                .map_err(|e| Error::Internal(format!("Error registering template {name}: {e}")))?;
        }
        Ok(Self { registry })
    }

    /// Render a template to a string.
    pub fn render<S: Serialize + Debug>(&self, name: &str, data: &S) -> Result<String> {
        tracing::trace!(template = name, "Rendering");
        Ok(self.registry.render(name, data)?)
    }

    /// Render a template into an HTML response.
    ///
    /// The template name is echoed in an `X-Template` header, which lets
    /// clients and tests tell pages apart without parsing markup.
    pub fn page<S: Serialize + Debug>(
        &self,
        status: StatusCode,
        name: &str,
        data: &S,
    ) -> Result<HttpResponse> {
        let mut resp = response::html(status, self.render(name, data)?);
        if let Ok(value) = name.parse() {
            resp.headers_mut().insert("X-Template", value);
        }
        Ok(resp)
    }
}
