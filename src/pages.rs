//! The landing page, target of the `home` redirect.

use std::sync::Arc;

use hyper::StatusCode;
use serde_json::json;

use crate::Result;
use crate::module::Module;
use crate::response::HttpResponse;
use crate::router::{Context, Router};
use crate::templates::{self, Templates};
use crate::urls;

/// `home`. Open to anonymous visitors; greets the actor when a token is sent.
pub async fn home(ctx: Context, templates: Arc<Templates>) -> Result<HttpResponse> {
    templates.page(
        StatusCode::OK,
        templates::HOME,
        &json!({ "actor": ctx.username() }),
    )
}

pub struct PagesModule {
    templates: Arc<Templates>,
}

impl PagesModule {
    pub fn new(templates: Arc<Templates>) -> Self {
        Self { templates }
    }
}

impl Module for PagesModule {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn routes(&self, router: &mut Router) {
        let t = Arc::clone(&self.templates);
        router.get(urls::HOME, move |ctx| home(ctx, Arc::clone(&t)));
    }
}
