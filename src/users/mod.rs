//! User accounts: listing, profiles and the staff permission flow.

pub mod model;
pub mod store;
pub mod views;

use std::sync::Arc;

use crate::module::Module;
use crate::router::Router;
use crate::templates::Templates;
use crate::urls;

pub use model::User;

/// Routes under `/users/`.
pub struct UsersModule {
    templates: Arc<Templates>,
}

impl UsersModule {
    pub fn new(templates: Arc<Templates>) -> Self {
        Self { templates }
    }
}

impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    fn routes(&self, router: &mut Router) {
        let t = Arc::clone(&self.templates);
        router.get(urls::USER_LIST, move |ctx| views::list(ctx, Arc::clone(&t)));

        router.get(urls::USER_REDIRECT, views::redirect);

        let t = Arc::clone(&self.templates);
        router.get(urls::USER_UPDATE, move |ctx| views::update(ctx, Arc::clone(&t)));
        let t = Arc::clone(&self.templates);
        router.post(urls::USER_UPDATE, move |ctx| views::update(ctx, Arc::clone(&t)));

        let t = Arc::clone(&self.templates);
        router.get(urls::USER_DETAIL, move |ctx| views::detail(ctx, Arc::clone(&t)));

        let t = Arc::clone(&self.templates);
        router.get(urls::STAFF_PERMISSION, move |ctx| {
            views::staff_permission(ctx, Arc::clone(&t))
        });
        let t = Arc::clone(&self.templates);
        router.post(urls::STAFF_PERMISSION, move |ctx| {
            views::staff_permission(ctx, Arc::clone(&t))
        });
    }
}
