use std::sync::Arc;

use crate::{db::DbPool, notifier::Notifier, services::mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub notifier: Notifier,
    pub mailer: Arc<dyn Mailer>,
}
