use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, TICK_INTERVAL_SECS},
    repository::Repository,
    services::runner::SessionRunner,
    store::KvStore,
};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub runner: SessionRunner,
    pub config: Config,
}

impl AppState {
    /// Wires the repository and the session runner over one store.
    pub fn new(store: Arc<dyn KvStore>, config: Config) -> Self {
        let repo = Repository::new(store);
        let runner = SessionRunner::new(
            Arc::new(repo.clone()),
            Duration::from_secs(TICK_INTERVAL_SECS),
        );
        Self {
            repo,
            runner,
            config,
        }
    }
}

impl FromRef<AppState> for Repository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}
