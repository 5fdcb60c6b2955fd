//! Model state registry
//!
//! States are global labels shared by every domain. A state exists once its
//! registry entry has been written. Reserved states are created lazily the
//! first time the catalog needs them, and creating one explicitly is
//! accepted but never lists it among the user states.

use model_catalog_core::{sorted_by_created, PathScheme, ReservedState, StateName, StateRecord};
use model_catalog_storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::objects::{list_json, probe, push_json};

/// Creates, checks and lists model states
#[derive(Clone)]
pub struct StateRegistry {
    store: Arc<dyn ObjectStore>,
    paths: PathScheme,
}

impl StateRegistry {
    pub fn new(store: Arc<dyn ObjectStore>, paths: PathScheme) -> Self {
        Self { store, paths }
    }

    /// Whether `name` may be used for a user-defined state
    pub fn is_valid_name(name: &str) -> bool {
        StateName::parse(name).is_ok() && !Self::is_reserved(name)
    }

    pub fn is_reserved(name: &str) -> bool {
        ReservedState::from_name(name).is_some()
    }

    /// Whether the state's registry entry exists
    #[instrument(skip(self), fields(state = %state))]
    pub async fn state_exists(&self, state: &StateName) -> ServiceResult<bool> {
        probe(self.store.as_ref(), &self.paths.state_key(state)).await
    }

    /// Create a state
    ///
    /// Creating a state that already exists succeeds without rewriting it.
    /// Reserved names are accepted and only make sure the registry entry is
    /// present.
    ///
    /// # Errors
    /// * `InvalidStateName` - If the name is malformed and not reserved
    pub async fn create_state(&self, name: &str) -> ServiceResult<StateName> {
        if !Self::is_reserved(name) && !Self::is_valid_name(name) {
            return Err(ServiceError::InvalidStateName(format!(
                "'{}' is not a valid state name",
                name
            )));
        }
        let state = StateName::parse(name)?;
        self.ensure_state(&state).await?;
        Ok(state)
    }

    /// Write the registry entry for `state` unless it is already present
    ///
    /// Unlike [`create_state`](Self::create_state) this accepts reserved
    /// names and is how the catalog brings them into existence.
    #[instrument(skip(self), fields(state = %state))]
    pub(crate) async fn ensure_state(&self, state: &StateName) -> ServiceResult<bool> {
        if self.state_exists(state).await? {
            debug!("State already exists");
            return Ok(false);
        }
        let record = StateRecord::new(state.clone());
        push_json(self.store.as_ref(), &self.paths.state_key(state), &record).await?;
        info!("Created model state: {}", state);
        Ok(true)
    }

    /// User-defined states, oldest first
    #[instrument(skip(self))]
    pub async fn list_user_states(&self) -> ServiceResult<Vec<StateName>> {
        let records: Vec<StateRecord> =
            list_json(self.store.as_ref(), &self.paths.states_prefix()).await?;
        Ok(sorted_by_created(records)
            .into_iter()
            .map(|record| record.state_name)
            .filter(|state| !state.is_reserved())
            .collect())
    }
}
