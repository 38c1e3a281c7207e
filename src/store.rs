use crate::backend::ValidationError;
use crate::config::Config;
use crate::patch::{Partial, set};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Result of the last subdomain availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubdomainStatus {
    Unknown,
    #[default]
    Available,
    Taken,
}

/// What the editor is mounted with.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreInit {
    /// Configuration already in hand. `None` means it must be loaded from
    /// the server; the default site is shown until then.
    pub config: Option<Config>,
    /// Site being edited. `None` for a site that has not been created yet.
    pub site_id: Option<String>,
    /// Path the editor was opened at; selects the initial page.
    pub initial_path: String,
    pub editing: bool,
}

impl Default for StoreInit {
    fn default() -> Self {
        StoreInit {
            config: None,
            site_id: None,
            initial_path: "/".to_string(),
            editing: false,
        }
    }
}

/// The full editor state.
///
/// Held by a [`StateContainer`](crate::StateContainer) as immutable
/// snapshots. The three configurations are `Rc`s: a patch that does not
/// touch one of them shares it with the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub editing: bool,
    pub previewing: bool,
    pub settings_menu_open: bool,
    pub selected_page_id: Option<String>,
    pub site_id: Option<String>,
    pub attempt_access_loading: bool,
    pub access_token: Option<String>,
    pub site_needs_to_be_created: bool,

    pub deploy_site_in_progress: bool,

    /// The configuration being edited.
    pub config: Rc<Config>,
    /// Last configuration the server accepted.
    pub saved_config: Rc<Config>,
    /// Last configuration a deploy was attempted with.
    pub published_config: Rc<Config>,
    pub config_needs_to_load_from_server: bool,
    /// Raw server configuration that failed validation.
    pub invalid_config: Option<Rc<Value>>,
    pub remote_set_config_errors: Rc<Vec<ValidationError>>,
    pub config_is_saving: bool,

    pub subdomain_availability_status: SubdomainStatus,
}

impl StoreState {
    /// Build the initial state for `init`.
    ///
    /// Falls back to [`Config::default`] when no configuration is given.
    /// The access token is left empty; the editor fills it in from device
    /// storage.
    pub fn new(init: &StoreInit) -> Self {
        let config = Rc::new(init.config.clone().unwrap_or_default());
        let selected_page_id = config
            .page_by_path(&init.initial_path)
            .map(|page| page.uuid.clone());

        StoreState {
            editing: init.editing,
            previewing: false,
            settings_menu_open: false,
            selected_page_id,
            site_id: init.site_id.clone(),
            attempt_access_loading: false,
            access_token: None,
            site_needs_to_be_created: init.site_id.is_none(),
            deploy_site_in_progress: false,
            saved_config: Rc::clone(&config),
            published_config: Rc::clone(&config),
            config,
            config_needs_to_load_from_server: init.config.is_none(),
            invalid_config: None,
            remote_set_config_errors: Rc::new(Vec::new()),
            config_is_saving: false,
            subdomain_availability_status: SubdomainStatus::Available,
        }
    }
}

/// Shallow partial of [`StoreState`].
///
/// Fields that are themselves optional take `Some(None)` to clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorePatch {
    pub editing: Option<bool>,
    pub previewing: Option<bool>,
    pub settings_menu_open: Option<bool>,
    pub selected_page_id: Option<Option<String>>,
    pub site_id: Option<Option<String>>,
    pub attempt_access_loading: Option<bool>,
    pub access_token: Option<Option<String>>,
    pub site_needs_to_be_created: Option<bool>,
    pub deploy_site_in_progress: Option<bool>,
    pub config: Option<Rc<Config>>,
    pub saved_config: Option<Rc<Config>>,
    pub published_config: Option<Rc<Config>>,
    pub config_needs_to_load_from_server: Option<bool>,
    pub invalid_config: Option<Option<Rc<Value>>>,
    pub remote_set_config_errors: Option<Rc<Vec<ValidationError>>>,
    pub config_is_saving: Option<bool>,
    pub subdomain_availability_status: Option<SubdomainStatus>,
}

impl Partial<StoreState> for StorePatch {
    fn merge_into(self, target: &mut StoreState) {
        set(&mut target.editing, self.editing);
        set(&mut target.previewing, self.previewing);
        set(&mut target.settings_menu_open, self.settings_menu_open);
        set(&mut target.selected_page_id, self.selected_page_id);
        set(&mut target.site_id, self.site_id);
        set(&mut target.attempt_access_loading, self.attempt_access_loading);
        set(&mut target.access_token, self.access_token);
        set(&mut target.site_needs_to_be_created, self.site_needs_to_be_created);
        set(&mut target.deploy_site_in_progress, self.deploy_site_in_progress);
        set(&mut target.config, self.config);
        set(&mut target.saved_config, self.saved_config);
        set(&mut target.published_config, self.published_config);
        set(
            &mut target.config_needs_to_load_from_server,
            self.config_needs_to_load_from_server,
        );
        set(&mut target.invalid_config, self.invalid_config);
        set(&mut target.remote_set_config_errors, self.remote_set_config_errors);
        set(&mut target.config_is_saving, self.config_is_saving);
        set(
            &mut target.subdomain_availability_status,
            self.subdomain_availability_status,
        );
    }
}
