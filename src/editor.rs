use crate::backend::{Backend, ConfigValidator, DeviceStorage, Location, Prerenderer};
use crate::config::{Config, ConfigPatch, Page, ThemePatch};
use crate::container::StateContainer;
use crate::derived::Memo;
use crate::error::{Error, Result};
use crate::patch::Patch;
use crate::storage::{self, MemoryStorage};
use crate::store::{StoreInit, StorePatch, StoreState};
use crate::url::{self, HashData, MemoryLocation};
use crate::validate::SchemaValidator;
use std::cell::RefCell;
use std::rc::Rc;

/// The editor's store: state container, derived values and actions.
///
/// Built with [`Editor::builder`]. All state changes go through
/// [`StateContainer::patch`]; actions read the current snapshot, call
/// collaborators, and issue patches. Asynchronous actions capture the
/// snapshot they were started with, and their final patches land in
/// completion order.
///
/// # Examples
///
/// ```no_run
/// # use sitefold::{Backend, Prerenderer, Editor, StoreInit};
/// # use std::rc::Rc;
/// # fn collaborators() -> (Rc<dyn Backend>, Rc<dyn Prerenderer>) { unimplemented!() }
/// # async fn run() -> sitefold::Result<()> {
/// let (backend, prerenderer) = collaborators();
/// let editor = Editor::builder(StoreInit::default())
///     .backend(backend)
///     .prerenderer(prerenderer)
///     .build()?;
///
/// editor.pages().add();
/// assert!(editor.config_changed());
/// editor.save_config().await;
/// # Ok(())
/// # }
/// ```
pub struct Editor {
    store: StateContainer<StoreState>,
    computed: RefCell<Computed>,
    backend: Rc<dyn Backend>,
    prerenderer: Rc<dyn Prerenderer>,
    validator: Rc<dyn ConfigValidator>,
    storage: Rc<dyn DeviceStorage>,
    location: Rc<dyn Location>,
    initial_path: String,
    dev_mode: bool,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("initial_path", &self.initial_path)
            .field("dev_mode", &self.dev_mode)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Editor`].
///
/// `backend` and `prerenderer` are required. The rest default to
/// [`SchemaValidator`], [`MemoryStorage`] and [`MemoryLocation`].
pub struct EditorBuilder {
    init: StoreInit,
    backend: Option<Rc<dyn Backend>>,
    prerenderer: Option<Rc<dyn Prerenderer>>,
    validator: Option<Rc<dyn ConfigValidator>>,
    storage: Option<Rc<dyn DeviceStorage>>,
    location: Option<Rc<dyn Location>>,
    dev_mode: bool,
}

impl EditorBuilder {
    /// Set the persistence and authentication backend.
    pub fn backend(mut self, backend: Rc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the pre-renderer used by deploys.
    pub fn prerenderer(mut self, prerenderer: Rc<dyn Prerenderer>) -> Self {
        self.prerenderer = Some(prerenderer);
        self
    }

    /// Set the validator for server-provided configurations.
    pub fn validator(mut self, validator: Rc<dyn ConfigValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Set the device storage holding tokens.
    pub fn storage(mut self, storage: Rc<dyn DeviceStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the user-visible location.
    pub fn location(mut self, location: Rc<dyn Location>) -> Self {
        self.location = Some(location);
        self
    }

    /// Always use editor addressing when navigating, even outside editing
    /// mode.
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Build the editor and its initial state.
    ///
    /// The access token is the stored member token, else the access-key
    /// token stored for the site. Unreadable storage is logged and treated
    /// as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCollaborator`] if no backend or no
    /// pre-renderer was set.
    pub fn build(self) -> Result<Editor> {
        let backend = self.backend.ok_or(Error::MissingCollaborator("backend"))?;
        let prerenderer = self
            .prerenderer
            .ok_or(Error::MissingCollaborator("prerenderer"))?;
        let validator = self
            .validator
            .unwrap_or_else(|| Rc::new(SchemaValidator::new()));
        let storage = self
            .storage
            .unwrap_or_else(|| Rc::new(MemoryStorage::new()));
        let location = self
            .location
            .unwrap_or_else(|| Rc::new(MemoryLocation::default()));

        let access_token = stored_token(&*storage, self.init.site_id.as_deref());
        let state = StoreState {
            access_token,
            ..StoreState::new(&self.init)
        };
        log::debug!(
            "editor initialized for site {:?} at '{}'",
            state.site_id,
            self.init.initial_path
        );

        let store = StateContainer::new(state);
        let applied_title = RefCell::new(None);
        sync_title(&*location, &store.snapshot(), &applied_title);
        let title_sink = Rc::clone(&location);
        store.subscribe(move |s| sync_title(&*title_sink, s, &applied_title));

        Ok(Editor {
            store,
            computed: RefCell::new(Computed::new()),
            backend,
            prerenderer,
            validator,
            storage,
            location,
            initial_path: self.init.initial_path,
            dev_mode: self.dev_mode,
        })
    }
}

fn stored_token(storage: &dyn DeviceStorage, site_id: Option<&str>) -> Option<String> {
    let member = storage::member_token(storage).unwrap_or_else(|e| {
        log::warn!("could not read member token: {e}");
        None
    });
    member.or_else(|| {
        storage::access_key_token(storage, site_id).unwrap_or_else(|e| {
            log::warn!("could not read access key token: {e}");
            None
        })
    })
}

/// Push the document title to `location` while not editing. Unchanged
/// titles are not pushed again.
fn sync_title(location: &dyn Location, state: &StoreState, applied: &RefCell<Option<String>>) {
    if state.editing {
        return;
    }
    let selected = state
        .selected_page_id
        .as_deref()
        .and_then(|id| state.config.page(id));
    let title = title_for(selected, &state.config.title);
    if applied.borrow().as_deref() == Some(title.as_str()) {
        return;
    }
    location.set_title(&title);
    *applied.borrow_mut() = Some(title);
}

fn title_for(page: Option<&Page>, site_title: &str) -> String {
    let rest = page.map_or("Page not found", |page| page.title.as_str());
    format!("{rest} ← {site_title}")
}

type ConfigPair = (Rc<Config>, Rc<Config>);

/// Memoized derived values, one cell each.
struct Computed {
    config_changed: Memo<ConfigPair, bool>,
    published_config_is_different: Memo<ConfigPair, bool>,
    nav_pages: Memo<Rc<Vec<Page>>, Rc<Vec<Page>>>,
    hidden_pages: Memo<Rc<Vec<Page>>, Rc<Vec<Page>>>,
    subdomain_changed: Memo<(String, String), bool>,
    selected_page: Memo<(Option<String>, Rc<Vec<Page>>), Option<Page>>,
    document_title: Memo<(Option<Page>, String), String>,
    show_pre_screen: Memo<bool, bool>,
    pathname: Memo<(Option<Page>, String), String>,
    editor_url: Memo<(Option<String>, String), String>,
    page_url: Memo<(Option<Page>, String, String), Option<String>>,
}

impl Computed {
    fn new() -> Self {
        Computed {
            config_changed: Memo::new("config_changed", configs_differ),
            published_config_is_different: Memo::new("published_config_is_different", configs_differ),
            nav_pages: Memo::new("nav_pages", |pages| filter_pages(pages, true)),
            hidden_pages: Memo::new("hidden_pages", |pages| filter_pages(pages, false)),
            subdomain_changed: Memo::new("subdomain_changed", |(current, saved)| current != saved),
            selected_page: Memo::new("selected_page", |(id, pages)| {
                let id = id.as_deref()?;
                pages.iter().find(|page| page.uuid == id).cloned()
            }),
            document_title: Memo::new("document_title", |(page, site_title)| {
                title_for(page.as_ref(), site_title)
            }),
            show_pre_screen: Memo::new("show_pre_screen", |needs_load| *needs_load),
            pathname: Memo::new("pathname", |(page, location_path)| {
                page.as_ref()
                    .map_or_else(|| location_path.clone(), |page| page.path.clone())
            }),
            editor_url: Memo::new("editor_url", |(site_id, pathname)| {
                url::editor_url(site_id.as_deref(), pathname)
            }),
            page_url: Memo::new("page_url", |(page, subdomain, domain)| {
                page.as_ref()
                    .map(|page| url::page_url(subdomain, domain, &page.path))
            }),
        }
    }

    fn memo_recomputations(&self, name: &str) -> Option<u64> {
        let count = match name {
            "config_changed" => self.config_changed.recomputations(),
            "published_config_is_different" => self.published_config_is_different.recomputations(),
            "nav_pages" => self.nav_pages.recomputations(),
            "hidden_pages" => self.hidden_pages.recomputations(),
            "subdomain_changed" => self.subdomain_changed.recomputations(),
            "selected_page" => self.selected_page.recomputations(),
            "document_title" => self.document_title.recomputations(),
            "show_pre_screen" => self.show_pre_screen.recomputations(),
            "pathname" => self.pathname.recomputations(),
            "editor_url" => self.editor_url.recomputations(),
            "page_url" => self.page_url.recomputations(),
            _ => return None,
        };
        Some(count)
    }
}

fn configs_differ((a, b): &ConfigPair) -> bool {
    !Rc::ptr_eq(a, b) && a != b
}

fn filter_pages(pages: &Rc<Vec<Page>>, on_nav: bool) -> Rc<Vec<Page>> {
    Rc::new(
        pages
            .iter()
            .filter(|page| page.on_nav == on_nav)
            .cloned()
            .collect(),
    )
}

fn partial(patch: StorePatch) -> Patch<StoreState, StorePatch> {
    Patch::partial(patch)
}

impl Editor {
    /// Start building an editor mounted with `init`.
    pub fn builder(init: StoreInit) -> EditorBuilder {
        EditorBuilder {
            init,
            backend: None,
            prerenderer: None,
            validator: None,
            storage: None,
            location: None,
            dev_mode: false,
        }
    }

    // -- state container --

    /// The current state snapshot.
    pub fn snapshot(&self) -> Rc<StoreState> {
        self.store.snapshot()
    }

    /// Number of patches applied so far.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Call `listener` with every new snapshot.
    pub fn subscribe(&self, listener: impl Fn(&Rc<StoreState>) + 'static) {
        self.store.subscribe(listener);
    }

    /// Apply a patch to the store.
    pub fn patch_store(&self, patch: Patch<StoreState, StorePatch>) -> Rc<StoreState> {
        self.store.patch(patch)
    }

    /// Apply a patch to the configuration being edited.
    ///
    /// The patch is resolved against the configuration current at the time
    /// it is applied.
    pub fn patch_config(&self, patch: Patch<Config, ConfigPatch>) -> Rc<StoreState> {
        self.store.patch(Patch::update(move |state: &StoreState| StorePatch {
            config: Some(Rc::new(patch.apply(&state.config))),
            ..Default::default()
        }))
    }

    /// Merge `theme` into the configuration's theme.
    pub fn set_theme(&self, theme: ThemePatch) -> Rc<StoreState> {
        self.patch_config(Patch::update(move |config: &Config| ConfigPatch {
            theme: Some(Patch::partial(theme).apply(&config.theme)),
            ..Default::default()
        }))
    }

    /// Device storage the editor was built with.
    pub fn storage(&self) -> &Rc<dyn DeviceStorage> {
        &self.storage
    }

    // -- derived values --

    /// The edited configuration differs from the last saved one.
    pub fn config_changed(&self) -> bool {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .config_changed
            .get((Rc::clone(&s.config), Rc::clone(&s.saved_config)))
    }

    /// The edited configuration differs from the last published one.
    pub fn published_config_is_different(&self) -> bool {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .published_config_is_different
            .get((Rc::clone(&s.config), Rc::clone(&s.published_config)))
    }

    /// Pages shown in the navigation, in order.
    pub fn nav_pages(&self) -> Rc<Vec<Page>> {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .nav_pages
            .get(Rc::clone(&s.config.pages))
    }

    /// Pages left out of the navigation, in order.
    pub fn hidden_pages(&self) -> Rc<Vec<Page>> {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .hidden_pages
            .get(Rc::clone(&s.config.pages))
    }

    /// The subdomain was edited since the last save.
    pub fn subdomain_changed(&self) -> bool {
        let s = self.snapshot();
        self.computed.borrow_mut().subdomain_changed.get((
            s.config.subdomain.clone(),
            s.saved_config.subdomain.clone(),
        ))
    }

    /// The page matching `selected_page_id`, if it still exists.
    pub fn selected_page(&self) -> Option<Page> {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .selected_page
            .get((s.selected_page_id.clone(), Rc::clone(&s.config.pages)))
    }

    /// Window title: `"<page title> ← <site title>"`.
    ///
    /// Also pushed to the [`Location`] after each patch made while not
    /// editing.
    pub fn document_title(&self) -> String {
        let page = self.selected_page();
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .document_title
            .get((page, s.config.title.clone()))
    }

    /// The configuration still has to come from the server.
    pub fn show_pre_screen(&self) -> bool {
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .show_pre_screen
            .get(s.config_needs_to_load_from_server)
    }

    /// Path of the selected page, else the location's current path.
    pub fn pathname(&self) -> String {
        let page = self.selected_page();
        let location_path = self.location.pathname();
        self.computed
            .borrow_mut()
            .pathname
            .get((page, location_path))
    }

    /// Editor URL for the current site and path.
    pub fn editor_url(&self) -> String {
        let pathname = self.pathname();
        let s = self.snapshot();
        self.computed
            .borrow_mut()
            .editor_url
            .get((s.site_id.clone(), pathname))
    }

    /// Public URL of the selected page on the saved site address.
    pub fn page_url(&self) -> Option<String> {
        let page = self.selected_page();
        let s = self.snapshot();
        self.computed.borrow_mut().page_url.get((
            page,
            s.saved_config.subdomain.clone(),
            s.saved_config.domain.clone(),
        ))
    }

    /// How many times the named derived value has been computed.
    ///
    /// `None` for an unknown name.
    pub fn recomputations(&self, name: &str) -> Option<u64> {
        self.computed.borrow().memo_recomputations(name)
    }

    // -- actions --

    /// Load the site configuration from the server.
    ///
    /// Only runs when a token and a site id are present and the store was
    /// created without a configuration. A configuration the validator
    /// accepts replaces the edited, saved and published configurations and
    /// selects the page at the initial path. A rejected one is kept in
    /// `invalid_config` and the store keeps its default configuration.
    ///
    /// Returns `true` if a configuration was loaded.
    pub async fn load_config(&self) -> bool {
        let state = self.snapshot();
        let (Some(token), Some(site_id)) = (state.access_token.clone(), state.site_id.clone())
        else {
            return false;
        };
        if !state.config_needs_to_load_from_server {
            return false;
        }

        let Some(raw) = self.backend.load_config(&site_id, &token).await else {
            log::warn!("could not fetch configuration of site {site_id}");
            return false;
        };

        let parsed = if self.validator.validate(&raw) {
            serde_json::from_value::<Config>(raw.clone()).ok()
        } else {
            None
        };

        match parsed {
            Some(config) => {
                let config = Rc::new(config);
                let selected = config
                    .page_by_path(&self.initial_path)
                    .map(|page| page.uuid.clone());
                self.store.patch(partial(StorePatch {
                    saved_config: Some(Rc::clone(&config)),
                    published_config: Some(Rc::clone(&config)),
                    config: Some(config),
                    config_needs_to_load_from_server: Some(false),
                    selected_page_id: Some(selected),
                    invalid_config: Some(None),
                    ..Default::default()
                }));
                log::info!("loaded configuration of site {site_id}");
                true
            }
            None => {
                log::error!("invalid configuration for site {site_id}: {raw}");
                self.store.patch(partial(StorePatch {
                    invalid_config: Some(Some(Rc::new(raw))),
                    ..Default::default()
                }));
                false
            }
        }
    }

    /// Send the edited configuration to the server.
    ///
    /// On acceptance the configuration that was sent becomes the saved
    /// configuration and earlier errors are cleared; on rejection the
    /// errors are stored and the saved configuration is left alone. The
    /// saving flag is cleared either way. No retries.
    ///
    /// Refuses to start (returns `false`) without a site id or while
    /// another save is in flight.
    pub async fn save_config(&self) -> bool {
        let state = self.snapshot();
        let Some(site_id) = state.site_id.clone() else {
            log::warn!("save requested for a site that does not exist yet");
            return false;
        };
        if state.config_is_saving {
            log::debug!("save of site {site_id} already in flight");
            return false;
        }

        self.store.patch(partial(StorePatch {
            config_is_saving: Some(true),
            ..Default::default()
        }));

        let config = Rc::clone(&state.config);
        let errors = self
            .backend
            .save_config(&site_id, &config, state.access_token.as_deref())
            .await;

        if errors.is_empty() {
            self.store.patch(partial(StorePatch {
                saved_config: Some(config),
                config_is_saving: Some(false),
                remote_set_config_errors: Some(Rc::new(Vec::new())),
                ..Default::default()
            }));
            log::info!("saved configuration of site {site_id}");
            true
        } else {
            log::warn!(
                "server rejected configuration of site {site_id} with {} error(s)",
                errors.len()
            );
            self.store.patch(partial(StorePatch {
                remote_set_config_errors: Some(Rc::new(errors)),
                config_is_saving: Some(false),
                ..Default::default()
            }));
            false
        }
    }

    /// Pre-render the edited configuration and publish it.
    ///
    /// Without a site id this is a no-op returning `false`. Otherwise the
    /// in-progress flag is raised, the pre-renderer runs, and its pages are
    /// published if it produced any. Whatever happened, the flag is cleared
    /// and the configuration the deploy started with becomes the published
    /// configuration, including when pre-rendering or publishing failed.
    ///
    /// Refuses to start (returns `false`) while another deploy is in flight.
    pub async fn deploy_site(&self) -> bool {
        let state = self.snapshot();
        let Some(site_id) = state.site_id.clone() else {
            return false;
        };
        if state.deploy_site_in_progress {
            log::debug!("deploy of site {site_id} already in flight");
            return false;
        }

        self.store.patch(partial(StorePatch {
            deploy_site_in_progress: Some(true),
            ..Default::default()
        }));

        let config = Rc::clone(&state.config);
        let result = match self.prerenderer.prerender(&site_id, &config).await {
            Some(pages) => {
                self.backend
                    .deploy(&site_id, &config, &pages, state.access_token.as_deref())
                    .await
            }
            None => {
                log::warn!("pre-rendering site {site_id} produced nothing, not deploying");
                false
            }
        };

        self.store.patch(partial(StorePatch {
            deploy_site_in_progress: Some(false),
            published_config: Some(config),
            ..Default::default()
        }));
        if result {
            log::info!("deployed site {site_id}");
        }
        result
    }

    /// Exchange an access key for a session token.
    ///
    /// On success the token becomes the store's access token and, if
    /// `remember` is set, is written to device storage. On failure only the
    /// loading flag is cleared.
    pub async fn attempt_access(&self, access_key: &str, remember: bool) -> bool {
        let state = self.snapshot();
        let Some(site_id) = state.site_id.clone() else {
            log::warn!("access attempted for a site that does not exist yet");
            return false;
        };

        self.store.patch(partial(StorePatch {
            attempt_access_loading: Some(true),
            ..Default::default()
        }));

        match self.backend.token_from_access_key(&site_id, access_key).await {
            Some(token) => {
                if remember {
                    if let Err(e) = storage::set_access_key_token(&*self.storage, &site_id, &token) {
                        log::warn!("could not store access key token of site {site_id}: {e}");
                    }
                }
                self.store.patch(partial(StorePatch {
                    access_token: Some(Some(token)),
                    attempt_access_loading: Some(false),
                    ..Default::default()
                }));
                true
            }
            None => {
                self.store.patch(partial(StorePatch {
                    attempt_access_loading: Some(false),
                    ..Default::default()
                }));
                false
            }
        }
    }

    /// Select the page at `path` and push its URL.
    ///
    /// In editing or dev mode the pushed URL keeps the current path and
    /// carries the page path in the fragment token, together with the site
    /// id read back from the current fragment. Otherwise the page path is
    /// pushed as-is. An unknown path clears the selection and pushes
    /// nothing.
    ///
    /// Returns whether a page matched.
    pub fn navigate_to(&self, path: &str) -> bool {
        let state = self.snapshot();
        let Some(page) = state.config.page_by_path(path) else {
            log::debug!("no page at '{path}', clearing selection");
            self.store.patch(partial(StorePatch {
                selected_page_id: Some(None),
                ..Default::default()
            }));
            return false;
        };

        self.store.patch(partial(StorePatch {
            selected_page_id: Some(Some(page.uuid.clone())),
            ..Default::default()
        }));

        if self.dev_mode || state.editing {
            let site_id = self
                .location
                .fragment()
                .and_then(|fragment| url::parse_hash(&fragment))
                .and_then(|data| data.site_id)
                .or_else(|| state.site_id.clone());
            let token = url::generate_hash(&HashData {
                site_id,
                path: path.to_string(),
            });
            self.location
                .push(&format!("{}#!{token}", self.location.pathname()));
        } else {
            self.location.push(path);
        }
        true
    }

    /// Switch editing mode on or off.
    pub fn toggle_editing(&self) {
        self.store.patch(Patch::update(|s: &StoreState| StorePatch {
            editing: Some(!s.editing),
            ..Default::default()
        }));
    }

    /// Switch the preview on or off.
    pub fn toggle_previewing(&self) {
        self.store.patch(Patch::update(|s: &StoreState| StorePatch {
            previewing: Some(!s.previewing),
            ..Default::default()
        }));
    }

    /// Open or close the settings menu.
    pub fn toggle_settings_menu(&self) {
        self.store.patch(Patch::update(|s: &StoreState| StorePatch {
            settings_menu_open: Some(!s.settings_menu_open),
            ..Default::default()
        }));
    }
}
