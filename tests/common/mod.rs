#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use sitefold::{
    Backend, Config, Editor, MemoryLocation, MemoryStorage, Page, PrerenderedPage, Prerenderer,
    StoreInit, ValidationError,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub const SITE_ID: &str = "site-1";

#[derive(Default)]
pub struct FakeBackend {
    pub remote_config: RefCell<Option<Value>>,
    pub save_errors: RefCell<Vec<ValidationError>>,
    pub deploy_result: Cell<bool>,
    pub access_keys: RefCell<HashMap<String, String>>,
    pub saved: RefCell<Vec<Config>>,
    pub deployed: RefCell<Vec<(Config, Vec<PrerenderedPage>)>>,
    pub tokens_seen: RefCell<Vec<Option<String>>>,
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn load_config(&self, _site_id: &str, _token: &str) -> Option<Value> {
        tokio::task::yield_now().await;
        self.remote_config.borrow().clone()
    }

    async fn save_config(
        &self,
        _site_id: &str,
        config: &Config,
        token: Option<&str>,
    ) -> Vec<ValidationError> {
        tokio::task::yield_now().await;
        self.tokens_seen.borrow_mut().push(token.map(str::to_string));
        let errors = self.save_errors.borrow().clone();
        if errors.is_empty() {
            self.saved.borrow_mut().push(config.clone());
        }
        errors
    }

    async fn deploy(
        &self,
        _site_id: &str,
        config: &Config,
        pages: &[PrerenderedPage],
        _token: Option<&str>,
    ) -> bool {
        tokio::task::yield_now().await;
        self.deployed
            .borrow_mut()
            .push((config.clone(), pages.to_vec()));
        self.deploy_result.get()
    }

    async fn token_from_access_key(&self, _site_id: &str, access_key: &str) -> Option<String> {
        tokio::task::yield_now().await;
        self.access_keys.borrow().get(access_key).cloned()
    }
}

pub struct FakePrerenderer {
    pub output: RefCell<Option<Vec<PrerenderedPage>>>,
    pub calls: Cell<u32>,
}

impl Default for FakePrerenderer {
    fn default() -> Self {
        FakePrerenderer {
            output: RefCell::new(Some(vec![PrerenderedPage {
                path: "/".to_string(),
                html: "<h1>Home</h1>".to_string(),
            }])),
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl Prerenderer for FakePrerenderer {
    async fn prerender(&self, _site_id: &str, _config: &Config) -> Option<Vec<PrerenderedPage>> {
        tokio::task::yield_now().await;
        self.calls.set(self.calls.get() + 1);
        self.output.borrow().clone()
    }
}

pub struct Harness {
    pub editor: Editor,
    pub backend: Rc<FakeBackend>,
    pub prerenderer: Rc<FakePrerenderer>,
    pub storage: Rc<MemoryStorage>,
    pub location: Rc<MemoryLocation>,
}

pub fn page(uuid: &str, title: &str, on_nav: bool) -> Page {
    Page {
        uuid: uuid.to_string(),
        path: String::new(),
        title: title.to_string(),
        icon: String::new(),
        on_nav,
        elements: Vec::new(),
    }
}

/// Home, About, Contact with regenerated paths.
pub fn three_page_config() -> Config {
    Config {
        pages: Rc::new(sitefold::regenerate_paths(vec![
            page("a", "Home", true),
            page("b", "About", true),
            page("c", "Contact", false),
        ])),
        ..Config::default()
    }
}

pub fn init_with(config: Config) -> StoreInit {
    StoreInit {
        config: Some(config),
        site_id: Some(SITE_ID.to_string()),
        initial_path: "/".to_string(),
        editing: true,
    }
}

pub fn harness(init: StoreInit) -> Harness {
    harness_at(init, "/editor", false)
}

pub fn harness_at(init: StoreInit, url: &str, dev_mode: bool) -> Harness {
    let backend = Rc::new(FakeBackend::default());
    let prerenderer = Rc::new(FakePrerenderer::default());
    let storage = Rc::new(MemoryStorage::new());
    let location = Rc::new(MemoryLocation::new(url));
    harness_with_storage(init, backend, prerenderer, storage, location, dev_mode)
}

pub fn harness_with_storage(
    init: StoreInit,
    backend: Rc<FakeBackend>,
    prerenderer: Rc<FakePrerenderer>,
    storage: Rc<MemoryStorage>,
    location: Rc<MemoryLocation>,
    dev_mode: bool,
) -> Harness {
    let editor = Editor::builder(init)
        .backend(backend.clone())
        .prerenderer(prerenderer.clone())
        .storage(storage.clone())
        .location(location.clone())
        .dev_mode(dev_mode)
        .build()
        .unwrap();
    Harness {
        editor,
        backend,
        prerenderer,
        storage,
        location,
    }
}

pub fn paths(editor: &Editor) -> Vec<String> {
    editor
        .snapshot()
        .config
        .pages
        .iter()
        .map(|p| p.path.clone())
        .collect()
}

pub fn ids(editor: &Editor) -> Vec<String> {
    editor
        .snapshot()
        .config
        .pages
        .iter()
        .map(|p| p.uuid.clone())
        .collect()
}
