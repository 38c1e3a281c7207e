mod backend;
pub mod config;
mod container;
mod derived;
mod editor;
mod error;
mod pages;
mod patch;
pub mod sidebar;
pub mod storage;
mod store;
pub mod url;
mod validate;

pub use backend::{
    Backend, ConfigValidator, DeviceStorage, Location, PrerenderedPage, Prerenderer,
    ValidationError,
};
pub use config::{
    Config, ConfigPatch, Icon, Page, PagePatch, Theme, ThemePatch, regenerate_paths, slugify,
};
pub use container::{Listener, StateContainer};
pub use derived::{Dependency, DeriveFn, Memo};
pub use editor::{Editor, EditorBuilder};
pub use error::{Error, Result};
pub use pages::{MoveTarget, Pages, move_page};
pub use patch::{Partial, Patch, UpdateFn};
pub use sidebar::Sidebar;
pub use storage::{FileStorage, MemoryStorage};
pub use store::{StoreInit, StorePatch, StoreState, SubdomainStatus};
pub use url::MemoryLocation;
pub use validate::SchemaValidator;
