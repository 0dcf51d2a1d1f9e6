pub mod activity;
pub mod catalog;
pub mod error;
pub mod menu;
pub mod workspace;

// Re-export commonly used types for convenience.
pub use catalog::{
    Catalog, CatalogStore, Category, CategoryId, CategoryUpdate, NewScript, RegistrationStatus,
    Script, ScriptContext, ScriptId, ScriptSync, ScriptUpdate, StoreOptions,
};
pub use error::{EntityKind, MenuError, Result};
pub use menu::{ContextClass, MenuPathRegistry, MenuStore};
pub use workspace::{AppConfig, WorkspaceLayout};
