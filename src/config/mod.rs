pub mod load;
pub mod save;
pub mod types;

pub use load::load_settings;
pub use save::save_settings;
pub use types::{
    DEFAULT_ENGINE, DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_SETTINGS_FILE, ItemOrder, OutputConfig,
    SlideshowConfig, UserSettings,
};
