mod gallery;
mod settings;

pub use gallery::GalleryView;
pub use settings::SettingsView;
