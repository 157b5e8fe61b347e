//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod destination_image;
mod icons;
mod views;

pub use app::*;
pub use app_view::*;
pub use destination_image::*;
pub use icons::*;
// Views are accessed via views::ViewName
