//! Defines the shared application view state.

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Gallery,
    Settings,
}

impl AppView {
    pub const ALL: [AppView; 2] = [AppView::Gallery, AppView::Settings];

    pub fn icon(self) -> &'static str {
        match self {
            AppView::Gallery => "compass",
            AppView::Settings => "settings",
        }
    }
}

pub fn view_label(view: &AppView) -> &'static str {
    match view {
        AppView::Gallery => "Destinations",
        AppView::Settings => "Settings",
    }
}
