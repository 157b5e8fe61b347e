use crate::cache_service::apply_settings as apply_cache_settings;
use crate::components::views::{GalleryView, SettingsView};
use crate::components::{view_label, AppView, Icon};
use crate::db::{initialize_database, load_settings, AppSettings};
use dioxus::prelude::*;
use tracing::warn;

#[component]
pub fn AppShell() -> Element {
    let mut app_settings = use_signal(AppSettings::default);
    let mut settings_loaded = use_signal(|| false);
    let current_view = use_signal(AppView::default);

    use_context_provider(|| app_settings);
    use_context_provider(|| current_view);

    // Initialize database and load saved settings on mount
    use_effect(move || {
        spawn(async move {
            if let Err(error) = initialize_database().await {
                warn!(%error, "settings storage unavailable, using defaults");
            } else {
                match load_settings().await {
                    Ok(settings) => {
                        apply_cache_settings(&settings);
                        app_settings.set(settings);
                    }
                    Err(error) => warn!(%error, "failed to load settings, using defaults"),
                }
            }
            settings_loaded.set(true);
        });
    });

    let view = current_view();

    rsx! {
        div { class: "app-container flex flex-col min-h-screen text-white",
            header { class: "mobile-safe-top border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
                div { class: "flex items-center justify-between px-4 py-3",
                    div { class: "flex flex-col",
                        span { class: "text-xs uppercase tracking-widest text-zinc-500",
                            "UTrippin"
                        }
                        span { class: "text-sm font-semibold text-white", "{view_label(&view)}" }
                    }
                    nav { class: "flex items-center gap-2",
                        for target in AppView::ALL {
                            button {
                                key: "{view_label(&target)}",
                                class: if target == view { "nav-tab nav-tab-active" } else { "nav-tab" },
                                aria_label: "{view_label(&target)}",
                                onclick: {
                                    let mut current_view = current_view.clone();
                                    move |_| current_view.set(target)
                                },
                                Icon {
                                    name: target.icon().to_string(),
                                    class: "w-5 h-5".to_string(),
                                }
                                span { class: "hidden sm:inline", "{view_label(&target)}" }
                            }
                        }
                    }
                }
            }

            main { class: "flex-1 overflow-y-auto main-scroll",
                div { class: "page-shell",
                    if !settings_loaded() {
                        div { class: "flex items-center justify-center py-20",
                            Icon {
                                name: "loader".to_string(),
                                class: "w-8 h-8 text-zinc-500".to_string(),
                            }
                        }
                    } else {
                        {
                            match view {
                                AppView::Gallery => rsx! { GalleryView {} },
                                AppView::Settings => rsx! { SettingsView {} },
                            }
                        }
                    }
                }
            }
        }
    }
}
