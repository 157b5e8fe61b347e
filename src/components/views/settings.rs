use crate::api::{EdgeConfig, ProviderKind};
use crate::cache::keys;
use crate::cache_service::{
    apply_settings as apply_cache_settings, clear_all as clear_cache_storage,
    remove_by_prefix, stats as current_cache_stats,
};
use crate::components::Icon;
use crate::db::{save_settings, AppSettings};
use dioxus::prelude::*;
use tracing::warn;

fn persist(mut app_settings: Signal<AppSettings>, settings: AppSettings) {
    apply_cache_settings(&settings);
    let settings_clone = settings.clone();
    app_settings.set(settings);
    spawn(async move {
        if let Err(error) = save_settings(settings_clone).await {
            warn!(%error, "failed to save settings");
        }
    });
}

fn toggle_class(enabled: bool) -> &'static str {
    if enabled {
        "w-12 h-6 bg-emerald-500 rounded-full relative transition-colors"
    } else {
        "w-12 h-6 bg-zinc-700 rounded-full relative transition-colors"
    }
}

fn toggle_knob_class(enabled: bool) -> &'static str {
    if enabled {
        "w-5 h-5 bg-white rounded-full absolute top-0.5 right-0.5 transition-all"
    } else {
        "w-5 h-5 bg-zinc-400 rounded-full absolute top-0.5 left-0.5 transition-all"
    }
}

#[component]
pub fn SettingsView() -> Element {
    let app_settings = use_context::<Signal<AppSettings>>();
    let mut save_status = use_signal(|| None::<String>);
    let mut stats_epoch = use_signal(|| 0u32);

    let mut functions_url = use_signal(|| app_settings.peek().functions_url.clone());
    let mut anon_key = use_signal(|| app_settings.peek().functions_anon_key.clone());

    let on_save_connection = move |_| {
        let mut settings = app_settings();
        settings.functions_url = functions_url().trim().trim_end_matches('/').to_string();
        settings.functions_anon_key = anon_key().trim().to_string();
        persist(app_settings, settings);
        save_status.set(Some("Connection saved.".to_string()));
    };

    let on_provider_change = move |e: Event<FormData>| {
        if let Some(kind) = ProviderKind::from_key(&e.value()) {
            let mut settings = app_settings();
            settings.default_provider = kind.key().to_string();
            persist(app_settings, settings);
        }
    };

    let on_timeout_change = move |e: Event<FormData>| {
        if let Ok(secs) = e.value().parse::<u32>() {
            let mut settings = app_settings();
            settings.request_timeout_secs = if secs == 0 { 0 } else { secs.clamp(1, 30) };
            persist(app_settings, settings);
        }
    };

    let on_cache_enabled_toggle = move |_| {
        let mut settings = app_settings();
        settings.cache_enabled = !settings.cache_enabled;
        persist(app_settings, settings);
    };

    let on_cache_expiry_change = move |e: Event<FormData>| {
        if let Ok(expiry_hours) = e.value().parse::<u32>() {
            let mut settings = app_settings();
            settings.cache_expiry_hours = expiry_hours.clamp(1, 24 * 30);
            persist(app_settings, settings);
            stats_epoch += 1;
        }
    };

    let on_clear_cache = move |_| {
        let removed = clear_cache_storage();
        save_status.set(Some(format!("Cleared {removed} cached images.")));
        stats_epoch += 1;
    };

    let settings = app_settings();
    let _ = stats_epoch();
    let cache_stats = current_cache_stats();
    let cache_usage_label = format!(
        "Cached images: {} entries | {} expired",
        cache_stats.entry_count, cache_stats.expired_count
    );
    let connection = EdgeConfig::from_settings(&settings);
    let current_provider = ProviderKind::from_key(&settings.default_provider).unwrap_or_default();
    let prefix_list = keys::PREFIXES.join(", ");

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Settings" }
                p { class: "page-subtitle", "Image providers, request timeout and the local image cache" }
            }

            if let Some(status) = save_status() {
                div {
                    class: "fixed top-4 right-4 px-4 py-2 bg-emerald-500/20 border border-emerald-500/50 rounded-lg text-emerald-400 text-sm",
                    onclick: move |_| save_status.set(None),
                    "{status}"
                }
            }

            // Edge function connection
            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                h2 { class: "text-lg font-semibold text-white mb-3", "Edge Functions" }
                p { class: "text-sm text-zinc-400 mb-5",
                    if connection.is_configured() {
                        "Requests go to {connection.functions_url}."
                    } else {
                        "No functions URL set. Every destination shows its fallback imagery."
                    }
                }

                div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2",
                            "Functions URL"
                        }
                        input {
                            r#type: "url",
                            placeholder: "https://<project>.supabase.co/functions/v1",
                            value: "{functions_url}",
                            class: "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white focus:outline-none focus:border-emerald-500/50",
                            oninput: move |e| functions_url.set(e.value()),
                        }
                    }
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2",
                            "Anon key"
                        }
                        input {
                            r#type: "password",
                            value: "{anon_key}",
                            class: "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white focus:outline-none focus:border-emerald-500/50",
                            oninput: move |e| anon_key.set(e.value()),
                        }
                    }
                }
                div { class: "flex justify-end pt-4",
                    button {
                        class: "px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white text-sm",
                        onclick: on_save_connection,
                        "Save connection"
                    }
                }
            }

            // Provider settings
            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                h2 { class: "text-lg font-semibold text-white mb-3", "Image Provider" }
                div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2",
                            "Default provider"
                        }
                        select {
                            class: "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white",
                            value: "{current_provider.key()}",
                            onchange: on_provider_change,
                            for kind in ProviderKind::ALL {
                                option {
                                    key: "{kind.key()}",
                                    value: "{kind.key()}",
                                    selected: kind == current_provider,
                                    "{kind.label()}"
                                }
                            }
                        }
                    }
                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2",
                            "Request timeout (seconds, 0 = default)"
                        }
                        input {
                            r#type: "number",
                            min: "0",
                            max: "30",
                            value: settings.request_timeout_secs,
                            class: "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white focus:outline-none focus:border-emerald-500/50",
                            oninput: on_timeout_change,
                        }
                    }
                }
            }

            // Cache settings
            section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                h2 { class: "text-lg font-semibold text-white mb-3", "Image Cache" }
                p { class: "text-sm text-zinc-400 mb-5",
                    "Resolved image URLs are kept per destination and provider so repeat views skip the network."
                }

                div { class: "space-y-5",
                    div { class: "flex items-center justify-between",
                        div {
                            p { class: "font-medium text-white", "Enable cache" }
                            p { class: "text-sm text-zinc-400", "Reuse resolved URLs until they expire." }
                        }
                        button {
                            class: toggle_class(settings.cache_enabled),
                            onclick: on_cache_enabled_toggle,
                            div { class: toggle_knob_class(settings.cache_enabled) }
                        }
                    }

                    div {
                        label { class: "block text-sm font-medium text-zinc-400 mb-2",
                            "Cache expiry (hours)"
                        }
                        input {
                            r#type: "number",
                            min: "1",
                            max: "720",
                            value: settings.cache_expiry_hours,
                            class: "w-full max-w-xs px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white focus:outline-none focus:border-emerald-500/50",
                            oninput: on_cache_expiry_change,
                        }
                    }

                    div { class: "flex flex-wrap gap-2",
                        for kind in ProviderKind::ALL {
                            button {
                                key: "{kind.key()}",
                                class: "px-3 py-1 rounded-full border border-zinc-700 text-xs text-zinc-300 hover:border-rose-500/60",
                                title: "Forget cached {kind.label()} images",
                                onclick: move |_| {
                                    let removed = remove_by_prefix(kind.cache_prefix());
                                    save_status.set(Some(format!("Removed {removed} {} entries.", kind.label())));
                                    stats_epoch += 1;
                                },
                                "{kind.label()}"
                            }
                        }
                    }

                    div { class: "flex items-center justify-between gap-3 pt-1",
                        p { class: "text-xs text-zinc-500", "{cache_usage_label}" }
                        button {
                            class: "px-3 py-2 rounded-lg border border-zinc-700 text-zinc-300 hover:text-white hover:border-rose-500/60 transition-colors text-sm flex items-center gap-2",
                            title: "Removes every key under: {prefix_list}",
                            onclick: on_clear_cache,
                            Icon {
                                name: "trash".to_string(),
                                class: "w-4 h-4".to_string(),
                            }
                            "Clear cache"
                        }
                    }
                }
            }
        }
    }
}
