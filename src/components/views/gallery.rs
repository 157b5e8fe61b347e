use crate::api::ProviderKind;
use crate::components::{DestinationImage, Icon};
use crate::db::AppSettings;
use crate::query::ImageCategory;
use crate::utils::slugify;
use dioxus::prelude::*;

#[derive(Clone, PartialEq)]
struct FeaturedDestination {
    name: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    category: ImageCategory,
}

const FEATURED: &[FeaturedDestination] = &[
    FeaturedDestination {
        name: "Santorini, Greece",
        description: "Whitewashed villages above the caldera",
        tags: &["sunset", "island"],
        category: ImageCategory::Travel,
    },
    FeaturedDestination {
        name: "Tokyo, Japan",
        description: "Neon streets and quiet shrines",
        tags: &["city", "night"],
        category: ImageCategory::Places,
    },
    FeaturedDestination {
        name: "Swiss Alps",
        description: "Hiking between mountain huts",
        tags: &["mountains", "snow"],
        category: ImageCategory::Travel,
    },
    FeaturedDestination {
        name: "Bali, Indonesia",
        description: "Rice terraces and temple festivals",
        tags: &["beach", "temple"],
        category: ImageCategory::Event,
    },
    FeaturedDestination {
        name: "Paris, France",
        description: "Cafes along the boulevards",
        tags: &["landmark"],
        category: ImageCategory::Places,
    },
    FeaturedDestination {
        name: "Safari Kenya",
        description: "Sunrise game drives",
        tags: &["wildlife", "savanna"],
        category: ImageCategory::People,
    },
];

fn category_label(category: ImageCategory) -> &'static str {
    match category {
        ImageCategory::Places => "Places",
        ImageCategory::Travel => "Travel",
        ImageCategory::Event => "Events",
        ImageCategory::People => "People",
    }
}

#[component]
fn DestinationCard(
    name: String,
    #[props(default)] description: Option<String>,
    #[props(default)] tags: Vec<String>,
    #[props(default)] category: Option<ImageCategory>,
    provider: ProviderKind,
    onselect: EventHandler<String>,
) -> Element {
    let selected_name = name.clone();
    let anchor = slugify(&name);
    rsx! {
        article { id: "destination-{anchor}", class: "destination-card",
            DestinationImage {
                destination: name.clone(),
                description: description.clone(),
                tags: tags.clone(),
                category,
                provider,
                class: "aspect-[4/3] rounded-xl overflow-hidden".to_string(),
                show_attribution: true,
                onclick: move |_| onselect.call(selected_name.clone()),
            }
            div { class: "px-1 pt-3",
                h3 { class: "font-semibold text-white truncate", "{name}" }
                if let Some(description) = description {
                    p { class: "text-sm text-zinc-400 truncate", "{description}" }
                }
                if let Some(category) = category {
                    span { class: "text-xs text-zinc-500", "{category.emoji()} {category_label(category)}" }
                }
            }
        }
    }
}

#[component]
pub fn GalleryView() -> Element {
    let app_settings = use_context::<Signal<AppSettings>>();
    let mut provider_override = use_signal(|| None::<ProviderKind>);
    let mut custom_input = use_signal(String::new);
    let mut custom_destination = use_signal(String::new);
    let mut selected = use_signal(|| None::<String>);

    let provider = provider_override().unwrap_or_else(|| {
        ProviderKind::from_key(&app_settings().default_provider).unwrap_or_default()
    });
    let configured = !app_settings().functions_url.trim().is_empty();

    let on_search = move |_| {
        custom_destination.set(custom_input().trim().to_string());
    };

    let on_provider_change = move |e: Event<FormData>| {
        provider_override.set(ProviderKind::from_key(&e.value()));
    };

    let custom = custom_destination();

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Destinations" }
                p { class: "page-subtitle", "Imagery resolved per destination, cached for a day" }
            }

            if !configured && provider != ProviderKind::StaticMap {
                div { class: "notice",
                    Icon {
                        name: "settings".to_string(),
                        class: "w-4 h-4".to_string(),
                    }
                    span {
                        "Edge functions are not configured. Images use built-in fallbacks until a functions URL is set."
                    }
                }
            }

            section { class: "flex flex-col md:flex-row gap-3",
                div { class: "flex flex-1 gap-2",
                    input {
                        r#type: "text",
                        placeholder: "Any destination, e.g. Lisbon",
                        value: "{custom_input}",
                        class: "flex-1 px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white focus:outline-none focus:border-emerald-500/50",
                        oninput: move |e| custom_input.set(e.value()),
                        onkeydown: move |e: KeyboardEvent| {
                            if e.key() == Key::Enter {
                                custom_destination.set(custom_input().trim().to_string());
                            }
                        },
                    }
                    button {
                        class: "px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white flex items-center gap-2",
                        onclick: on_search,
                        Icon {
                            name: "search".to_string(),
                            class: "w-4 h-4".to_string(),
                        }
                        "Show"
                    }
                }
                select {
                    class: "px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white",
                    value: "{provider.key()}",
                    onchange: on_provider_change,
                    for kind in ProviderKind::ALL {
                        option {
                            key: "{kind.key()}",
                            value: "{kind.key()}",
                            selected: kind == provider,
                            "{kind.label()}"
                        }
                    }
                }
            }

            if !custom.is_empty() {
                section { class: "grid grid-cols-1 md:grid-cols-2 gap-6",
                    DestinationCard {
                        key: "{custom}-{provider.key()}",
                        name: custom.clone(),
                        provider,
                        onselect: move |name| selected.set(Some(name)),
                    }
                }
            }

            section { class: "grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6",
                for featured in FEATURED.iter() {
                    DestinationCard {
                        key: "{featured.name}-{provider.key()}",
                        name: featured.name.to_string(),
                        description: featured.description.to_string(),
                        tags: featured.tags.iter().map(|tag| tag.to_string()).collect::<Vec<_>>(),
                        category: featured.category,
                        provider,
                        onselect: move |name| selected.set(Some(name)),
                    }
                }
            }

            if let Some(name) = selected() {
                section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6 space-y-4",
                    div { class: "flex items-center justify-between",
                        h2 { class: "text-lg font-semibold text-white flex items-center gap-2",
                            Icon {
                                name: "map-pin".to_string(),
                                class: "w-5 h-5".to_string(),
                            }
                            "{name}"
                        }
                        button {
                            class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60",
                            aria_label: "Close",
                            onclick: move |_| selected.set(None),
                            Icon {
                                name: "x".to_string(),
                                class: "w-5 h-5".to_string(),
                            }
                        }
                    }
                    DestinationImage {
                        key: "{name}-map",
                        destination: name.clone(),
                        provider: ProviderKind::StaticMap,
                        class: "rounded-xl overflow-hidden".to_string(),
                        show_attribution: true,
                    }
                }
            }
        }
    }
}
