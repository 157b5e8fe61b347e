use crate::api::{provider_for, EdgeConfig, ProviderKind};
use crate::cache_service::SharedImageCache;
use crate::components::Icon;
use crate::db::AppSettings;
use crate::fallback::{ImagePhase, ImageState};
use crate::query::{ImageCategory, ImageQuery};
use crate::resolver::ImageResolver;
use dioxus::prelude::*;
use futures_util::future::AbortHandle;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

type PendingResolve = Rc<RefCell<Option<AbortHandle>>>;

fn abort_pending(pending: &PendingResolve) {
    if let Some(handle) = pending.borrow_mut().take() {
        handle.abort();
    }
}

/// Image for a travel destination.
///
/// Resolves through the cache and the selected provider, then walks the
/// fallback chain on load errors. Renders nothing for an empty destination.
#[component]
pub fn DestinationImage(
    destination: String,
    #[props(default)] description: Option<String>,
    #[props(default)] tags: Vec<String>,
    #[props(default)] category: Option<ImageCategory>,
    #[props(default)] provider: Option<ProviderKind>,
    #[props(default)] fallback_image: Option<String>,
    #[props(default = String::new())] class: String,
    #[props(default)] alt: Option<String>,
    #[props(default)] show_attribution: bool,
    #[props(default)] onclick: Option<EventHandler<MouseEvent>>,
) -> Element {
    let app_settings = use_context::<Signal<AppSettings>>();
    let mut state = use_signal(ImageState::idle);
    let pending: PendingResolve = use_hook(|| Rc::new(RefCell::new(None)));

    let mut query = ImageQuery::new(destination)
        .with_tags(tags)
        .with_category(category);
    if let Some(description) = description {
        query = query.with_description(description);
    }
    let kind = provider.unwrap_or_else(|| {
        ProviderKind::from_key(&app_settings.read().default_provider).unwrap_or_default()
    });

    {
        let pending = pending.clone();
        use_effect(use_reactive!(|query, kind, fallback_image| {
            abort_pending(&pending);

            if query.is_empty() {
                state.set(ImageState::idle());
                return;
            }

            let config = EdgeConfig::from_settings(&app_settings());
            let resolver = ImageResolver::new(provider_for(kind, config), Rc::new(SharedImageCache))
                .with_fallback_image(fallback_image.clone());

            state.set(ImageState::loading());
            let (task, handle) = resolver.start(query.clone());
            *pending.borrow_mut() = Some(handle);

            spawn(async move {
                match task.await {
                    Ok(Some(resolution)) => state.set(resolution.into_state()),
                    Ok(None) => state.set(ImageState::idle()),
                    Err(error) => debug!(%error, "destination image resolution dropped"),
                }
            });
        }));
    }

    {
        let pending = pending.clone();
        use_drop(move || abort_pending(&pending));
    }

    let current = state();
    let alt_text = alt.unwrap_or_else(|| query.alt_text());
    let title_text = query.title_text();

    match current.phase() {
        ImagePhase::Idle => rsx! {},
        ImagePhase::Loading => rsx! {
            div {
                class: "destination-image-loading {class}",
                aria_busy: "true",
                Icon {
                    name: "loader".to_string(),
                    class: "w-8 h-8 text-zinc-500".to_string(),
                }
            }
        },
        phase if kind == ProviderKind::StaticMap && phase != ImagePhase::Success => rsx! {
            div {
                class: "destination-image-map-missing {class}",
                title: "{title_text}",
                Icon {
                    name: "map-pin".to_string(),
                    class: "w-8 h-8 text-zinc-400".to_string(),
                }
                span { class: "text-xs text-zinc-400", "Map unavailable" }
            }
        },
        phase => {
            let src = current.src().unwrap_or_default().to_string();
            let attribution = (phase == ImagePhase::Success && show_attribution)
                .then(|| kind.attribution())
                .flatten();
            rsx! {
                figure { class: "destination-image {class}",
                    img {
                        src: "{src}",
                        alt: "{alt_text}",
                        title: "{title_text}",
                        class: "w-full h-full object-cover",
                        loading: "lazy",
                        onerror: move |_| {
                            if state.write().on_image_error() {
                                debug!(attempts = state.peek().attempts(), "advanced destination image fallback");
                            }
                        },
                        onclick: move |evt| {
                            if let Some(handler) = onclick.as_ref() {
                                handler.call(evt);
                            }
                        },
                    }
                    if let Some(attribution) = attribution {
                        figcaption { class: "destination-image-credit", "{attribution}" }
                    }
                }
            }
        }
    }
}
