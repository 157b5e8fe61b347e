use dioxus::prelude::*;

mod api;
mod cache;
mod cache_service;
mod components;
mod db;
mod diagnostics;
mod error;
mod fallback;
mod query;
mod resolver;
mod utils;

use components::AppShell;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        // Theme color for mobile browsers
        document::Meta { name: "theme-color", content: "#0f766e" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-title", content: "UTrippin" }
        document::Title { "UTrippin Imagery" }

        document::Stylesheet { href: APP_CSS }

        AppShell {}
    }
}
