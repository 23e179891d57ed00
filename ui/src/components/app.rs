use dioxus::prelude::*;

use super::admin::{AdminLocked, AdminPanel};
use super::header::PageHeader;
use super::login::LoginView;
use super::storefront::StorefrontView;
use super::support::SupportView;
use super::user_state::UserState;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(PageLayout)]
    #[route("/")]
    Home {},
    #[route("/login")]
    Login {},
    #[route("/support")]
    Support {},
    #[end_layout]
    #[route("/admin")]
    AdminGate {},
    #[route("/admin/:secret_key")]
    Admin { secret_key: String },
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(UserState::load()));

    rsx! { Router::<Route> {} }
}

/// Shared header + content outlet for the customer-facing pages.
#[component]
fn PageLayout() -> Element {
    rsx! {
        div { class: "starshop-app",
            PageHeader {}
            main {
                Outlet::<Route> {}
            }
        }
    }
}

/// Route component: the storefront.
#[component]
fn Home() -> Element {
    rsx! { StorefrontView {} }
}

/// Route component: login and registration.
#[component]
fn Login() -> Element {
    rsx! { LoginView {} }
}

/// Route component: the user-side support chat.
#[component]
fn Support() -> Element {
    rsx! { SupportView {} }
}

/// Route component: `/admin` without a key shows the locked screen.
#[component]
fn AdminGate() -> Element {
    rsx! { AdminLocked {} }
}

/// Route component: `/admin/:secret_key` opens the panel when the key matches.
#[component]
fn Admin(secret_key: String) -> Element {
    rsx! { AdminPanel { secret_key } }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let nav = use_navigator();
    let path = segments.join("/");

    rsx! {
        div { class: "starshop-app",
            div { class: "not-found",
                h2 { "Page not found" }
                p { class: "mono", "/{path}" }
                button {
                    onclick: move |_| { nav.push(Route::Home {}); },
                    "Back to the storefront"
                }
            }
        }
    }
}
