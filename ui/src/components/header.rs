use dioxus::prelude::*;

use starshop_common::accounts::Accounts;

use super::app::Route;
use super::storage::BrowserStore;
use super::user_state::use_user_state;

/// Site header: brand, nav links, and the session corner.
#[component]
pub fn PageHeader() -> Element {
    let mut user_state = use_user_state();
    let nav = use_navigator();

    let state = user_state.read();
    let session = state.session.clone();
    let company = state.settings.company_name.clone();
    let storage_error = state.storage_error.clone();
    drop(state);

    rsx! {
        header { class: "app-header",
            div { class: "header-top",
                h1 { "StarShop" }
                span { class: "company-name", "{company}" }
            }
            p { "Telegram stars for any account" }
            nav {
                button {
                    onclick: move |_| { nav.push(Route::Home {}); },
                    "Buy Stars"
                }
                button {
                    onclick: move |_| { nav.push(Route::Support {}); },
                    "Support"
                }
                div { class: "session-corner",
                    if let Some(session) = session {
                        span { class: "user-name", "{session.display_name}" }
                        span { class: "user-email", " ({session.email})" }
                        button {
                            onclick: move |_| {
                                Accounts::new(BrowserStore::new()).log_out();
                                user_state.write().refresh();
                                nav.push(Route::Home {});
                            },
                            "Log out"
                        }
                    } else {
                        button {
                            onclick: move |_| { nav.push(Route::Login {}); },
                            "Log in"
                        }
                    }
                }
            }
            if let Some(err) = storage_error {
                div { class: "alert alert-error",
                    "Stored data could not be read: {err}"
                }
            }
        }
    }
}
