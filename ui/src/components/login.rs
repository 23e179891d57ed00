use dioxus::prelude::*;

use starshop_common::accounts::{Accounts, AuthError, Session};

use super::app::Route;
use super::storage::BrowserStore;
use super::user_state::use_user_state;

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    LogIn,
    Register,
}

/// Login and registration, two tabs over the same card.
#[component]
pub fn LoginView() -> Element {
    let mut user_state = use_user_state();
    let nav = use_navigator();

    let mut tab = use_signal(|| Tab::LogIn);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut display_name = use_signal(String::new);
    let mut error_msg = use_signal(|| None::<String>);

    let mut finish = move |result: Result<Session, AuthError>| match result {
        Ok(_) => {
            user_state.write().refresh();
            nav.push(Route::Home {});
        }
        Err(err) => error_msg.set(Some(err.to_string())),
    };

    let log_in = move |_| {
        let result = Accounts::new(BrowserStore::new()).log_in(&email.read(), &password.read());
        finish(result);
    };

    let register = move |_| {
        if *password.read() != *confirm.read() {
            error_msg.set(Some("Passwords do not match".into()));
            return;
        }
        let result = Accounts::new(BrowserStore::new()).register(
            &display_name.read(),
            &email.read(),
            &password.read(),
        );
        finish(result);
    };

    let google = move |_| {
        let result = Accounts::new(BrowserStore::new()).log_in_google_stub();
        finish(result);
    };

    let active = *tab.read();

    rsx! {
        div { class: "login-view",
            div { class: "login-tabs",
                button {
                    class: if active == Tab::LogIn { "tab active" } else { "tab" },
                    onclick: move |_| {
                        tab.set(Tab::LogIn);
                        error_msg.set(None);
                    },
                    "Log In"
                }
                button {
                    class: if active == Tab::Register { "tab active" } else { "tab" },
                    onclick: move |_| {
                        tab.set(Tab::Register);
                        error_msg.set(None);
                    },
                    "Register"
                }
            }

            div { class: "login-card",
                if active == Tab::Register {
                    div { class: "form-group",
                        label { "Name:" }
                        input {
                            r#type: "text",
                            placeholder: "How should we address you?",
                            value: "{display_name}",
                            oninput: move |evt| display_name.set(evt.value()),
                        }
                    }
                }

                div { class: "form-group",
                    label { "Email:" }
                    input {
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }

                div { class: "form-group",
                    label { "Password:" }
                    input {
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                        onkeypress: move |evt| {
                            if evt.key() == Key::Enter && active == Tab::LogIn {
                                let result = Accounts::new(BrowserStore::new())
                                    .log_in(&email.read(), &password.read());
                                finish(result);
                            }
                        },
                    }
                }

                if active == Tab::Register {
                    div { class: "form-group",
                        label { "Confirm password:" }
                        input {
                            r#type: "password",
                            value: "{confirm}",
                            oninput: move |evt| confirm.set(evt.value()),
                        }
                    }
                }

                if let Some(err) = error_msg.read().as_ref() {
                    div { class: "alert alert-error", "{err}" }
                }

                if active == Tab::LogIn {
                    button { class: "primary", onclick: log_in, "Log In" }
                } else {
                    button { class: "primary", onclick: register, "Create Account" }
                }

                div { class: "login-divider", "or" }
                button { class: "google-login", onclick: google, "Continue with Google" }
            }
        }
    }
}
