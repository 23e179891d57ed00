use dioxus::prelude::*;

use starshop_common::chat::{ChannelKind, ChatLog, ChatMessage, Sender, POLL_INTERVAL_MS};

use super::app::Route;
use super::storage::BrowserStore;
use super::user_state::use_user_state;

/// User-side support chat. Messages go to the shop's support channel and
/// replies from the admin panel show up here.
#[component]
pub fn SupportView() -> Element {
    let user_state = use_user_state();
    let nav = use_navigator();

    let session = user_state.read().session.clone();
    match session {
        // Keyed by email so the chat remounts when the account changes
        Some(session) => {
            let email = session.email;
            rsx! {
                SupportChat { key: "{email}", email: email.clone() }
            }
        }
        None => rsx! {
            div { class: "support-view",
                div { class: "alert alert-warning",
                    "Log in to contact support."
                }
                button {
                    onclick: move |_| { nav.push(Route::Login {}); },
                    "Log in"
                }
            }
        },
    }
}

#[component]
fn SupportChat(email: String) -> Element {
    let mut messages = use_signal(Vec::<ChatMessage>::new);
    let mut draft = use_signal(String::new);

    // Initial load, marking the admin's replies as read.
    {
        let email = email.clone();
        use_effect(move || {
            let mut log = ChatLog::new(BrowserStore::new());
            if let Err(err) = log.mark_incoming_read(&email, ChannelKind::Support, Sender::Admin) {
                tracing::warn!("failed to mark support chat read: {err}");
            }
            match log.transcript(&email, ChannelKind::Support) {
                Ok(list) => messages.set(list),
                Err(err) => tracing::warn!("failed to load support chat: {err}"),
            }
        });
    }

    // Poll for admin replies while the page is open.
    {
        let email = email.clone();
        use_coroutine(move |_rx: UnboundedReceiver<()>| {
            let email = email.clone();
            async move {
                loop {
                    #[cfg(target_family = "wasm")]
                    gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MS).await;
                    #[cfg(not(target_family = "wasm"))]
                    break;

                    #[allow(unreachable_code)]
                    {
                        let mut log = ChatLog::new(BrowserStore::new());
                        if let Err(err) =
                            log.mark_incoming_read(&email, ChannelKind::Support, Sender::Admin)
                        {
                            tracing::warn!("failed to mark support chat read: {err}");
                        }
                        if let Ok(list) = log.transcript(&email, ChannelKind::Support) {
                            let changed = list != *messages.read();
                            if changed {
                                messages.set(list);
                            }
                        }
                    }
                }
            }
        });
    }

    let send = {
        let email = email.clone();
        move || {
            let body = draft.read().trim().to_string();
            if body.is_empty() {
                return;
            }
            let mut log = ChatLog::new(BrowserStore::new());
            match log.append(&email, ChannelKind::Support, Sender::User, None, &body) {
                Ok(_) => {
                    draft.set(String::new());
                    if let Ok(list) = log.transcript(&email, ChannelKind::Support) {
                        messages.set(list);
                    }
                }
                Err(err) => tracing::warn!("failed to send support message: {err}"),
            }
        }
    };

    rsx! {
        div { class: "support-view",
            h2 { "Support" }
            p { "Questions about an order? Write to us, we reply right here." }

            div { class: "chat-messages",
                if messages.read().is_empty() {
                    p { class: "chat-empty", "No messages yet. Say hello!" }
                }
                for msg in messages.read().iter() {
                    div {
                        key: "{msg.id}",
                        class: if msg.sender == Sender::User { "chat-bubble own" } else { "chat-bubble" },
                        if msg.sender == Sender::Admin {
                            span { class: "chat-sender",
                                {msg.sender_name.clone().unwrap_or_else(|| "Support".into())}
                            }
                        }
                        p { "{msg.body}" }
                        span { class: "chat-time", {msg.sent_at.format("%H:%M").to_string()} }
                    }
                }
            }

            div { class: "chat-input",
                input {
                    r#type: "text",
                    placeholder: "Type a message",
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                    onkeypress: {
                        let mut send = send.clone();
                        move |evt| {
                            if evt.key() == Key::Enter {
                                send();
                            }
                        }
                    },
                }
                button {
                    onclick: {
                        let mut send = send.clone();
                        move |_| send()
                    },
                    "Send"
                }
            }
        }
    }
}
