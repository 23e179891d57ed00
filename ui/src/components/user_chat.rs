use dioxus::prelude::*;

use starshop_common::chat::{
    first_unread, ActiveUser, ChannelKind, ChatLog, ChatMessage, Sender, POLL_INTERVAL_MS,
};

use super::storage::BrowserStore;

const ADMIN_NAME: &str = "Administrator";

/// Admin side of the chats: one user list per channel, a transcript for the
/// selected user, and a reply box. Re-reads storage on a timer.
#[component]
pub fn UserChatPanel() -> Element {
    let mut kind = use_signal(|| ChannelKind::Support);
    let mut selected = use_signal(|| None::<String>);
    let mut users = use_signal(Vec::<ActiveUser>::new);
    let mut messages = use_signal(Vec::<ChatMessage>::new);
    let mut support_unread = use_signal(|| 0usize);
    let mut direct_unread = use_signal(|| 0usize);
    let mut draft = use_signal(String::new);

    let mut reload = move || {
        let log = ChatLog::new(BrowserStore::new());
        for (channel, mut badge) in [
            (ChannelKind::Support, support_unread),
            (ChannelKind::Direct, direct_unread),
        ] {
            match log.active_users(channel) {
                Ok(list) => {
                    badge.set(list.iter().map(|u| u.unread_count).sum());
                    if channel == *kind.read() {
                        users.set(list);
                    }
                }
                Err(err) => tracing::warn!("failed to scan {} chats: {err}", channel.label()),
            }
        }
        if let Some(email) = selected.read().clone() {
            match log.transcript(&email, *kind.read()) {
                Ok(list) => messages.set(list),
                Err(err) => tracing::warn!("failed to load transcript for {email}: {err}"),
            }
        }
    };

    let mut select_user = move |email: String| {
        let mut log = ChatLog::new(BrowserStore::new());
        if let Err(err) = log.mark_incoming_read(&email, *kind.read(), Sender::User) {
            tracing::warn!("failed to mark chat read for {email}: {err}");
        }
        selected.set(Some(email));
        draft.set(String::new());
        reload();
    };

    use_effect(move || {
        reload();
        // Jump straight to whoever is waiting for a reply
        if selected.peek().is_none() {
            let waiting = first_unread(&users.peek()).map(|u| u.email.clone());
            if let Some(email) = waiting {
                select_user(email);
            }
        }
    });

    use_coroutine(move |_rx: UnboundedReceiver<()>| async move {
        loop {
            #[cfg(target_family = "wasm")]
            gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MS).await;
            #[cfg(not(target_family = "wasm"))]
            break;

            #[allow(unreachable_code)]
            reload();
        }
    });

    let send = move || {
        let Some(email) = selected.read().clone() else {
            return;
        };
        let body = draft.read().trim().to_string();
        if body.is_empty() {
            return;
        }
        let mut log = ChatLog::new(BrowserStore::new());
        match log.append(&email, *kind.read(), Sender::Admin, Some(ADMIN_NAME), &body) {
            Ok(_) => {
                draft.set(String::new());
                reload();
            }
            Err(err) => tracing::warn!("failed to send reply to {email}: {err}"),
        }
    };

    let active_kind = *kind.read();

    rsx! {
        div { class: "user-chat-panel",
            nav { class: "chat-channel-tabs",
                for channel in [ChannelKind::Support, ChannelKind::Direct] {
                    button {
                        class: if active_kind == channel { "tab active" } else { "tab" },
                        onclick: move |_| {
                            kind.set(channel);
                            selected.set(None);
                            messages.set(Vec::new());
                            reload();
                        },
                        "{channel.label()}"
                        {
                            let unread = if channel == ChannelKind::Support {
                                *support_unread.read()
                            } else {
                                *direct_unread.read()
                            };
                            rsx! {
                                if unread > 0 {
                                    span { class: "unread-badge", "{unread}" }
                                }
                            }
                        }
                    }
                }
            }

            div { class: "chat-columns",
                aside { class: "chat-user-list",
                    if users.read().is_empty() {
                        p { class: "chat-empty", "No conversations yet." }
                    }
                    for user in users.read().iter().cloned() {
                        {
                            let email = user.email.clone();
                            let is_selected = selected.read().as_deref() == Some(user.email.as_str());
                            let name = user.display_name.clone().unwrap_or_else(|| user.email.clone());
                            let when = user.last_activity.format("%Y-%m-%d %H:%M").to_string();
                            rsx! {
                                button {
                                    key: "{user.email}",
                                    class: if is_selected { "chat-user selected" } else { "chat-user" },
                                    onclick: move |_| select_user(email.clone()),
                                    span { class: "user-name", "{name}" }
                                    span { class: "user-email", "{user.email}" }
                                    span { class: "user-activity", "{when}" }
                                    if user.unread_count > 0 {
                                        span { class: "unread-badge", "{user.unread_count}" }
                                    }
                                }
                            }
                        }
                    }
                }

                section { class: "chat-transcript",
                    if selected.read().is_none() {
                        p { class: "chat-empty", "Pick a user to see the conversation." }
                    } else {
                        div { class: "chat-messages",
                            for msg in messages.read().iter() {
                                div {
                                    key: "{msg.id}",
                                    class: if msg.sender == Sender::Admin { "chat-bubble own" } else { "chat-bubble" },
                                    p { "{msg.body}" }
                                    span { class: "chat-time", {msg.sent_at.format("%H:%M").to_string()} }
                                }
                            }
                        }
                        div { class: "chat-input",
                            input {
                                r#type: "text",
                                placeholder: "Reply as {ADMIN_NAME}",
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
        }
    }
}
