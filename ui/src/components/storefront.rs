use dioxus::prelude::*;

use starshop_common::currency::format_kopecks;
use starshop_common::order::{Order, OrderBook, PaymentMethod};

use super::app::Route;
use super::storage::BrowserStore;
use super::user_state::use_user_state;

/// The storefront: pick a star amount, a payment method, and order.
#[component]
pub fn StorefrontView() -> Element {
    let user_state = use_user_state();
    let nav = use_navigator();

    let state = user_state.read();
    let settings = state.settings.clone();
    let session = state.session.clone();
    drop(state);

    let min_stars = settings.min_stars;
    let max_stars = settings.max_stars;

    let mut username = use_signal(String::new);
    let mut star_count = use_signal(move || min_stars);
    let mut payment_method = use_signal(|| PaymentMethod::Sbp);
    let mut error_msg = use_signal(|| None::<String>);
    let mut submitted = use_signal(|| None::<Order>);

    if let Some(order) = submitted.read().clone() {
        let total = format_kopecks(order.total_kopecks);
        return rsx! {
            div { class: "order-confirmation",
                h3 { "Order Created" }
                p { "Order #{order.id}" }
                p { "Account: @{order.username}" }
                p { "Stars: {order.star_count}" }
                p { "Payment: {order.payment_method.label()}" }
                p { class: "order-total", "Total: {total} RUB" }
                p { "Please complete the payment. Our team will process the order shortly." }
                button {
                    onclick: move |_| {
                        submitted.set(None);
                        username.set(String::new());
                        star_count.set(min_stars);
                        payment_method.set(PaymentMethod::Sbp);
                    },
                    "Place Another Order"
                }
            }
        };
    }

    let is_logged_in = session.is_some();
    let price_each = format_kopecks(settings.star_price_kopecks);
    let total = format_kopecks(settings.total_kopecks(*star_count.read()));

    let submit = move |_| {
        let Some(ref session) = session else {
            nav.push(Route::Login {});
            return;
        };

        let mut book = OrderBook::new(BrowserStore::new());
        match book.submit(
            &username.read(),
            *star_count.read(),
            *payment_method.read(),
            &session.email,
            &settings,
        ) {
            Ok(order) => {
                tracing::info!("order {} created for @{}", order.id, order.username);
                error_msg.set(None);
                submitted.set(Some(order));
            }
            Err(err) => error_msg.set(Some(err.to_string())),
        }
    };

    rsx! {
        div { class: "storefront-view",
            h2 { "Buy Telegram Stars" }
            p { "Send stars to any Telegram account" }

            if !is_logged_in {
                div { class: "alert alert-warning",
                    "You need to log in before placing an order. "
                    Link { to: Route::Login {}, "Log in" }
                }
            }

            div { class: "form-group",
                label { "Your Telegram username:" }
                div { class: "username-input",
                    span { class: "at-sign", "@" }
                    input {
                        r#type: "text",
                        placeholder: "username",
                        value: "{username}",
                        oninput: move |evt| username.set(evt.value()),
                    }
                }
                p { class: "field-hint", "Stars are credited to this account" }
            }

            div { class: "form-group",
                label { "Star count ({min_stars}-{max_stars}):" }
                input {
                    r#type: "range",
                    min: "{min_stars}",
                    max: "{max_stars}",
                    step: "10",
                    value: "{star_count}",
                    oninput: move |evt| {
                        if let Ok(v) = evt.value().parse::<u32>() {
                            star_count.set(v);
                        }
                    },
                }
                input {
                    r#type: "number",
                    min: "{min_stars}",
                    max: "{max_stars}",
                    value: "{star_count}",
                    oninput: move |evt| {
                        if let Ok(v) = evt.value().parse::<u32>() {
                            star_count.set(v);
                        }
                    },
                }
            }

            div { class: "price-calculator",
                div { class: "price-row",
                    span { "Star count" }
                    span { "{star_count}" }
                }
                div { class: "price-row",
                    span { "Price per star" }
                    span { "{price_each} RUB" }
                }
                div { class: "price-row price-total",
                    span { "Total" }
                    span { "{total} RUB" }
                }
            }

            div { class: "form-group",
                label { "Payment method:" }
                div { class: "payment-methods",
                    for method in PaymentMethod::ALL {
                        label { class: "payment-option",
                            input {
                                r#type: "radio",
                                name: "payment-method",
                                checked: *payment_method.read() == method,
                                onchange: move |_| payment_method.set(method),
                            }
                            "{method.label()}"
                        }
                    }
                }
            }

            if let Some(err) = error_msg.read().as_ref() {
                div { class: "alert alert-error", "{err}" }
            }

            button {
                class: "submit-order",
                disabled: !is_logged_in,
                onclick: submit,
                "Pay"
            }
        }
    }
}
