use dioxus::prelude::*;

use starshop_common::currency::{format_kopecks, parse_rubles};
use starshop_common::order::{Order, OrderBook, OrderStats, OrderStatus};
use starshop_common::settings::{AdminAccess, SettingsPatch, SettingsStore};

use super::app::Route;
use super::storage::BrowserStore;
use super::user_chat::UserChatPanel;
use super::user_state::use_user_state;

/// Shown for `/admin` and for `/admin/:key` with a wrong key.
#[component]
pub fn AdminLocked() -> Element {
    let nav = use_navigator();

    rsx! {
        div { class: "admin-locked",
            h2 { "Access denied" }
            p { "The admin panel is only reachable through its secret link." }
            button {
                onclick: move |_| { nav.push(Route::Home {}); },
                "Back to the storefront"
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum AdminTab {
    Orders,
    Settings,
    Payment,
    Chat,
}

impl AdminTab {
    const ALL: [AdminTab; 4] = [
        AdminTab::Orders,
        AdminTab::Settings,
        AdminTab::Payment,
        AdminTab::Chat,
    ];

    fn label(self) -> &'static str {
        match self {
            AdminTab::Orders => "Orders",
            AdminTab::Settings => "Settings",
            AdminTab::Payment => "Payment",
            AdminTab::Chat => "Chat",
        }
    }
}

/// The admin panel behind the secret key in the URL.
#[component]
pub fn AdminPanel(secret_key: String) -> Element {
    let mut tab = use_signal(|| AdminTab::Orders);

    let authorized = AdminAccess::new(BrowserStore::new()).is_authorized(&secret_key);
    if !authorized {
        tracing::warn!("admin access attempt with a wrong key");
        return rsx! { AdminLocked {} };
    }

    let active = *tab.read();

    rsx! {
        div { class: "admin-panel",
            header { class: "admin-header",
                h2 { "Admin Panel" }
            }
            nav { class: "admin-tabs",
                for t in AdminTab::ALL {
                    button {
                        class: if active == t { "tab active" } else { "tab" },
                        onclick: move |_| tab.set(t),
                        "{t.label()}"
                    }
                }
            }
            {match active {
                AdminTab::Orders => rsx! { OrdersTab {} },
                AdminTab::Settings => rsx! { SettingsTab {} },
                AdminTab::Payment => rsx! { PaymentTab {} },
                AdminTab::Chat => rsx! { UserChatPanel {} },
            }}
        }
    }
}

fn status_from_value(value: &str) -> Option<OrderStatus> {
    OrderStatus::ALL.into_iter().find(|s| s.label() == value)
}

#[component]
fn OrdersTab() -> Element {
    let mut orders = use_signal(Vec::<Order>::new);
    let mut stats = use_signal(OrderStats::default);
    let mut filter = use_signal(|| None::<OrderStatus>);

    let mut reload = move || {
        let book = OrderBook::new(BrowserStore::new());
        match book.list(*filter.read()) {
            Ok(list) => orders.set(list),
            Err(err) => tracing::warn!("failed to load orders: {err}"),
        }
        // Stats always cover the whole book, not the filtered view
        match book.stats() {
            Ok(s) => stats.set(s),
            Err(err) => tracing::warn!("failed to compute order stats: {err}"),
        }
    };

    use_effect(move || reload());

    let s = *stats.read();
    let revenue = format_kopecks(s.revenue_kopecks);

    rsx! {
        div { class: "orders-tab",
            div { class: "stats-cards",
                div { class: "stat-card",
                    span { class: "stat-value", "{s.total}" }
                    span { class: "stat-label", "Orders" }
                }
                div { class: "stat-card",
                    span { class: "stat-value", "{revenue}" }
                    span { class: "stat-label", "Revenue, RUB" }
                }
                div { class: "stat-card",
                    span { class: "stat-value", "{s.pending}" }
                    span { class: "stat-label", "In progress" }
                }
                div { class: "stat-card",
                    span { class: "stat-value", "{s.completed}" }
                    span { class: "stat-label", "Completed" }
                }
            }

            div { class: "orders-toolbar",
                select {
                    onchange: move |evt| {
                        filter.set(status_from_value(&evt.value()));
                        reload();
                    },
                    option { value: "all", "All statuses" }
                    for status in OrderStatus::ALL {
                        option { value: "{status.label()}", "{status.label()}" }
                    }
                }
                button {
                    class: "danger",
                    onclick: move |_| {
                        if confirm("Delete ALL orders? This cannot be undone.") {
                            let mut book = OrderBook::new(BrowserStore::new());
                            if let Err(err) = book.clear_all() {
                                tracing::warn!("failed to clear orders: {err}");
                            }
                            reload();
                        }
                    },
                    "Clear all orders"
                }
            }

            if orders.read().is_empty() {
                p { class: "orders-empty", "No orders yet." }
            } else {
                table { class: "orders-table",
                    thead {
                        tr {
                            th { "Order" }
                            th { "Account" }
                            th { "Stars" }
                            th { "Total, RUB" }
                            th { "Payment" }
                            th { "Customer" }
                            th { "Created" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        for order in orders.read().iter().cloned() {
                            {
                                let id = order.id;
                                rsx! {
                                    OrderRow {
                                        key: "{id}",
                                        order,
                                        on_change: move |_| reload(),
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn OrderRow(order: Order, on_change: EventHandler<()>) -> Element {
    let total = format_kopecks(order.total_kopecks);
    let created = order.created_at.format("%Y-%m-%d %H:%M").to_string();
    let id = order.id;

    rsx! {
        tr {
            td { class: "mono", "#{order.id}" }
            td { "@{order.username}" }
            td { "{order.star_count}" }
            td { "{total}" }
            td { "{order.payment_method.label()}" }
            td { "{order.customer_email}" }
            td { "{created}" }
            td {
                select {
                    onchange: move |evt| {
                        let Some(status) = status_from_value(&evt.value()) else {
                            return;
                        };
                        let mut book = OrderBook::new(BrowserStore::new());
                        match book.update_status(id, status) {
                            Ok(true) => on_change.call(()),
                            Ok(false) => tracing::warn!("order {id} disappeared mid-update"),
                            Err(err) => tracing::warn!("failed to update order {id}: {err}"),
                        }
                    },
                    for status in OrderStatus::ALL {
                        option {
                            value: "{status.label()}",
                            selected: order.status == status,
                            "{status.label()}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SettingsTab() -> Element {
    let mut user_state = use_user_state();
    let current = user_state.read().settings.clone();

    let mut price = use_signal(|| format_kopecks(current.star_price_kopecks));
    let mut min_stars = use_signal(|| current.min_stars.to_string());
    let mut max_stars = use_signal(|| current.max_stars.to_string());
    let mut company = use_signal(|| current.company_name.clone());
    let mut phone = use_signal(|| current.phone_number.clone());
    let mut notice = use_signal(|| None::<Result<(), String>>);

    let admin_link = {
        let key = AdminAccess::new(BrowserStore::new()).secret_key();
        format!("/admin/{key}")
    };

    let save = move |_| {
        let Some(star_price_kopecks) = parse_rubles(&price.read()) else {
            notice.set(Some(Err("Price must look like 1.72".into())));
            return;
        };
        let (Ok(min), Ok(max)) = (
            min_stars.read().trim().parse::<u32>(),
            max_stars.read().trim().parse::<u32>(),
        ) else {
            notice.set(Some(Err("Star limits must be whole numbers".into())));
            return;
        };
        if min == 0 || min > max {
            notice.set(Some(Err("Minimum must be positive and not above the maximum".into())));
            return;
        }

        let patch = SettingsPatch {
            star_price_kopecks: Some(star_price_kopecks),
            min_stars: Some(min),
            max_stars: Some(max),
            company_name: Some(company.read().trim().to_string()),
            phone_number: Some(phone.read().trim().to_string()),
        };
        match SettingsStore::new(BrowserStore::new()).update(patch) {
            Ok(_) => {
                user_state.write().refresh();
                notice.set(Some(Ok(())));
            }
            Err(err) => notice.set(Some(Err(err.to_string()))),
        }
    };

    rsx! {
        div { class: "settings-tab",
            div { class: "form-group",
                label { "Price per star, RUB:" }
                input {
                    r#type: "text",
                    value: "{price}",
                    oninput: move |evt| price.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Minimum stars per order:" }
                input {
                    r#type: "number",
                    min: "1",
                    value: "{min_stars}",
                    oninput: move |evt| min_stars.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Maximum stars per order:" }
                input {
                    r#type: "number",
                    min: "1",
                    value: "{max_stars}",
                    oninput: move |evt| max_stars.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Company name:" }
                input {
                    r#type: "text",
                    value: "{company}",
                    oninput: move |evt| company.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Payment phone number:" }
                input {
                    r#type: "text",
                    value: "{phone}",
                    oninput: move |evt| phone.set(evt.value()),
                }
            }

            {match notice.read().as_ref() {
                Some(Ok(())) => rsx! {
                    div { class: "alert alert-success", "Settings saved." }
                },
                Some(Err(err)) => rsx! {
                    div { class: "alert alert-error", "{err}" }
                },
                None => rsx! {},
            }}

            button { class: "primary", onclick: save, "Save settings" }

            div { class: "admin-link-box",
                p { "Keep this panel address private:" }
                p { class: "mono", "{admin_link}" }
            }
        }
    }
}

/// Read-only view of the details customers pay to.
#[component]
fn PaymentTab() -> Element {
    let user_state = use_user_state();
    let settings = user_state.read().settings.clone();
    let price = format_kopecks(settings.star_price_kopecks);

    rsx! {
        div { class: "payment-tab",
            h3 { "Payment details" }
            div { class: "payment-detail",
                span { class: "detail-label", "Recipient" }
                span { "{settings.company_name}" }
            }
            div { class: "payment-detail",
                span { class: "detail-label", "SBP phone" }
                span { "{settings.phone_number}" }
            }
            div { class: "payment-detail",
                span { class: "detail-label", "Price per star" }
                span { "{price} RUB" }
            }
            p { class: "field-hint",
                "These details are shown to customers who pick SBP. Edit them on the Settings tab."
            }
        }
    }
}

#[cfg(target_family = "wasm")]
fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(not(target_family = "wasm"))]
fn confirm(_message: &str) -> bool {
    true
}
