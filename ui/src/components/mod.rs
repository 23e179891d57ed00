pub mod admin;
pub mod app;
pub mod header;
pub mod login;
pub mod storage;
pub mod storefront;
pub mod support;
pub mod user_chat;
pub mod user_state;
