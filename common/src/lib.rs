pub mod accounts;
pub mod chat;
pub mod currency;
pub mod order;
pub mod settings;
pub mod storage;
pub mod username;
