//! Delivery adapters relaying user queries into the pipeline

pub mod telegram;

pub use telegram::TelegramBot;
