pub mod emoji_store;
pub mod settings_store;
