pub mod clipboard;
pub mod environment;
pub mod key_events;
pub mod store;
pub mod window;
