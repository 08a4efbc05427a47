pub mod copy;
pub mod error;
pub mod settings;
pub mod shortcut;
pub mod text;

mod serde_tests;
