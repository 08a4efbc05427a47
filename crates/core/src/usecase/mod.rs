pub mod copy_controller;
pub mod scratch_pad;
pub mod shortcut_matcher;
pub mod text_store;
