pub mod progress_bar_builder;
pub mod resources;
