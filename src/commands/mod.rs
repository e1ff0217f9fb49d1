pub mod clean;
pub mod detect;
pub mod estimate;
