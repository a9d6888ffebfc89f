/// UI widgets for Namesake.
pub mod status_bar;
pub mod toolbar;
