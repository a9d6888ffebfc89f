/// Namesake GUI -- egui-based desktop frontend.
///
/// This crate contains all UI code. Grouping, merging and watching live in
/// `namesake-core`.
pub mod app;
pub mod panels;
pub mod state;
pub mod theme;
pub mod widgets;

pub use app::{NamesakeApp, NamesakeState};
