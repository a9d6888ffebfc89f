/// Panels composing the main window. Each returns the commands the user
/// issued; none of them touches the filesystem.
pub mod group_list;
pub mod members_panel;
pub mod merge_dialog;
