pub mod game_plugin;
pub mod ui_plugin;
