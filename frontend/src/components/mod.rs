pub mod answers_table;
pub mod chat;
pub mod composer;
pub mod handlers;
pub mod header;
pub mod results;
pub mod status_panel;
pub mod utils;
