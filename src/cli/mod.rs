mod commands;
mod handlers;

pub use commands::{BackgroundAction, BackgroundCommand, Cli, Commands};
pub use handlers::{
    handle_add, handle_background_color, handle_background_image, handle_background_show,
    handle_color, handle_delete, handle_edit, handle_get, handle_init, handle_list, handle_move,
    handle_status,
};
