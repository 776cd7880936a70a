pub mod analyze;
pub mod check_key;
pub mod config;
pub mod edit_shot;
pub mod export;
pub mod guide;
pub mod import_script;
pub mod info;
pub mod new;
pub mod sketch;
pub mod sketch_all;
pub mod timeline;
