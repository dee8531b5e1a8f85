pub mod story_body;
pub mod story;
pub mod repository;
pub mod supabase;
pub mod memory_repository;
pub mod html;
pub mod story_html;
pub mod layout;
pub mod pages;
pub mod http_response_status_codes;
pub mod webutils;
pub mod static_files;
pub mod accesslog;
pub mod server;
pub mod config;
