mod config;
mod rewrite;
mod token;

pub(crate) use config::get_config;
pub(crate) use rewrite::rewrite_text;
pub(crate) use token::issue_speech_token;
