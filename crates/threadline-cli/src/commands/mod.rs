pub mod create_message;
pub mod history;
pub mod run;
pub mod seed;
pub mod summarize;
