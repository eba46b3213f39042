pub mod logfile;
pub mod process;
pub mod prompt;
