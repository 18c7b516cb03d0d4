
mod config;
mod preferences;
mod reader;
mod writer;
