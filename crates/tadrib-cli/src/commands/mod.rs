pub mod chat;
pub mod clear;
pub mod evaluate;
pub mod export;
pub mod import;
pub mod init;
pub mod keys;
pub mod quiz;
pub mod seed;
pub mod show;
pub mod speak;
