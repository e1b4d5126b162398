pub mod avatar;
pub mod backend;
pub mod dialogs;
pub mod domain;
pub mod notify;
pub mod permissions;
pub mod repository;
pub mod roles;
pub mod sanitize;
pub mod storage;

#[cfg(test)]
pub mod testing;
