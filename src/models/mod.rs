pub mod action;
pub mod directory;
pub mod event;
pub mod role;
pub mod session;
pub mod state;
