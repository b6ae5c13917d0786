pub mod event;
pub mod friend;
pub mod notification;
pub mod relationship;
