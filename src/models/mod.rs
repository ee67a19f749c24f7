pub mod comment;
pub mod dismissal;
pub mod lead;
pub mod notification;
pub mod user;
