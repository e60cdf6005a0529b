pub mod complete_two_factor;
pub mod login;
pub mod logout;
pub mod toggle_two_factor;
