//! Axum route handlers. Each one validates the wire format, calls the
//! matching use case and maps its outcome onto a status code and JSON body.

pub mod login;
pub mod logout;
pub mod password_reset;
pub mod toggle_2fa;
pub mod verify_2fa;
pub mod verify_token;

pub use login::login;
pub use logout::logout;
pub use password_reset::{redeem_password_reset, request_password_reset, verify_reset_ticket};
pub use toggle_2fa::toggle_2fa;
pub use verify_2fa::verify_2fa;
pub use verify_token::verify_token;
