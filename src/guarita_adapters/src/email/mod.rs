pub mod mock_email_dispatcher;
pub mod postmark_email_dispatcher;

pub use mock_email_dispatcher::MockEmailDispatcher;
pub use postmark_email_dispatcher::PostmarkEmailDispatcher;
