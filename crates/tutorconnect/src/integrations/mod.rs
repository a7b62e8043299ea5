//! Stand-ins for external services: calendar export, the PayFast redirect, and the AI tutor.

pub mod ai;
pub mod calendar;
pub mod payfast;

pub use ai::{AiClient, ChatRole, ChatTurn};
pub use calendar::{google_calendar_link, sync_report, CalendarError, SyncReport};
pub use payfast::{build_redirect, PayFastRedirect, PayFastRequest};
