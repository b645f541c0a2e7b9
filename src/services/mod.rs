pub mod account_service;
pub mod mail_relay;
pub mod stats_service;

pub use account_service::{AccountError, AccountInput, AccountMode, AccountService, ImportSummary};
pub use mail_relay::{HttpMailRelay, MailError, MailTransport, PdfReport};
pub use stats_service::{ReportKind, StatsEntity, StatsQuery, StatsService};
