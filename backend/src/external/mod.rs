//! External API integrations

pub mod energy;
pub mod mail;
pub mod weather;

pub use energy::EnergyClient;
pub use mail::{DeliveryReport, MailRelayClient, MailTransport, RecipientOutcome};
pub use weather::WeatherClient;
