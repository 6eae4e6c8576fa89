pub mod odap_client;

pub use odap_client::{OdapClient, ProblemQuery};
