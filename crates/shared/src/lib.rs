//! Types shared by the luXew administration clients: domain records, the SOAP
//! wire vocabulary and the gateway error taxonomy.

pub mod domain;
pub mod error;
pub mod protocol;
