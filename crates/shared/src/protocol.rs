//! Wire vocabulary of the luXew SOAP service and the raw response tree.

use crate::{
    domain::{Acknowledgment, SessionToken, UserId},
    error::GatewayError,
};

/// Response field names. The backend speaks French; English aliases are
/// accepted so alternative deployments and fixtures decode the same way.
pub mod fields {
    pub const SUCCESS: &[&str] = &["succes", "success"];
    pub const TOKEN: &[&str] = &["jeton", "token"];
    pub const MESSAGE: &[&str] = &["message"];
    pub const NEW_ID: &[&str] = &["utilisateurId", "newId"];
    pub const USERS: &[&str] = &["utilisateurs", "users"];
    pub const ROLES: &[&str] = &["roles"];
    pub const ITEMS: &[&str] = &["item", "items"];
    pub const ID: &[&str] = &["id"];
    pub const PSEUDO: &[&str] = &["pseudo"];
    pub const EMAIL: &[&str] = &["email"];
}

/// Request parameter names.
pub mod params {
    pub const PSEUDO: &str = "pseudo";
    pub const PASSWORD: &str = "motDePasse";
    pub const TOKEN: &str = "jeton";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
    pub const USER_ID: &str = "utilisateurId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    Authenticate,
    ListRoles,
    ListUsers,
    AddUser,
    ModifyUser,
    DeleteUser,
}

impl Operation {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Authenticate => "authentifierUtilisateur",
            Self::ListRoles => "listerRoles",
            Self::ListUsers => "listerUtilisateurs",
            Self::AddUser => "ajouterUtilisateur",
            Self::ModifyUser => "modifierUtilisateur",
            Self::DeleteUser => "supprimerUtilisateur",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Connect => "connecting to the SOAP service",
            Self::Authenticate => "authenticating",
            Self::ListRoles => "listing roles",
            Self::ListUsers => "listing users",
            Self::AddUser => "adding the user",
            Self::ModifyUser => "modifying the user",
            Self::DeleteUser => "deleting the user",
        }
    }
}

/// Raw decoded body of a SOAP response, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapValue {
    Absent,
    Text(String),
    /// Child elements in document order. Repeated names are merged into a
    /// single `List` field by the decoder.
    Record(Vec<(String, SoapValue)>),
    List(Vec<SoapValue>),
}

impl SoapValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, SoapValue)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Looks up the first field matching any of `names`. Non-records have no fields.
    pub fn field_any(&self, names: &[&str]) -> Option<&SoapValue> {
        let Self::Record(entries) = self else {
            return None;
        };
        names.iter().find_map(|wanted| {
            entries
                .iter()
                .find(|(name, _)| name == wanted)
                .map(|(_, value)| value)
        })
    }

    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.is_empty(),
            Self::Record(entries) => entries.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_text()?.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        }
    }

    fn text_field(&self, names: &[&str]) -> Option<String> {
        self.field_any(names)
            .and_then(SoapValue::as_text)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug)]
pub enum AuthOutcome {
    Granted(SessionToken),
    Rejected(Option<String>),
}

/// Decodes an `authentifierUtilisateur` result.
pub fn decode_auth_response(value: &SoapValue) -> Result<AuthOutcome, GatewayError> {
    if !matches!(value, SoapValue::Record(_)) {
        return Err(GatewayError::ConnectionFailure(format!(
            "unexpected SOAP payload for {}: {value:?}",
            Operation::Authenticate.wire_name()
        )));
    }

    let success = value
        .field_any(fields::SUCCESS)
        .and_then(SoapValue::as_bool)
        .unwrap_or(false);
    if !success {
        return Ok(AuthOutcome::Rejected(value.text_field(fields::MESSAGE)));
    }

    match value.text_field(fields::TOKEN) {
        Some(token) if !token.trim().is_empty() => Ok(AuthOutcome::Granted(SessionToken::new(token))),
        _ => Err(GatewayError::ConnectionFailure(
            "authentication succeeded but the response carried no token".to_string(),
        )),
    }
}

/// Decodes an add/modify/delete result. Anything missing falls back to the
/// "not successful" defaults.
pub fn decode_acknowledgment(value: &SoapValue) -> Acknowledgment {
    Acknowledgment {
        success: value
            .field_any(fields::SUCCESS)
            .and_then(SoapValue::as_bool)
            .unwrap_or(false),
        message: value.text_field(fields::MESSAGE),
        new_id: value
            .text_field(fields::NEW_ID)
            .and_then(|raw| raw.parse::<UserId>().ok()),
    }
}
