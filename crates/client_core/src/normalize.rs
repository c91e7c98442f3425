//! Turns the loosely-shaped collection responses of the backend into
//! uniform sequences.
//!
//! The service has been seen to answer a listing as a wrapper holding an
//! `item` array, a bare array, a single element, or nothing at all. All of
//! these normalize to a `Vec`; only a bare text where records were expected
//! is rejected.

use shared::{
    domain::{RoleName, UserId, UserRecord},
    error::GatewayError,
    protocol::{fields, SoapValue},
};

pub trait FromSoapValue: Sized {
    /// Whether a bare text response is a legitimate single element.
    const TEXT_ELEMENT: bool;

    fn from_soap(value: &SoapValue) -> Result<Self, GatewayError>;
}

impl FromSoapValue for RoleName {
    const TEXT_ELEMENT: bool = true;

    fn from_soap(value: &SoapValue) -> Result<Self, GatewayError> {
        match value {
            SoapValue::Text(name) => Ok(name.clone()),
            other => Err(unexpected_payload(&format!("role entry {other:?}"))),
        }
    }
}

impl FromSoapValue for UserRecord {
    const TEXT_ELEMENT: bool = false;

    fn from_soap(value: &SoapValue) -> Result<Self, GatewayError> {
        if !matches!(value, SoapValue::Record(_)) {
            return Err(unexpected_payload(&format!("user entry {value:?}")));
        }

        let id = value
            .field_any(fields::ID)
            .and_then(SoapValue::as_text)
            .and_then(|raw| raw.parse::<UserId>().ok())
            .ok_or_else(|| unexpected_payload("user entry without a numeric id"))?;
        let text = |names: &[&str]| {
            value
                .field_any(names)
                .and_then(SoapValue::as_text)
                .unwrap_or_default()
                .to_string()
        };
        let roles = match value.field_any(fields::ROLES) {
            Some(roles) => normalize::<RoleName>(roles, &[])?,
            None => Vec::new(),
        };

        Ok(UserRecord {
            id,
            pseudo: text(fields::PSEUDO),
            email: text(fields::EMAIL),
            roles,
        })
    }
}

/// The recognised layouts of a collection response, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape<'a> {
    /// `{ <wrapper>: ... }`
    Wrapped(&'a SoapValue),
    /// `{ item: ... }`
    Items(&'a SoapValue),
    List(&'a [SoapValue]),
    /// A bare text where records were expected.
    UnexpectedText(&'a str),
    /// Anything else is one element, or nothing when falsy.
    Single(&'a SoapValue),
}

pub fn shape_of<'a>(
    response: &'a SoapValue,
    wrapper: &[&str],
    text_is_element: bool,
) -> EnvelopeShape<'a> {
    if let Some(inner) = response.field_any(wrapper) {
        return EnvelopeShape::Wrapped(inner);
    }
    if let Some(items) = response.field_any(fields::ITEMS) {
        return EnvelopeShape::Items(items);
    }
    match response {
        SoapValue::List(items) => EnvelopeShape::List(items),
        SoapValue::Text(text) if !text_is_element && !text.is_empty() => {
            EnvelopeShape::UnexpectedText(text)
        }
        other => EnvelopeShape::Single(other),
    }
}

/// Extracts the elements of a collection response. `wrapper` names the
/// field the backend nests the collection under (`utilisateurs`, `roles`).
pub fn normalize<T: FromSoapValue>(
    response: &SoapValue,
    wrapper: &[&str],
) -> Result<Vec<T>, GatewayError> {
    let elements = match shape_of(response, wrapper, T::TEXT_ELEMENT) {
        EnvelopeShape::Wrapped(inner) => match inner.field_any(fields::ITEMS) {
            Some(items) => listify(items),
            None => listify(inner),
        },
        EnvelopeShape::Items(items) => listify(items),
        EnvelopeShape::List(items) => items.iter().collect(),
        EnvelopeShape::UnexpectedText(text) => {
            return Err(GatewayError::ConnectionFailure(format!(
                "unexpected SOAP payload: {text}"
            )))
        }
        EnvelopeShape::Single(value) => listify(value),
    };
    elements.into_iter().map(T::from_soap).collect()
}

fn listify(value: &SoapValue) -> Vec<&SoapValue> {
    match value {
        SoapValue::List(items) => items.iter().collect(),
        value if value.is_falsy() => Vec::new(),
        value => vec![value],
    }
}

fn unexpected_payload(detail: &str) -> GatewayError {
    GatewayError::ConnectionFailure(format!("unexpected SOAP payload: {detail}"))
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
