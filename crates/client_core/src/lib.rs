//! Client side of the luXew account administration service.
//!
//! [`SoapGateway`] is the only component that talks to the backend. It owns
//! the transport binding and the session token, funnels every failure
//! through [`shared::error::classify`] and hands back normalized records.

use anyhow::Result;
use shared::{
    domain::{Acknowledgment, NewUser, RoleName, SessionToken, UserId, UserRecord, UserUpdate},
    error::{classify, GatewayError},
    protocol::{
        decode_acknowledgment, decode_auth_response, fields, params, AuthOutcome, Operation,
        SoapValue,
    },
};
use tracing::{debug, info};
use url::Url;

pub mod config;
pub mod failure;
pub mod normalize;
pub mod soap;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use failure::{
    acknowledgment_notice, handle_failure, AppShell, HandledAs, Notice, NoticeLevel, Screen,
};
pub use transport::{HttpSoapConnector, SoapBinding, SoapConnector};

use normalize::normalize;

pub struct SoapGateway<C: SoapConnector = HttpSoapConnector> {
    connector: C,
    endpoint: Url,
    binding: Option<C::Binding>,
    session: Option<SessionToken>,
}

impl SoapGateway<HttpSoapConnector> {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let endpoint = settings.endpoint()?;
        Ok(Self::new(endpoint, HttpSoapConnector::new(settings)?))
    }
}

impl<C: SoapConnector> SoapGateway<C> {
    pub fn new(endpoint: Url, connector: C) -> Self {
        Self {
            connector,
            endpoint,
            binding: None,
            session: None,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    /// Probes the endpoint and binds to it. A held binding is reused.
    pub fn connect(&mut self) -> Result<(), GatewayError> {
        if self.binding.is_some() {
            return Ok(());
        }

        let reachable = self.connector.probe(&self.endpoint).map_err(|err| {
            GatewayError::ConnectionFailure(format!("connection error: {err:#}"))
        })?;
        if !reachable {
            return Err(GatewayError::ConnectionFailure(format!(
                "the SOAP service is not reachable at {}",
                self.endpoint
            )));
        }

        let binding = self.connector.bind(&self.endpoint).map_err(|err| {
            GatewayError::ConnectionFailure(format!(
                "error while {}: {err:#}",
                Operation::Connect.describe()
            ))
        })?;
        info!(endpoint = %self.endpoint, "soap: connected");
        self.binding = Some(binding);
        Ok(())
    }

    pub fn authenticate(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, GatewayError> {
        let response = self.invoke(
            Operation::Authenticate,
            vec![
                (params::PSEUDO, username.to_string()),
                (params::PASSWORD, password.to_string()),
            ],
        )?;

        let outcome = decode_auth_response(&response)
            .map_err(|err| self.classified(Operation::Authenticate, err))?;
        match outcome {
            AuthOutcome::Granted(token) => {
                info!(username, "soap: authenticated");
                self.session = Some(token.clone());
                Ok(token)
            }
            AuthOutcome::Rejected(message) => Err(GatewayError::AuthenticationFailure(
                message.unwrap_or_else(|| "authentication rejected".to_string()),
            )),
        }
    }

    pub fn list_roles(&mut self, token: Option<&str>) -> Result<Vec<RoleName>, GatewayError> {
        let token = self.require_token(token)?;
        let response = self.invoke(Operation::ListRoles, vec![(params::TOKEN, token)])?;
        normalize::<RoleName>(&response, fields::ROLES)
            .map_err(|err| self.classified(Operation::ListRoles, err))
    }

    pub fn list_users(&mut self, token: Option<&str>) -> Result<Vec<UserRecord>, GatewayError> {
        let token = self.require_token(token)?;
        let response = self.invoke(Operation::ListUsers, vec![(params::TOKEN, token)])?;
        normalize::<UserRecord>(&response, fields::USERS)
            .map_err(|err| self.classified(Operation::ListUsers, err))
    }

    pub fn add_user(
        &mut self,
        token: Option<&str>,
        user: &NewUser,
    ) -> Result<Acknowledgment, GatewayError> {
        let token = self.require_token(token)?;
        let response = self.invoke(
            Operation::AddUser,
            vec![
                (params::TOKEN, token),
                (params::PSEUDO, user.username.clone()),
                (params::EMAIL, user.email.clone()),
                (params::PASSWORD, user.password.clone()),
                (params::ROLE, user.role.clone()),
            ],
        )?;
        Ok(decode_acknowledgment(&response))
    }

    pub fn modify_user(
        &mut self,
        token: Option<&str>,
        update: &UserUpdate,
    ) -> Result<Acknowledgment, GatewayError> {
        let token = self.require_token(token)?;
        let response = self.invoke(
            Operation::ModifyUser,
            vec![
                (params::TOKEN, token),
                (params::USER_ID, update.id.to_string()),
                (params::PSEUDO, update.username.clone()),
                (params::EMAIL, update.email.clone()),
                (params::ROLE, update.role.clone().unwrap_or_default()),
            ],
        )?;
        Ok(decode_acknowledgment(&response))
    }

    pub fn delete_user(
        &mut self,
        token: Option<&str>,
        id: UserId,
    ) -> Result<Acknowledgment, GatewayError> {
        let token = self.require_token(token)?;
        let response = self.invoke(
            Operation::DeleteUser,
            vec![(params::TOKEN, token), (params::USER_ID, id.to_string())],
        )?;
        Ok(decode_acknowledgment(&response))
    }

    /// Forgets the session and the binding; the next call reconnects.
    pub fn disconnect(&mut self) {
        if self.session.is_some() || self.binding.is_some() {
            info!(endpoint = %self.endpoint, "soap: disconnected");
        }
        self.session = None;
        self.binding = None;
    }

    fn require_token(&self, supplied: Option<&str>) -> Result<String, GatewayError> {
        supplied
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.session
                    .as_ref()
                    .filter(|token| !token.is_empty())
                    .map(|token| token.as_str().to_string())
            })
            .ok_or_else(GatewayError::missing_token)
    }

    fn invoke(
        &mut self,
        operation: Operation,
        args: Vec<(&'static str, String)>,
    ) -> Result<SoapValue, GatewayError> {
        self.connect()?;
        let Some(binding) = self.binding.as_ref() else {
            return Err(GatewayError::ConnectionFailure(format!(
                "error while {}: no SOAP binding available",
                operation.describe()
            )));
        };

        debug!(operation = operation.wire_name(), "soap: calling");
        let result = binding.call(operation, &args);
        result.map_err(|err| self.classified(operation, err))
    }

    /// Classifies `err` and drops the stored session when it has expired.
    fn classified(
        &mut self,
        operation: Operation,
        err: impl Into<anyhow::Error>,
    ) -> GatewayError {
        let classified = classify(operation, err.into());
        if classified == GatewayError::SessionExpired {
            self.session = None;
        }
        classified
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
