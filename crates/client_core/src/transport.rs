//! Transport seam between the gateway and the SOAP service.
//!
//! The gateway only sees [`SoapConnector`] and [`SoapBinding`]; the HTTP
//! implementation below is the one the apps use.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{blocking::Client, header::CONTENT_TYPE, StatusCode};
use shared::protocol::{Operation, SoapValue};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    soap::{decode_response, encode_request, parse_wsdl},
};

pub trait SoapConnector {
    type Binding: SoapBinding;

    /// Bounded reachability check; `Ok(false)` means the endpoint answered
    /// but is not serving the service description.
    fn probe(&self, endpoint: &Url) -> Result<bool>;

    fn bind(&self, endpoint: &Url) -> Result<Self::Binding>;
}

pub trait SoapBinding {
    fn call(&self, operation: Operation, args: &[(&'static str, String)]) -> Result<SoapValue>;
}

pub struct HttpSoapConnector {
    http: Client,
    probe_timeout: Duration,
    call_timeout: Duration,
    fallback_namespace: String,
}

impl HttpSoapConnector {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            probe_timeout: settings.probe_timeout(),
            call_timeout: settings.call_timeout(),
            fallback_namespace: settings.namespace.clone(),
        })
    }
}

impl SoapConnector for HttpSoapConnector {
    type Binding = HttpSoapBinding;

    fn probe(&self, endpoint: &Url) -> Result<bool> {
        let response = self
            .http
            .get(endpoint.clone())
            .timeout(self.probe_timeout)
            .send()
            .with_context(|| format!("connection error: {endpoint} did not answer"))?;
        debug!(%endpoint, status = %response.status(), "soap: probe answered");
        Ok(response.status() == StatusCode::OK)
    }

    fn bind(&self, endpoint: &Url) -> Result<HttpSoapBinding> {
        let wsdl = self
            .http
            .get(endpoint.clone())
            .timeout(self.call_timeout)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("failed to fetch service description from {endpoint}"))?;

        let discovered = match parse_wsdl(&wsdl) {
            Ok(binding) => binding,
            Err(err) => {
                warn!(%endpoint, error = %err, "soap: unreadable service description, using endpoint defaults");
                Default::default()
            }
        };

        let address = match discovered.address.as_deref() {
            Some(location) => endpoint
                .join(location)
                .with_context(|| format!("invalid service address '{location}' in WSDL"))?,
            None => {
                let mut address = endpoint.clone();
                address.set_query(None);
                address
            }
        };
        let namespace = discovered
            .namespace
            .unwrap_or_else(|| self.fallback_namespace.clone());

        debug!(%address, %namespace, "soap: bound service");
        Ok(HttpSoapBinding {
            http: self.http.clone(),
            address,
            namespace,
            call_timeout: self.call_timeout,
        })
    }
}

pub struct HttpSoapBinding {
    http: Client,
    address: Url,
    namespace: String,
    call_timeout: Duration,
}

impl HttpSoapBinding {
    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl SoapBinding for HttpSoapBinding {
    fn call(&self, operation: Operation, args: &[(&'static str, String)]) -> Result<SoapValue> {
        let name = operation.wire_name();
        let envelope = encode_request(&self.namespace, name, args);
        let response = self
            .http
            .post(self.address.clone())
            .timeout(self.call_timeout)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}#{name}\"", self.namespace))
            .body(envelope)
            .send()
            .with_context(|| format!("{name}: request to {} failed", self.address))?;

        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("{name}: failed to read response body"))?;
        let value = decode_response(&body).with_context(|| format!("{name} (HTTP {status})"))?;
        if !status.is_success() {
            bail!("{name}: SOAP endpoint answered HTTP {status}");
        }
        Ok(value)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
