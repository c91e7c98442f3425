use super::*;
use crate::SoapGateway;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use pretty_assertions::assert_eq;
use shared::error::GatewayError;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

#[derive(Clone)]
struct SoapServer {
    wsdl: Arc<String>,
    replies: Arc<HashMap<&'static str, (StatusCode, String)>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="urn:luxew-test">
<SOAP-ENV:Body>{body}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

fn wsdl(location: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<definitions name="LuxewService" targetNamespace="urn:luxew-test"
    xmlns="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/">
  <service name="LuxewService">
    <port name="LuxewPort" binding="tns:LuxewBinding">
      <soap:address location="{location}"/>
    </port>
  </service>
</definitions>"#
    )
}

async fn describe_service(State(server): State<SoapServer>) -> String {
    server.wsdl.as_ref().clone()
}

async fn answer_call(
    State(server): State<SoapServer>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let action = headers
        .get("SOAPAction")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    server
        .requests
        .lock()
        .expect("requests")
        .push((action, body.clone()));

    server
        .replies
        .iter()
        .find(|(operation, _)| body.contains(&format!("<ns1:{operation}>")))
        .map(|(_, reply)| reply.clone())
        .unwrap_or_else(|| (StatusCode::BAD_REQUEST, "unknown operation".to_string()))
}

/// Serves the service description on GET and canned envelopes on POST from a
/// runtime of its own; the blocking client must not run inside it.
fn spawn_soap_server(
    replies: HashMap<&'static str, (StatusCode, String)>,
) -> (Url, Arc<Mutex<Vec<(String, String)>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let requests = Arc::new(Mutex::new(Vec::new()));
    let server = SoapServer {
        wsdl: Arc::new(wsdl(&format!("http://{addr}/soap.php"))),
        replies: Arc::new(replies),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/soap.php", get(describe_service).post(answer_call))
        .with_state(server);
    std::thread::spawn(move || {
        runtime.block_on(async move {
            let _ = axum::serve(listener, app).await;
        });
    });

    let endpoint = Url::parse(&format!("http://{addr}/soap.php?wsdl")).expect("endpoint");
    (endpoint, requests)
}

fn connector() -> HttpSoapConnector {
    HttpSoapConnector::new(&ClientSettings {
        probe_timeout_secs: 2,
        call_timeout_secs: 5,
        ..ClientSettings::default()
    })
    .expect("connector")
}

#[test]
fn bind_reads_address_and_namespace_from_the_service_description() {
    let (endpoint, _) = spawn_soap_server(HashMap::new());
    let connector = connector();

    assert!(connector.probe(&endpoint).expect("probe"));
    let binding = connector.bind(&endpoint).expect("bind");
    assert_eq!(binding.namespace(), "urn:luxew-test");
    assert_eq!(binding.address().path(), "/soap.php");
    assert_eq!(binding.address().query(), None);
}

#[test]
fn probe_reports_a_missing_service_as_unreachable() {
    let (endpoint, _) = spawn_soap_server(HashMap::new());
    let missing = endpoint.join("/nothing-here").expect("url");
    assert!(!connector().probe(&missing).expect("probe"));
}

#[test]
fn gateway_authenticates_and_lists_users_over_http() {
    let (endpoint, requests) = spawn_soap_server(HashMap::from([
        (
            "authentifierUtilisateur",
            (
                StatusCode::OK,
                envelope(
                    "<ns1:authentifierUtilisateurResponse><return>\
                       <succes>true</succes><jeton>T-42</jeton>\
                     </return></ns1:authentifierUtilisateurResponse>",
                ),
            ),
        ),
        (
            "listerUtilisateurs",
            (
                StatusCode::OK,
                envelope(
                    "<ns1:listerUtilisateursResponse><return><utilisateurs>\
                       <item><id>1</id><pseudo>alice</pseudo><email>a@luxew.test</email>\
                         <roles><item>admin</item></roles></item>\
                       <item><id>2</id><pseudo>bob</pseudo><email>b@luxew.test</email></item>\
                     </utilisateurs></return></ns1:listerUtilisateursResponse>",
                ),
            ),
        ),
    ]));
    let mut gateway = SoapGateway::new(endpoint, connector());

    let token = gateway.authenticate("admin", "s3cret").expect("authenticate");
    assert_eq!(token.as_str(), "T-42");

    let users = gateway.list_users(None).expect("list users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].pseudo, "alice");
    assert_eq!(users[0].roles, vec!["admin".to_string()]);
    assert!(users[1].roles.is_empty());

    let requests = requests.lock().expect("requests");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "\"urn:luxew-test#authentifierUtilisateur\"");
    assert!(requests[0].1.contains("<motDePasse>s3cret</motDePasse>"));
    assert!(requests[1].1.contains("<jeton>T-42</jeton>"));
}

#[test]
fn expired_token_fault_becomes_session_expired() {
    let (endpoint, _) = spawn_soap_server(HashMap::from([(
        "listerRoles",
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            envelope(
                "<SOAP-ENV:Fault><faultcode>SOAP-ENV:Client</faultcode>\
                   <faultstring>Jeton invalide ou expiré</faultstring></SOAP-ENV:Fault>",
            ),
        ),
    )]));
    let mut gateway = SoapGateway::new(endpoint, connector());

    assert_eq!(
        gateway.list_roles(Some("stale")).expect_err("expired"),
        GatewayError::SessionExpired
    );
}

#[test]
fn other_http_failures_are_connection_failures() {
    let (endpoint, _) = spawn_soap_server(HashMap::new());
    let mut gateway = SoapGateway::new(endpoint, connector());

    let err = gateway.delete_user(Some("T1"), shared::domain::UserId(3));
    assert!(matches!(
        err,
        Err(GatewayError::ConnectionFailure(message)) if message.starts_with("error while deleting the user")
    ));
}
