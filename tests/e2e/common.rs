use mplus_qapi::{ApiEndpoint, SessionConfig, SoapSession};
use wiremock::MockServer;

pub const IDENT: &str = "test-ident";
pub const SECRET: &str = "test-secret";

/// A session pointed at `server` with the default configuration.
pub fn session_for(server: &MockServer) -> SoapSession {
    session_with(server, SessionConfig::default())
}

pub fn session_with(server: &MockServer, config: SessionConfig) -> SoapSession {
    let address = server.address();
    let endpoint = ApiEndpoint::new(
        format!("http://{}", address.ip()),
        address.port(),
        IDENT,
        SECRET,
    );
    SoapSession::new(endpoint, config).expect("session should build for a mock server")
}

/// Wrap `inner` in a QAPI response envelope for `method`.
pub fn response_envelope(method: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns="urn:mplusqapi">
  <SOAP-ENV:Body>
    <ns:{method}Response>{inner}</ns:{method}Response>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

pub fn fault_envelope(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Server</faultcode>
      <faultstring>{message}</faultstring>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
