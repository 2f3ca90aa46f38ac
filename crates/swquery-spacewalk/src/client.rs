//! Typed wrappers for the Spacewalk `auth.*` and `system.*` API methods.

use crate::error::{SpacewalkError, SpacewalkResult};
use crate::transport::RpcTransport;
use crate::types::{Credentials, QueryKind, Session, SystemId};
use crate::xmlrpc::{Value, XmlRpcError};

use secrecy::ExposeSecret;

pub const AUTH_LOGIN: &str = "auth.login";
pub const AUTH_LOGOUT: &str = "auth.logout";

/// Shorter passwords are too ambiguous to mask inside server text.
const MIN_MASKABLE_LEN: usize = 6;

/// Spacewalk API client over any `RpcTransport`.
pub struct SpacewalkClient<T> {
    transport: T,
}

impl<T: RpcTransport> SpacewalkClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Session management ──────────────────────────────────────────

    /// `auth.login(user, password)`.
    ///
    /// Every failure (transport, fault, empty key) is an authentication
    /// error. The password never reaches the message; see `login_failure`.
    pub async fn login(&self, credentials: &Credentials) -> SpacewalkResult<Session> {
        let password = credentials.password.expose_secret();
        let params = vec![
            Value::from(credentials.user.as_str()),
            Value::from(password.as_str()),
        ];

        let value = self
            .transport
            .call(AUTH_LOGIN, params)
            .await
            .map_err(|e| SpacewalkError::auth(login_failure(&e, password)))?;

        Session::from_login_value(&value)
            .ok_or_else(|| SpacewalkError::auth("Server returned no session key"))
    }

    /// `auth.logout(session)`.
    pub async fn logout(&self, session: &Session) -> SpacewalkResult<()> {
        self.transport
            .call(AUTH_LOGOUT, vec![session.to_value()])
            .await
            .map(|_| ())
            .map_err(|e| SpacewalkError::from_query(AUTH_LOGOUT, e))
    }

    // ── System listings ─────────────────────────────────────────────

    /// `system.listSystems(session)`.
    pub async fn list_systems(&self, session: &Session) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::AllSystems.method(), vec![session.to_value()]).await
    }

    /// `system.listOutOfDateSystems(session)`.
    pub async fn list_out_of_date_systems(&self, session: &Session) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::OutOfDateSystems.method(), vec![session.to_value()]).await
    }

    /// `system.listPhysicalSystems(session)`. Spacewalk also counts LXC
    /// containers as physical.
    pub async fn list_physical_systems(&self, session: &Session) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::PhysicalSystems.method(), vec![session.to_value()]).await
    }

    // ── Package listings ────────────────────────────────────────────

    /// `system.listPackages(session, sid)`.
    pub async fn list_packages(&self, session: &Session, id: &SystemId) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::AllPackages.method(), scoped(session, id)).await
    }

    /// `system.listLatestUpgradablePackages(session, sid)`.
    pub async fn list_latest_upgradable_packages(
        &self,
        session: &Session,
        id: &SystemId,
    ) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::UpgradablePackages.method(), scoped(session, id)).await
    }

    /// `system.listExtraPackages(session, sid)`.
    pub async fn list_extra_packages(&self, session: &Session, id: &SystemId) -> SpacewalkResult<Vec<Value>> {
        self.listing(QueryKind::ExtraPackages.method(), scoped(session, id)).await
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn listing(&self, method: &str, params: Vec<Value>) -> SpacewalkResult<Vec<Value>> {
        let value = self
            .transport
            .call(method, params)
            .await
            .map_err(|e| SpacewalkError::from_query(method, e))?;

        match value {
            Value::Array(items) => Ok(items),
            other => Err(SpacewalkError::malformed(format!(
                "{method} returned {} instead of an array",
                other.type_name()
            ))),
        }
    }
}

fn scoped(session: &Session, id: &SystemId) -> Vec<Value> {
    vec![session.to_value(), id.as_value().clone()]
}

/// Describe a failed login without revealing `secret`.
///
/// Long secrets are masked in place. A short one would leave its
/// positions readable between the masks, so the server text is dropped
/// and only the error class (and fault code) is kept.
fn login_failure(err: &XmlRpcError, secret: &str) -> String {
    let text = err.to_string();
    if secret.is_empty() || !text.contains(secret) {
        return text;
    }
    if secret.chars().count() >= MIN_MASKABLE_LEN {
        return text.replace(secret, "********");
    }
    match err {
        XmlRpcError::Fault { code, .. } => format!("fault {code}: login rejected"),
        XmlRpcError::Http { status, .. } => format!("HTTP {status} from login"),
        XmlRpcError::Xml(_) => "XML error in login response".to_string(),
        XmlRpcError::Decode(_) => "decode error in login response".to_string(),
        XmlRpcError::Transport(_) => "transport error during login".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockRpcTransport;

    #[tokio::test]
    async fn login_returns_session_key() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call()
            .withf(|method: &str, params: &Vec<Value>| {
                method == AUTH_LOGIN && params == &vec![Value::from("admin"), Value::from("s3cret")]
            })
            .times(1)
            .returning(|_, _| Ok(Value::from("5x1b2c")));

        let client = SpacewalkClient::new(mock);
        let session = client.login(&Credentials::new("admin", "s3cret")).await.unwrap();
        assert_eq!(session.token(), "5x1b2c");
    }

    #[tokio::test]
    async fn login_fault_is_auth_error_without_password() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call().times(1).returning(|_, _| {
            Err(XmlRpcError::Fault {
                code: 2950,
                message: "bad login for admin/s3cret".into(),
            })
        });

        let client = SpacewalkClient::new(mock);
        let err = client.login(&Credentials::new("admin", "s3cret")).await.unwrap_err();
        assert!(err.is_auth());
        assert!(!err.message.contains("s3cret"));
        assert!(err.message.contains("2950"));
    }

    #[tokio::test]
    async fn login_empty_key_is_auth_error() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call().times(1).returning(|_, _| Ok(Value::from("")));

        let client = SpacewalkClient::new(mock);
        let err = client.login(&Credentials::new("admin", "pw")).await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn package_calls_pass_session_and_id() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call()
            .withf(|method: &str, params: &Vec<Value>| {
                method == "system.listExtraPackages"
                    && params == &vec![Value::from("tok"), Value::Int(1000010000)]
            })
            .times(1)
            .returning(|_, _| Ok(Value::Array(vec![])));

        let client = SpacewalkClient::new(mock);
        let session = Session::from_login_value(&Value::from("tok")).unwrap();
        let items = client
            .list_extra_packages(&session, &SystemId(Value::Int(1000010000)))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn non_array_listing_is_malformed() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call().times(1).returning(|_, _| Ok(Value::from("oops")));

        let client = SpacewalkClient::new(mock);
        let session = Session::from_login_value(&Value::from("tok")).unwrap();
        let err = client.list_systems(&session).await.unwrap_err();
        assert_eq!(err.kind, crate::error::SpacewalkErrorKind::MalformedRecord);
    }

    #[tokio::test]
    async fn login_fault_with_one_letter_password_drops_server_text() {
        let mut mock = MockRpcTransport::new();
        mock.expect_call().times(1).returning(|_, _| {
            Err(XmlRpcError::Fault {
                code: 2950,
                message: "Either the password or username is incorrect.".into(),
            })
        });

        let client = SpacewalkClient::new(mock);
        let err = client.login(&Credentials::new("admin", "e")).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.message, "fault 2950: login rejected");
        assert!(!err.message.contains('*'));
    }

    #[test]
    fn login_failure_masks_long_secrets_only() {
        let fault = XmlRpcError::Fault { code: 1, message: "a hunter2 b hunter2".into() };
        assert_eq!(login_failure(&fault, "hunter2"), "fault 1: a ******** b ********");

        let transport = XmlRpcError::Transport("Connection failed: pw refused".into());
        assert_eq!(login_failure(&transport, "pw"), "transport error during login");

        let http = XmlRpcError::Http { status: 401, body: "no".into() };
        assert_eq!(login_failure(&http, "xyz"), "HTTP 401: no");
        assert_eq!(login_failure(&http, ""), "HTTP 401: no");
    }
}
