//! One-call entry points: connect, authenticate, list, project, log out.

use crate::client::SpacewalkClient;
use crate::dispatch::dispatch;
use crate::error::SpacewalkResult;
use crate::session::with_session;
use crate::transport::{HttpTransport, RpcTransport};
use crate::types::{ClientConfig, Credentials, ProjectionResult, QueryKind};

/// Run `kind` against the server described by `config`.
///
/// A malformed endpoint is reported as an authentication error since no
/// login could take place.
pub async fn run_query(
    config: &ClientConfig,
    credentials: &Credentials,
    kind: QueryKind,
    target: Option<&str>,
) -> SpacewalkResult<ProjectionResult> {
    let transport = HttpTransport::new(config)?;
    let client = SpacewalkClient::new(transport);
    log::debug!("Querying {}", client.transport().endpoint().host_str().unwrap_or("?"));
    query_with(&client, credentials, kind, target).await
}

/// Same as [`run_query`] over an already-built client.
pub async fn query_with<T: RpcTransport>(
    client: &SpacewalkClient<T>,
    credentials: &Credentials,
    kind: QueryKind,
    target: Option<&str>,
) -> SpacewalkResult<ProjectionResult> {
    with_session(client, credentials, |session| async move {
        dispatch(client, &session, kind, target).await
    })
    .await
}
