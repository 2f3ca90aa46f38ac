//! Scoped session lifecycle.
//!
//! `with_session` logs in, hands the session to a body future, and logs
//! out afterwards on every exit path: success, error, or panic. A failed
//! logout is logged and never replaces the body's outcome.

use crate::client::SpacewalkClient;
use crate::error::SpacewalkResult;
use crate::transport::RpcTransport;
use crate::types::{Credentials, Session};

use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// Run `body` inside an authenticated session.
///
/// If login fails the error is returned and `body` never runs.
pub async fn with_session<T, F, Fut, R>(
    client: &SpacewalkClient<T>,
    credentials: &Credentials,
    body: F,
) -> SpacewalkResult<R>
where
    T: RpcTransport,
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = SpacewalkResult<R>>,
{
    let session = client.login(credentials).await?;
    log::info!("Logged in as {}", credentials.user);

    let outcome = AssertUnwindSafe(body(session.clone())).catch_unwind().await;

    match client.logout(&session).await {
        Ok(()) => log::info!("Logged out"),
        Err(e) => log::warn!("Logout failed, ignoring: {e}"),
    }

    match outcome {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}
