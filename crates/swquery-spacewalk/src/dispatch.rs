//! Query kind → remote listing → projected names.

use crate::client::SpacewalkClient;
use crate::error::{SpacewalkError, SpacewalkResult};
use crate::projector::{project, NAME_FIELD};
use crate::resolver::resolve_system_id;
use crate::transport::RpcTransport;
use crate::types::{ProjectionResult, QueryKind, Session, SystemId};

/// Run one listing and project it on `name`.
///
/// Package kinds resolve `target` (a system name) first and fail with
/// `NotFound` before any package call when no system carries that name.
/// `target` is ignored for system kinds.
pub async fn dispatch<T: RpcTransport>(
    client: &SpacewalkClient<T>,
    session: &Session,
    kind: QueryKind,
    target: Option<&str>,
) -> SpacewalkResult<ProjectionResult> {
    log::debug!("Dispatching query for {kind}");

    let records = match kind {
        QueryKind::AllSystems => client.list_systems(session).await?,
        QueryKind::OutOfDateSystems => client.list_out_of_date_systems(session).await?,
        QueryKind::PhysicalSystems => client.list_physical_systems(session).await?,
        QueryKind::AllPackages => {
            let id = resolve_target(client, session, target).await?;
            client.list_packages(session, &id).await?
        }
        QueryKind::UpgradablePackages => {
            let id = resolve_target(client, session, target).await?;
            client.list_latest_upgradable_packages(session, &id).await?
        }
        QueryKind::ExtraPackages => {
            let id = resolve_target(client, session, target).await?;
            client.list_extra_packages(session, &id).await?
        }
    };

    let names = project(&records, NAME_FIELD)?;
    log::info!("{} {kind} returned", names.len());
    Ok(ProjectionResult::new(names))
}

async fn resolve_target<T: RpcTransport>(
    client: &SpacewalkClient<T>,
    session: &Session,
    target: Option<&str>,
) -> SpacewalkResult<SystemId> {
    let name = target
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SpacewalkError::invalid_argument("A system name is required for package queries"))?;

    let id = resolve_system_id(client, session, name)
        .await?
        .ok_or_else(|| SpacewalkError::not_found(format!("System '{name}' not found")))?;
    log::debug!("Resolved system '{name}' to id {id}");
    Ok(id)
}
