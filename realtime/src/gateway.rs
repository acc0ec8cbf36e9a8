//! Authorization seam for room joins.
//!
//! Whether a connection may see a ticket's room is decided by the
//! session gateway, an external collaborator. This module only defines
//! the boundary; the shipped [`OpenGateway`] admits everyone and is
//! what deployments without a gateway wire in.

use crate::room::Room;
use std::future::Future;
use std::pin::Pin;
use supportdesk_core::types::UserId;

/// Decides whether a connection may join a room.
///
/// # Dyn Compatibility
///
/// Uses an explicit `Pin<Box<dyn Future>>` return so application state
/// can hold an `Arc<dyn RoomAuthorizer>`.
pub trait RoomAuthorizer: Send + Sync {
    /// Whether `user` may join `room`. The global topic is typically
    /// restricted to staff dashboards; ticket rooms to their
    /// participants. Denials surface as 403 at the transport boundary.
    fn may_join(
        &self,
        user: UserId,
        room: &Room,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Allow-all authorizer for deployments where the session gateway
/// fronts the service and joins arrive pre-authorized.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGateway;

impl RoomAuthorizer for OpenGateway {
    fn may_join(
        &self,
        _user: UserId,
        _room: &Room,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async { true })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;
    use supportdesk_core::types::TicketId;

    #[tokio::test]
    async fn open_gateway_admits_everyone() {
        let gateway = OpenGateway;
        let user = UserId::new();
        assert!(gateway.may_join(user, &Room::Global).await);
        assert!(
            gateway
                .may_join(user, &Room::Ticket(TicketId::new()))
                .await
        );
    }
}
