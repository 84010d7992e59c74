//! Session: owns the single active connection and its lifecycle.
//!
//! The not-connected guard for attribute I/O lives here, once, so no caller
//! has to duplicate it.

use crate::error::ClientError;
use crate::transport::Transport;

use lockbox_proto::AttributeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct Session<T: Transport> {
    transport: T,
    state: SessionState,
    conn: Option<T::Connection>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Disconnected,
            conn: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Scan up to `attempts` windows for the peripheral advertising
    /// `target_name`. Exhaustion is `DeviceNotFound`, not an endless loop.
    pub async fn discover(
        &self,
        target_name: &str,
        attempts: u32,
    ) -> Result<T::Peripheral, ClientError> {
        for attempt in 1..=attempts {
            tracing::info!(attempt, attempts, target_name, "scanning");
            match self
                .transport
                .scan(target_name)
                .await
                .map_err(ClientError::ConnectFailed)?
            {
                Some(peripheral) => return Ok(peripheral),
                None => tracing::warn!(attempt, target_name, "peripheral not seen"),
            }
        }
        Err(ClientError::DeviceNotFound { attempts })
    }

    /// Valid only from `Disconnected`. On transport failure the session is
    /// back in `Disconnected` and the cause is surfaced as `ConnectFailed`.
    pub async fn connect(&mut self, peripheral: &T::Peripheral) -> Result<(), ClientError> {
        match self.state {
            SessionState::Connecting => return Err(ClientError::AlreadyConnecting),
            SessionState::Connected => return Err(ClientError::AlreadyConnected),
            SessionState::Disconnected => {}
        }

        self.state = SessionState::Connecting;
        match self.transport.connect(peripheral).await {
            Ok(conn) => {
                self.conn = Some(conn);
                self.state = SessionState::Connected;
                tracing::info!("connected");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                Err(ClientError::ConnectFailed(e))
            }
        }
    }

    /// Idempotent: a no-op when already disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.transport.disconnect(conn).await;
            tracing::info!("disconnected");
        }
        self.state = SessionState::Disconnected;
    }

    pub async fn read_attribute(&self, id: AttributeId) -> Result<Vec<u8>, ClientError> {
        let conn = self.connection()?;
        self.transport
            .read_attribute(conn, id)
            .await
            .map_err(|e| ClientError::io(id, e))
    }

    pub async fn write_attribute(&self, id: AttributeId, data: &[u8]) -> Result<(), ClientError> {
        let conn = self.connection()?;
        self.transport
            .write_attribute(conn, id, data)
            .await
            .map_err(|e| ClientError::io(id, e))
    }

    fn connection(&self) -> Result<&T::Connection, ClientError> {
        if self.state != SessionState::Connected {
            return Err(ClientError::NotConnected);
        }
        self.conn.as_ref().ok_or(ClientError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubTransport {
        attrs: Mutex<HashMap<AttributeId, Vec<u8>>>,
        visible: bool,
        fail_connect: bool,
    }

    impl StubTransport {
        fn visible() -> Self {
            Self {
                visible: true,
                ..Self::default()
            }
        }

        fn with_attr(self, id: AttributeId, data: &[u8]) -> Self {
            self.attrs.lock().unwrap().insert(id, data.to_vec());
            self
        }
    }

    impl Transport for StubTransport {
        type Peripheral = ();
        type Connection = ();

        async fn scan(&self, _target_name: &str) -> Result<Option<()>, TransportError> {
            Ok(self.visible.then_some(()))
        }

        async fn connect(&self, _peripheral: &()) -> Result<(), TransportError> {
            if self.fail_connect {
                Err(TransportError::Failed("connection refused".into()))
            } else {
                Ok(())
            }
        }

        async fn read_attribute(&self, _conn: &(), id: AttributeId) -> Result<Vec<u8>, TransportError> {
            self.attrs
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(TransportError::MissingAttribute(id))
        }

        async fn write_attribute(
            &self,
            _conn: &(),
            id: AttributeId,
            data: &[u8],
        ) -> Result<(), TransportError> {
            self.attrs.lock().unwrap().insert(id, data.to_vec());
            Ok(())
        }

        async fn disconnect(&self, _conn: ()) {}
    }

    #[tokio::test]
    async fn read_guard_tracks_lifecycle() {
        let transport = StubTransport::visible().with_attr(AttributeId::LockStatus, &[0]);
        let mut session = Session::new(transport);

        assert!(matches!(
            session.read_attribute(AttributeId::LockStatus).await,
            Err(ClientError::NotConnected)
        ));

        let peripheral = session.discover("SecureLockbox", 1).await.unwrap();
        session.connect(&peripheral).await.unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(
            session.read_attribute(AttributeId::LockStatus).await.unwrap(),
            vec![0]
        );

        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(matches!(
            session.read_attribute(AttributeId::LockStatus).await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_from_connected_is_rejected() {
        let mut session = Session::new(StubTransport::visible());
        session.connect(&()).await.unwrap();
        assert!(matches!(
            session.connect(&()).await,
            Err(ClientError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn failed_connect_returns_to_disconnected() {
        let transport = StubTransport {
            visible: true,
            fail_connect: true,
            ..StubTransport::default()
        };
        let mut session = Session::new(transport);

        assert!(matches!(
            session.connect(&()).await,
            Err(ClientError::ConnectFailed(_))
        ));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut session = Session::new(StubTransport::visible());
        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);

        session.connect(&()).await.unwrap();
        session.disconnect().await;
        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn discovery_exhaustion_is_device_not_found() {
        let session = Session::new(StubTransport::default());
        match session.discover("SecureLockbox", 3).await {
            Err(ClientError::DeviceNotFound { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected DeviceNotFound, got {other:?}"),
        }
    }
}
