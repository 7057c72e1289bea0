//! XLink Kai connection state machine
//!
//! Speaks the text-prefixed, binary-payload UDP protocol of the bridging
//! service: a connect handshake, keep-alive echoes, encapsulated data
//! frames and a one-time settings burst. A background poll task drives
//! reconnection and deadline bookkeeping; relayed frames are handed to a
//! pluggable [`FrameSink`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

use crate::convert::ieee8023;
use crate::mac::HardwareAddress;
use crate::{BridgeError, Result, MAX_FRAME_SIZE};

/// Command strings of the bridging-service protocol.
pub mod commands {
    pub const CONNECT: &str = "connect;";
    pub const CONNECTED: &str = "connected;";
    pub const DISCONNECT: &str = "disconnect;";
    pub const DISCONNECTED: &str = "disconnected;";
    pub const KEEPALIVE: &str = "keepalive;";
    /// Prefix of an encapsulated Ethernet-style data frame.
    pub const ETHERNET_DATA: &str = "e;e;";
    /// Prefix of a device-directed command.
    pub const DEVICE_DATA: &str = "e;d;";
    /// Device command announcing a peer network-name switch.
    pub const SET_ESSID: &str = "setessid;";
    pub const SETTING_DDS_ONLY: &str = "setting;ddsonly;true;";
    pub const INFO_TITLE_ID: &str = "info;titleid;";
    pub const INFO_ESSID: &str = "info;essid;";
}

/// Default endpoint of a locally running bridging service.
pub const DEFAULT_REMOTE: &str = "127.0.0.1:34523";

/// Connection configuration.
///
/// All intervals are in milliseconds so the config serializes to plain
/// JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Endpoint of the bridging service.
    pub remote: SocketAddr,
    /// Name this instance identifies itself with.
    pub local_name: String,
    /// Application name sent during the handshake.
    pub app_name: String,
    /// How long a connection attempt may stay unanswered.
    pub connection_timeout_ms: u64,
    /// Silence threshold after which the peer is considered dead.
    pub keepalive_timeout_ms: u64,
    /// Fixed backoff between reconnection attempts.
    pub retry_backoff_ms: u64,
    /// Receive slice of the poll loop.
    pub poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.parse().unwrap_or_else(|_| {
                SocketAddr::from(([127, 0, 0, 1], 34523))
            }),
            local_name: "kai-bridge".to_owned(),
            app_name: "kai-bridge".to_owned(),
            connection_timeout_ms: 2_000,
            keepalive_timeout_ms: 30_000,
            retry_backoff_ms: 10_000,
            poll_interval_ms: 10,
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn keepalive_timeout(&self) -> Duration {
        Duration::from_millis(self.keepalive_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Receiving side for frames relayed from the bridging service.
///
/// Conversion to the sink's own wire format happens behind `send_frame`;
/// a wireless sink uses its locked BSSID and last data-frame radio
/// parameters there.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Deliver a relayed 802.3 frame. Returns false on transport failure.
    async fn send_frame(&self, frame: &[u8]) -> bool;

    /// Deny-list an address so the relay never echoes its frames back.
    async fn deny(&self, address: HardwareAddress);

    /// Cached network name, if the sink knows one.
    async fn essid(&self) -> Option<String>;

    /// Cached title identifier, if the sink knows one.
    async fn title_id(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct Session {
    connected: bool,
    connecting: bool,
    settings_sent: bool,
    connection_deadline: Option<Instant>,
    keepalive_deadline: Option<Instant>,
    retry_at: Option<Instant>,
    peer_essid: Option<String>,
}

struct Shared {
    config: BridgeConfig,
    socket: RwLock<Option<UdpSocket>>,
    session: RwLock<Session>,
    running: RwLock<bool>,
    sink: Arc<dyn FrameSink>,
}

impl Shared {
    /// Send raw bytes without protocol gating.
    async fn send_raw(&self, data: &[u8]) -> bool {
        let guard = self.socket.read().await;
        let Some(socket) = guard.as_ref() else {
            log::debug!("Send attempted without an open socket");
            return false;
        };

        match socket.send(data).await {
            Ok(_) => true,
            Err(error) => {
                log::error!("Send failed: {}", error);
                false
            }
        }
    }

    /// Send with protocol gating: before the connection is confirmed only
    /// connect and disconnect commands may leave.
    async fn send(&self, data: &[u8]) -> bool {
        let permitted = {
            let session = self.session.read().await;
            session.connected
                || data.starts_with(commands::CONNECT.as_bytes())
                || data.starts_with(commands::DISCONNECT.as_bytes())
        };

        if !permitted {
            log::debug!("Rejected send while not connected");
            return false;
        }

        self.send_raw(data).await
    }

    /// Bind a fresh local socket and point it at the service.
    async fn open(&self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(self.config.remote).await?;
        *self.socket.write().await = Some(socket);
        Ok(())
    }

    /// Issue the connect command and arm the connection deadline.
    async fn connect(&self) -> Result<()> {
        {
            let mut session = self.session.write().await;
            session.connected = false;
            session.connecting = true;
            session.settings_sent = false;
            session.connection_deadline =
                Some(Instant::now() + self.config.connection_timeout());
        }

        let command = format!(
            "{}{};{};",
            commands::CONNECT,
            self.config.local_name,
            self.config.app_name
        );
        log::info!("Connecting to {}", self.config.remote);

        if self.send_raw(command.as_bytes()).await {
            Ok(())
        } else {
            let mut session = self.session.write().await;
            session.connecting = false;
            session.connection_deadline = None;
            Err(BridgeError::NotConnected)
        }
    }

    async fn handle_datagram(&self, data: &[u8]) {
        if data.starts_with(commands::CONNECTED.as_bytes()) {
            // Prefix comparison: the service may append trailing bytes
            // (such as a terminating separator) after the name.
            let expected = format!("{}{}", commands::CONNECTED, self.config.local_name);
            let mut session = self.session.write().await;
            if session.connecting && data.starts_with(expected.as_bytes()) {
                session.connecting = false;
                session.connected = true;
                session.connection_deadline = None;
                session.keepalive_deadline =
                    Some(Instant::now() + self.config.keepalive_timeout());
                log::info!("Connected to {}", self.config.remote);
            } else {
                log::warn!(
                    "Unexpected connection confirmation: {}",
                    String::from_utf8_lossy(data)
                );
            }
        } else if data.starts_with(commands::DISCONNECTED.as_bytes()) {
            let expected = format!("{}{}", commands::DISCONNECTED, self.config.local_name);
            let mut session = self.session.write().await;
            if !data.starts_with(expected.as_bytes()) {
                log::warn!(
                    "Teardown for a different name ignored: {}",
                    String::from_utf8_lossy(data)
                );
            } else if session.connected {
                session.connected = false;
                session.settings_sent = false;
                session.retry_at = Some(Instant::now() + self.config.retry_backoff());
                log::warn!("Service closed the session");
            }
        } else if data == commands::KEEPALIVE.as_bytes() {
            let connected = {
                let mut session = self.session.write().await;
                if session.connected {
                    session.keepalive_deadline =
                        Some(Instant::now() + self.config.keepalive_timeout());
                }
                session.connected
            };
            if connected {
                self.send_raw(commands::KEEPALIVE.as_bytes()).await;
            }
        } else if data.starts_with(commands::ETHERNET_DATA.as_bytes()) {
            let connected = {
                let mut session = self.session.write().await;
                if session.connected {
                    session.keepalive_deadline =
                        Some(Instant::now() + self.config.keepalive_timeout());
                }
                session.connected
            };
            if !connected {
                return;
            }

            let payload = &data[commands::ETHERNET_DATA.len()..];

            // The relay must never echo a peer's frames back at it.
            if let Some(source) = HardwareAddress::read(payload, ieee8023::SOURCE_OFFSET) {
                self.sink.deny(source).await;
            }

            if !self.sink.send_frame(payload).await {
                log::error!("Sink rejected a relayed frame of {} bytes", payload.len());
            }
        } else if data.starts_with(commands::DEVICE_DATA.as_bytes()) {
            let mut session = self.session.write().await;
            if !session.connected {
                return;
            }
            session.keepalive_deadline =
                Some(Instant::now() + self.config.keepalive_timeout());

            let rest = &data[commands::DEVICE_DATA.len()..];
            if rest.starts_with(commands::SET_ESSID.as_bytes()) {
                let name = &rest[commands::SET_ESSID.len()..];
                let name = String::from_utf8_lossy(name);
                let name = name.trim_end_matches(';');
                session.peer_essid = Some(name.to_owned());
                log::info!("Peer switched network name to \"{}\"", name);
            } else {
                log::debug!("Unhandled device command: {}", String::from_utf8_lossy(rest));
            }
        } else {
            log::debug!("Unrecognized datagram: {}", String::from_utf8_lossy(data));
        }
    }

    /// One-time settings burst after a confirmed connection.
    async fn send_settings(&self) {
        self.send(commands::SETTING_DDS_ONLY.as_bytes()).await;

        if let Some(title_id) = self.sink.title_id().await {
            let command = format!("{}{};", commands::INFO_TITLE_ID, title_id);
            self.send(command.as_bytes()).await;
        }

        if let Some(essid) = self.sink.essid().await {
            let command = format!("{}{};", commands::INFO_ESSID, essid);
            self.send(command.as_bytes()).await;
        }
    }

    /// Deadline bookkeeping and state-driven actions for one poll slice.
    async fn poll_once(&self) {
        enum Action {
            Nothing,
            Reconnect,
            SendSettings,
        }

        let now = Instant::now();
        let mut action = Action::Nothing;
        {
            let mut session = self.session.write().await;

            if session.connecting {
                let expired = session
                    .connection_deadline
                    .map(|deadline| now >= deadline)
                    .unwrap_or(true);
                if expired {
                    session.connecting = false;
                    session.connection_deadline = None;
                    session.retry_at = Some(now + self.config.retry_backoff());
                    log::warn!("Connection attempt timed out");
                }
            } else if session.connected {
                let expired = session
                    .keepalive_deadline
                    .map(|deadline| now >= deadline)
                    .unwrap_or(false);
                if expired {
                    session.connected = false;
                    session.settings_sent = false;
                    session.retry_at = Some(now + self.config.retry_backoff());
                    log::warn!("Keep-alive timeout, treating peer as dead");
                } else if !session.settings_sent {
                    session.settings_sent = true;
                    action = Action::SendSettings;
                }
            }

            if !session.connected
                && !session.connecting
                && session.retry_at.map(|at| now >= at).unwrap_or(true)
            {
                action = Action::Reconnect;
            }
        }

        match action {
            Action::Nothing => {}
            Action::SendSettings => self.send_settings().await,
            Action::Reconnect => {
                // Fresh socket per attempt, the old one may be stale.
                let result = match self.open().await {
                    Ok(()) => self.connect().await,
                    Err(error) => Err(error),
                };
                if let Err(error) = result {
                    log::error!("Reconnect failed: {}", error);
                    let mut session = self.session.write().await;
                    session.connecting = false;
                    session.retry_at = Some(Instant::now() + self.config.retry_backoff());
                }
            }
        }
    }

    async fn poll_loop(self: Arc<Self>) {
        let mut buffer = vec![0u8; MAX_FRAME_SIZE];

        loop {
            if !*self.running.read().await {
                break;
            }

            self.poll_once().await;

            let received = {
                let guard = self.socket.read().await;
                match guard.as_ref() {
                    Some(socket) => {
                        match timeout(self.config.poll_interval(), socket.recv(&mut buffer)).await
                        {
                            Ok(Ok(size)) => Some(size),
                            Ok(Err(error)) => {
                                log::error!("Receive error: {}", error);
                                None
                            }
                            Err(_) => None, // receive slice elapsed
                        }
                    }
                    None => {
                        drop(guard);
                        tokio::time::sleep(self.config.poll_interval()).await;
                        None
                    }
                }
            };

            if let Some(size) = received {
                self.handle_datagram(&buffer[..size]).await;
            }
        }

        log::debug!("Poll task stopped");
    }
}

/// Connection to the bridging service.
pub struct BridgeConnection {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl BridgeConnection {
    pub fn new(config: BridgeConfig, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                socket: RwLock::new(None),
                session: RwLock::new(Session::default()),
                running: RwLock::new(false),
                sink,
            }),
            task: None,
        }
    }

    /// Bind the local datagram socket. No protocol state changes.
    pub async fn open(&self) -> Result<()> {
        self.shared.open().await
    }

    /// Send the connect command and start waiting for confirmation.
    pub async fn connect(&self) -> Result<()> {
        self.shared.connect().await
    }

    /// Spawn the background poll task driving reconnection, deadlines and
    /// inbound command handling.
    pub async fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        *self.shared.running.write().await = true;
        let shared = Arc::clone(&self.shared);
        self.task = Some(tokio::spawn(shared.poll_loop()));
    }

    /// Relay a frame to the service, wrapped as a data command.
    ///
    /// Rejected (false) unless the connection is confirmed.
    pub async fn send_frame(&self, frame: &[u8]) -> bool {
        let mut datagram =
            Vec::with_capacity(commands::ETHERNET_DATA.len() + frame.len());
        datagram.extend_from_slice(commands::ETHERNET_DATA.as_bytes());
        datagram.extend_from_slice(frame);
        self.shared.send(&datagram).await
    }

    /// Send a raw protocol command, subject to the same gating as frames.
    pub async fn send_command(&self, command: &str) -> bool {
        self.shared.send(command.as_bytes()).await
    }

    pub async fn is_connected(&self) -> bool {
        self.shared.session.read().await.connected
    }

    pub async fn is_connecting(&self) -> bool {
        self.shared.session.read().await.connecting
    }

    /// Network name the peer last announced via a device command.
    pub async fn peer_essid(&self) -> Option<String> {
        self.shared.session.read().await.peer_essid.clone()
    }

    /// Send a disconnect if a session is up, stop the poll task and close
    /// the socket.
    pub async fn close(&mut self) -> Result<()> {
        let in_session = {
            let session = self.shared.session.read().await;
            session.connected || session.connecting
        };
        if in_session {
            self.shared
                .send_raw(commands::DISCONNECT.as_bytes())
                .await;
        }

        *self.shared.running.write().await = false;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        *self.shared.socket.write().await = None;
        let mut session = self.shared.session.write().await;
        session.connected = false;
        session.connecting = false;
        session.settings_sent = false;
        session.connection_deadline = None;
        session.keepalive_deadline = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestSink {
        frames: Mutex<Vec<Vec<u8>>>,
        denied: Mutex<Vec<HardwareAddress>>,
    }

    #[async_trait]
    impl FrameSink for TestSink {
        async fn send_frame(&self, frame: &[u8]) -> bool {
            self.frames.lock().unwrap().push(frame.to_vec());
            true
        }

        async fn deny(&self, address: HardwareAddress) {
            self.denied.lock().unwrap().push(address);
        }

        async fn essid(&self) -> Option<String> {
            Some("PSP_TEST".to_owned())
        }

        async fn title_id(&self) -> Option<String> {
            Some("ULES00125".to_owned())
        }
    }

    fn test_config(remote: SocketAddr) -> BridgeConfig {
        BridgeConfig {
            remote,
            local_name: "tester".to_owned(),
            app_name: "bridge-test".to_owned(),
            connection_timeout_ms: 300,
            keepalive_timeout_ms: 500,
            retry_backoff_ms: 100,
            poll_interval_ms: 10,
        }
    }

    async fn recv_text(server: &UdpSocket) -> (String, SocketAddr) {
        let mut buffer = [0u8; 2048];
        let (size, addr) = timeout(Duration::from_secs(2), server.recv_from(&mut buffer))
            .await
            .expect("no datagram within two seconds")
            .unwrap();
        (String::from_utf8_lossy(&buffer[..size]).into_owned(), addr)
    }

    async fn connected_pair() -> (UdpSocket, BridgeConnection, Arc<TestSink>, SocketAddr) {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = Arc::new(TestSink::default());
        let mut connection =
            BridgeConnection::new(test_config(server.local_addr().unwrap()), sink.clone());

        connection.open().await.unwrap();
        connection.connect().await.unwrap();
        let (handshake, addr) = recv_text(&server).await;
        assert_eq!(handshake, "connect;tester;bridge-test;");

        connection.start().await;
        server.send_to(b"connected;tester", addr).await.unwrap();

        // Drain the settings burst.
        let mut burst = Vec::new();
        for _ in 0..3 {
            burst.push(recv_text(&server).await.0);
        }
        assert_eq!(
            burst,
            vec![
                "setting;ddsonly;true;".to_owned(),
                "info;titleid;ULES00125;".to_owned(),
                "info;essid;PSP_TEST;".to_owned(),
            ]
        );

        assert!(connection.is_connected().await);
        (server, connection, sink, addr)
    }

    #[tokio::test]
    async fn test_handshake_and_settings_burst() {
        let (_server, mut connection, _sink, _addr) = connected_pair().await;
        connection.close().await.unwrap();
        assert!(!connection.is_connected().await);
    }

    #[tokio::test]
    async fn test_keepalive_echo() {
        let (server, mut connection, _sink, addr) = connected_pair().await;

        server.send_to(b"keepalive;", addr).await.unwrap();
        let (echo, _) = recv_text(&server).await;
        assert_eq!(echo, "keepalive;");

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_data_command_reaches_sink() {
        let (server, mut connection, sink, addr) = connected_pair().await;

        let source = HardwareAddress::parse("00:1f:32:4a:5b:6c").unwrap();
        let mut frame = Vec::new();
        frame.extend_from_slice(&HardwareAddress::BROADCAST.to_bytes());
        frame.extend_from_slice(&source.to_bytes());
        frame.extend_from_slice(&[0x88, 0xc8, 0x01, 0x02, 0x03]);

        let mut datagram = b"e;e;".to_vec();
        datagram.extend_from_slice(&frame);
        server.send_to(&datagram, addr).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.frames.lock().unwrap().as_slice(), &[frame]);
        assert_eq!(sink.denied.lock().unwrap().as_slice(), &[source]);

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_peer_essid_switch() {
        let (server, mut connection, _sink, addr) = connected_pair().await;

        server
            .send_to(b"e;d;setessid;PSP_AULES00125_NEW;", addr)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            connection.peer_essid().await,
            Some("PSP_AULES00125_NEW".to_owned())
        );

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_confirmation_tolerates_trailing_separator() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = Arc::new(TestSink::default());
        let mut connection =
            BridgeConnection::new(test_config(server.local_addr().unwrap()), sink);

        connection.open().await.unwrap();
        connection.connect().await.unwrap();
        let (_, addr) = recv_text(&server).await;
        connection.start().await;

        server.send_to(b"connected;tester;", addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(connection.is_connected().await);

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_teardown_requires_matching_name() {
        let (server, mut connection, _sink, addr) = connected_pair().await;

        // A teardown naming someone else is ignored.
        server
            .send_to(b"disconnected;someone-else", addr)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(connection.is_connected().await);

        server.send_to(b"disconnected;tester", addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!connection.is_connected().await);

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_timeout_triggers_fresh_connect() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = Arc::new(TestSink::default());
        let mut connection =
            BridgeConnection::new(test_config(server.local_addr().unwrap()), sink);

        connection.open().await.unwrap();
        connection.connect().await.unwrap();
        connection.start().await;

        // The server never confirms; the attempt times out and a fresh
        // connect is issued after the backoff.
        let (first, _) = recv_text(&server).await;
        assert_eq!(first, "connect;tester;bridge-test;");
        let (second, _) = recv_text(&server).await;
        assert_eq!(second, "connect;tester;bridge-test;");
        assert!(!connection.is_connected().await);

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_keepalive_timeout_forces_reconnect() {
        let (server, mut connection, _sink, _addr) = connected_pair().await;

        // No traffic for longer than the keep-alive timeout.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(!connection.is_connected().await);

        // The poll task reconnects on its own.
        let (retry, _) = recv_text(&server).await;
        assert_eq!(retry, "connect;tester;bridge-test;");

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_sends_are_gated_until_connected() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = Arc::new(TestSink::default());
        let connection =
            BridgeConnection::new(test_config(server.local_addr().unwrap()), sink);

        // No socket yet.
        assert!(!connection.send_frame(&[0x01, 0x02]).await);

        connection.open().await.unwrap();

        // Open but not confirmed: data and arbitrary commands are rejected,
        // only connect/disconnect may pass.
        assert!(!connection.send_frame(&[0x01, 0x02]).await);
        assert!(!connection.send_command("keepalive;").await);
        assert!(connection.send_command("disconnect;").await);
    }

    #[tokio::test]
    async fn test_frames_are_wrapped_as_data_commands() {
        let (server, mut connection, _sink, _addr) = connected_pair().await;

        assert!(connection.send_frame(&[0xde, 0xad]).await);

        let mut buffer = [0u8; 64];
        let (size, _) = timeout(Duration::from_secs(2), server.recv_from(&mut buffer))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buffer[..size], b"e;e;\xde\xad");

        connection.close().await.unwrap();
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config = BridgeConfig::default();
        assert_eq!(config.remote.port(), 34523);
        assert_eq!(config.connection_timeout(), Duration::from_millis(2_000));

        let json = config.to_json().unwrap();
        let parsed = BridgeConfig::from_json(&json).unwrap();
        assert_eq!(parsed.remote, config.remote);
        assert_eq!(parsed.local_name, config.local_name);

        // Missing fields fall back to defaults.
        let partial = BridgeConfig::from_json("{\"local_name\":\"psp\"}").unwrap();
        assert_eq!(partial.local_name, "psp");
        assert_eq!(partial.remote, config.remote);
    }
}
