//! UDP Game Server implementation.

use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use log::{debug, error, info, warn};

use glitch_shared::{ClientMessage, PlayerId, ServerMessage, PROTOCOL_VERSION};

use crate::service::GlitchService;

/// Maximum packet size
const MAX_PACKET_SIZE: usize = 1200;

/// Connection timeout in seconds
const CONNECTION_TIMEOUT: f32 = 30.0;

/// Client connection state
#[derive(Debug)]
pub struct ClientConnection {
    pub addr: SocketAddr,
    pub player_id: PlayerId,
    pub name: String,
    pub last_seen: std::time::Instant,
}

impl ClientConnection {
    pub fn new(addr: SocketAddr, player_id: PlayerId, name: String) -> Self {
        Self {
            addr,
            player_id,
            name,
            last_seen: std::time::Instant::now(),
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.last_seen.elapsed().as_secs_f32() > CONNECTION_TIMEOUT
    }
}

/// Game server
pub struct Server {
    socket: UdpSocket,
    clients: HashMap<SocketAddr, ClientConnection>,
    player_to_addr: HashMap<PlayerId, SocketAddr>,
    service: GlitchService,
}

impl Server {
    /// Create a new server listening on the given port
    pub async fn new(port: u16, service: GlitchService) -> Result<Self, std::io::Error> {
        let addr = format!("0.0.0.0:{}", port);
        let socket = UdpSocket::bind(&addr).await?;
        info!("Listening on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            clients: HashMap::new(),
            player_to_addr: HashMap::new(),
            service,
        })
    }

    pub fn service(&self) -> &GlitchService {
        &self.service
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    /// Process incoming network messages
    pub async fn process_incoming(&mut self) {
        let mut buf = [0u8; MAX_PACKET_SIZE];

        // Non-blocking receive loop
        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, addr)) => {
                    self.handle_packet(&buf[..len], addr).await;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    break;
                }
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    break;
                }
            }
        }

        // Check for timed out clients
        self.check_timeouts();
    }

    /// Handle a received packet
    async fn handle_packet(&mut self, data: &[u8], addr: SocketAddr) {
        let message = match ClientMessage::deserialize(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Failed to deserialize packet from {}: {}", addr, e);
                return;
            }
        };

        // Update last seen time for known clients
        if let Some(client) = self.clients.get_mut(&addr) {
            client.last_seen = std::time::Instant::now();
        }

        match message {
            ClientMessage::Join { protocol_version, name } => {
                self.handle_join(addr, protocol_version, name).await;
            }
            ClientMessage::Leave => {
                self.handle_leave(addr);
            }
            other => match self.clients.get(&addr) {
                Some(client) => self.service.handle(client.player_id, other),
                None => debug!("Dropping message from unknown address {}", addr),
            },
        }
    }

    /// Handle join request
    async fn handle_join(&mut self, addr: SocketAddr, protocol_version: u32, name: String) {
        if protocol_version != PROTOCOL_VERSION {
            let reason = format!(
                "Protocol version mismatch: server {}, client {}",
                PROTOCOL_VERSION, protocol_version
            );
            self.send_to(addr, &ServerMessage::JoinFailed { reason }).await;
            return;
        }

        if let Some(existing) = self.clients.get(&addr) {
            warn!("{} sent Join while already joined as {}", addr, existing.name);
            return;
        }

        match self.service.join(&name) {
            Ok(player_id) => {
                info!("{} joined from {} as player {}", name, addr, player_id);
                self.clients.insert(addr, ClientConnection::new(addr, player_id, name));
                self.player_to_addr.insert(player_id, addr);
            }
            Err(reason) => {
                self.send_to(addr, &ServerMessage::JoinFailed { reason }).await;
            }
        }
    }

    fn handle_leave(&mut self, addr: SocketAddr) {
        if let Some(connection) = self.clients.remove(&addr) {
            self.player_to_addr.remove(&connection.player_id);
            self.service.leave(connection.player_id);
            info!("{} left", connection.name);
        }
    }

    fn check_timeouts(&mut self) {
        let timed_out: Vec<SocketAddr> = self
            .clients
            .iter()
            .filter(|(_, c)| c.is_timed_out())
            .map(|(addr, _)| *addr)
            .collect();

        for addr in timed_out {
            if let Some(connection) = self.clients.remove(&addr) {
                warn!("{} timed out", connection.name);
                self.player_to_addr.remove(&connection.player_id);
                self.service.leave(connection.player_id);
            }
        }
    }

    /// Send everything the world queued since the last tick
    pub async fn process_outgoing(&mut self) {
        for (player_id, msg) in self.service.world().drain_outbox() {
            if let Some(addr) = self.player_to_addr.get(&player_id).copied() {
                self.send_to(addr, &msg).await;
            }
        }
    }

    /// Send a message to a specific address
    async fn send_to(&self, addr: SocketAddr, msg: &ServerMessage) {
        let data = match msg.serialize() {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to serialize message for {}: {}", addr, e);
                return;
            }
        };
        if let Err(e) = self.socket.send_to(&data, addr).await {
            error!("Failed to send to {}: {}", addr, e);
        }
    }

    /// Close every open session, e.g. on shutdown
    pub fn disconnect_all(&mut self) {
        for (_, connection) in self.clients.drain() {
            self.service.leave(connection.player_id);
        }
        self.player_to_addr.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use glitch_shared::{GlitchKind, GlitchToken};
    use crate::config::ServerConfig;
    use crate::glitch::GlitchFactory;
    use crate::recipes::RecipeBook;
    use crate::world::GameWorld;

    async fn server() -> Server {
        let service = GlitchService::new(
            Arc::new(GameWorld::new()),
            GlitchFactory::new(),
            RecipeBook::default(),
            ServerConfig::default(),
        );
        Server::new(0, service).await.unwrap()
    }

    async fn send(client: &UdpSocket, server: &Server, msg: ClientMessage) {
        let port = server.local_addr().unwrap().port();
        client.send_to(&msg.serialize().unwrap(), ("127.0.0.1", port)).await.unwrap();
    }

    async fn pump(server: &mut Server) {
        // Give the loopback packets time to land
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.process_incoming().await;
        server.process_outgoing().await;
    }

    async fn recv(client: &UdpSocket) -> ServerMessage {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let (len, _) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        ServerMessage::deserialize(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_join_and_use_token_over_udp() {
        let mut server = server().await;
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        send(&client, &server, ClientMessage::Join { protocol_version: PROTOCOL_VERSION, name: "Alex".into() }).await;
        pump(&mut server).await;
        let ServerMessage::Joined { player_id } = recv(&client).await else {
            panic!("expected Joined");
        };

        send(&client, &server, ClientMessage::UseToken { token: GlitchToken::for_kind(GlitchKind::Teleport) }).await;
        pump(&mut server).await;
        assert_eq!(recv(&client).await, ServerMessage::TokenConsumed { kind: GlitchKind::Teleport });
        assert!(server.service().manager().owns_kind(player_id, GlitchKind::Teleport));

        send(&client, &server, ClientMessage::Leave).await;
        pump(&mut server).await;
        assert!(!server.service().manager().is_online(player_id));
    }

    #[tokio::test]
    async fn test_protocol_mismatch_is_refused() {
        let mut server = server().await;
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        send(&client, &server, ClientMessage::Join { protocol_version: PROTOCOL_VERSION + 1, name: "Alex".into() }).await;
        pump(&mut server).await;
        assert!(matches!(recv(&client).await, ServerMessage::JoinFailed { .. }));
        assert!(server.service().manager().online_players().is_empty());
    }
}
