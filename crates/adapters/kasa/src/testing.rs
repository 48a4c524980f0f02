//! Loopback stand-ins for Kasa plugs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};

use crate::protocol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Rejecting,
    Silent,
    OneShot,
}

/// TCP plug speaking the framed protocol on 127.0.0.1.
pub struct FakePlug {
    port: u16,
    connections: Arc<AtomicUsize>,
    relay: Arc<AtomicBool>,
}

impl FakePlug {
    pub async fn start() -> Self {
        Self::spawn(Mode::Normal).await
    }

    /// Plug answering every relay command with a non-zero `err_code`.
    pub async fn start_rejecting() -> Self {
        Self::spawn(Mode::Rejecting).await
    }

    /// Plug that accepts connections and reads requests but never answers.
    pub async fn start_silent() -> Self {
        Self::spawn(Mode::Silent).await
    }

    /// Plug that closes the connection after every answer, like most
    /// firmware does.
    pub async fn start_closing() -> Self {
        Self::spawn(Mode::OneShot).await
    }

    /// A loopback port with nothing listening on it.
    pub async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn is_on(&self) -> bool {
        self.relay.load(Ordering::SeqCst)
    }

    async fn spawn(mode: Mode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let relay = Arc::new(AtomicBool::new(false));

        let accepted = Arc::clone(&connections);
        let shared_relay = Arc::clone(&relay);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(stream, mode, Arc::clone(&shared_relay)));
            }
        });

        Self {
            port,
            connections,
            relay,
        }
    }
}

async fn serve(mut stream: TcpStream, mode: Mode, relay: Arc<AtomicBool>) {
    loop {
        let mut header = [0_u8; 4];
        if stream.read_exact(&mut header).await.is_err() {
            return;
        }
        let mut body = vec![0_u8; u32::from_be_bytes(header) as usize];
        if stream.read_exact(&mut body).await.is_err() {
            return;
        }
        if mode == Mode::Silent {
            continue;
        }

        let request: Value = serde_json::from_slice(&protocol::decrypt(&body)).unwrap();
        let answer = respond(&request, mode, &relay);
        let framed = protocol::frame(&answer.to_string()).unwrap();
        if stream.write_all(&framed).await.is_err() || mode == Mode::OneShot {
            return;
        }
    }
}

fn respond(request: &Value, mode: Mode, relay: &AtomicBool) -> Value {
    if let Some(state) = request
        .pointer("/system/set_relay_state/state")
        .and_then(Value::as_u64)
    {
        if mode == Mode::Rejecting {
            return json!({"system": {"set_relay_state": {"err_code": -3, "err_msg": "busy"}}});
        }
        relay.store(state != 0, Ordering::SeqCst);
        return json!({"system": {"set_relay_state": {"err_code": 0}}});
    }
    sysinfo(relay.load(Ordering::SeqCst))
}

pub fn sysinfo(is_on: bool) -> Value {
    json!({"system": {"get_sysinfo": {
        "alias": "Fake plug",
        "model": "HS100(US)",
        "mac": "50:C7:BF:00:11:22",
        "relay_state": u8::from(is_on),
        "err_code": 0
    }}})
}

/// UDP responder answering discovery probes on 127.0.0.1.
pub struct FakeResponder {
    port: u16,
}

impl FakeResponder {
    /// Answers each probe with an encrypted `get_sysinfo` response.
    pub async fn answering() -> Self {
        Self::spawn(Some(protocol::encrypt(sysinfo(true).to_string().as_bytes()))).await
    }

    /// Answers each probe with bytes that do not decrypt to JSON.
    pub async fn garbling() -> Self {
        Self::spawn(Some(b"not a kasa answer".to_vec())).await
    }

    /// Receives probes without answering.
    pub async fn silent() -> Self {
        Self::spawn(None).await
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn spawn(reply: Option<Vec<u8>>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0_u8; 1024];
            while let Ok((len, from)) = socket.recv_from(&mut buf).await {
                assert_eq!(protocol::decrypt(&buf[..len]), protocol::GET_SYSINFO.as_bytes());
                if let Some(reply) = &reply {
                    let _ = socket.send_to(reply, from).await;
                }
            }
        });
        Self { port }
    }
}
