// Shared test doubles for the probing pipeline.
//
// A fixed DNS table, scripted strategies whose behavior is chosen per test,
// and local TCP endpoints, so no test touches the public network.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};

use stack_compare::dns::HostResolver;
use stack_compare::strategy::{Handshake, ProbeStrategy, StrategyRegistry};
use stack_compare::ProbeError;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Resolver answering from a fixed table; unknown names fail like NXDOMAIN.
#[derive(Default)]
pub struct StaticResolver {
    table: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, ip: IpAddr) -> Self {
        self.table.entry(host.to_string()).or_default().push(ip);
        self
    }

    /// A name that resolves to an empty address list.
    pub fn with_empty(mut self, host: &str) -> Self {
        self.table.insert(host.to_string(), Vec::new());
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, String> {
        self.table
            .get(host)
            .cloned()
            .ok_or_else(|| format!("no record found for {host}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Succeed,
    FailHandshake,
    FailRequest,
    Panic,
}

/// Strategy that never speaks TLS; it follows its script and counts calls.
pub struct ScriptedStrategy {
    name: String,
    script: Script,
    delay: Duration,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
}

impl ScriptedStrategy {
    pub fn new(name: &str, script: Script) -> Arc<Self> {
        Self::delayed(name, script, Duration::ZERO)
    }

    /// Sleeps `delay` inside the handshake before following the script.
    pub fn delayed(name: &str, script: Script, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            delay,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handshake(
        &self,
        conn: TcpStream,
        server_name: &str,
    ) -> Result<Handshake, ProbeError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);

        match self.script {
            Script::Panic => panic!("scripted panic for {server_name}"),
            Script::FailHandshake => Err(ProbeError::handshake(format!(
                "{}: remote error: handshake failure",
                self.name
            ))),
            Script::Succeed | Script::FailRequest => Ok(Handshake {
                stream: Box::new(conn),
                protocol: Some("http/1.1".to_string()),
            }),
        }
    }

    async fn issue_probe_request(
        &self,
        _session: Handshake,
        _server_name: &str,
    ) -> Result<(), ProbeError> {
        match self.script {
            Script::FailRequest => Err(ProbeError::request("connection reset by peer")),
            _ => Ok(()),
        }
    }
}

pub fn registry_of(strategies: &[Arc<ScriptedStrategy>]) -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    for strategy in strategies {
        registry
            .register(strategy.clone())
            .expect("unique test strategy names");
    }
    registry
}

/// Listener on 127.0.0.1 that accepts and immediately drops connections.
pub async fn accepting_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    port
}

/// Listener that accepts one connection and then closes, so every later
/// dial to the port is refused.
pub async fn single_accept_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            drop(listener);
            drop(stream);
        }
    });
    port
}

/// A local port with nothing listening on it.
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn local_addr(port: u16) -> SocketAddr {
    SocketAddr::new(LOCALHOST, port)
}
