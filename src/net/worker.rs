// Background workers
//
// The UI thread never blocks on the network. A control worker performs
// orchestration API calls on request, and a feed worker holds the
// WebSocket for the active attack. Both report back over one mpsc
// channel that the UI drains at the start of each tick.

use crate::net::api::{ApiClient, AttackLaunch, AttackRequest, SpoofRequest, TargetInfo, VmStatus};
use crate::net::feed::{self, FeedError, FeedMessage};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::Message;

/// Read timeout on the feed socket, bounds how long shutdown takes
const FEED_READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Keep-alive ping interval on an otherwise quiet feed
const FEED_PING_INTERVAL: Duration = Duration::from_secs(20);

/// Number of addresses requested when spoofing is enabled
pub const SPOOFED_IP_COUNT: u32 = 10;

/// Requests for the control worker
#[derive(Debug, Clone)]
pub enum Command {
    CheckHealth,
    RefreshTopology,
    Launch(AttackRequest),
    Stop(String),
    /// Fetch the spoofing ranges and generate addresses from the first one
    PrepareSpoofing,
    Shutdown,
}

/// Something that happened on the feed of one attack
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Opened,
    Message(FeedMessage),
    Error(String),
    Closed,
}

/// Results reported back to the UI thread
#[derive(Debug, Clone)]
pub enum Update {
    Health(bool),
    RedTeam(Vec<VmStatus>),
    BlueTeam(Vec<TargetInfo>),
    TopologyFailed(String),
    Launched(AttackLaunch),
    LaunchFailed(String),
    StopRequested(String),
    StopFailed(String),
    SpoofingReady { range: String, ips: Vec<String> },
    SpoofingFailed(String),
    Feed { attack_id: String, event: FeedEvent },
}

/// Thread that serializes orchestration API calls
pub struct ControlWorker {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl ControlWorker {
    /// Start the worker; results are sent on `updates`
    pub fn spawn(client: ApiClient, updates: Sender<Update>) -> Self {
        let (commands, inbox) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("strikemap-control".to_string())
            .spawn(move || run_control(client, inbox, updates))
            .map_err(|e| tracing::error!(error = %e, "Failed to spawn control worker"))
            .ok();

        Self { commands, handle }
    }

    /// Queue a command; returns false once the worker has exited
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Ask the worker to exit and wait for it
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ControlWorker {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

fn run_control(client: ApiClient, inbox: Receiver<Command>, updates: Sender<Update>) {
    tracing::info!(api = client.base_url(), "Control worker started");

    for command in inbox {
        let update = match command {
            Command::Shutdown => break,
            Command::CheckHealth => {
                let healthy = client.health().unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Health check failed");
                    false
                });
                vec![Update::Health(healthy)]
            }
            Command::RefreshTopology => refresh_topology(&client),
            Command::Launch(request) => {
                tracing::info!(
                    attack_type = request.attack_type.tag(),
                    sources = request.source_vms.len(),
                    target = %request.target_id,
                    "Launching attack"
                );
                match client.execute(&request) {
                    Ok(launch) => vec![Update::Launched(launch)],
                    Err(e) => {
                        tracing::warn!(error = %e, "Launch failed");
                        vec![Update::LaunchFailed(e.to_string())]
                    }
                }
            }
            Command::Stop(attack_id) => match client.stop(&attack_id) {
                Ok(()) => {
                    tracing::info!(attack_id = %attack_id, "Stop requested");
                    vec![Update::StopRequested(attack_id)]
                }
                Err(e) => {
                    tracing::warn!(attack_id = %attack_id, error = %e, "Stop failed");
                    vec![Update::StopFailed(e.to_string())]
                }
            },
            Command::PrepareSpoofing => vec![prepare_spoofing(&client)],
        };

        for u in update {
            if updates.send(u).is_err() {
                // UI is gone
                return;
            }
        }
    }

    tracing::info!("Control worker stopped");
}

fn refresh_topology(client: &ApiClient) -> Vec<Update> {
    let mut updates = Vec::new();
    match client.red_team() {
        Ok(vms) => updates.push(Update::RedTeam(vms)),
        Err(e) => updates.push(Update::TopologyFailed(e.to_string())),
    }
    match client.blue_team() {
        Ok(targets) => updates.push(Update::BlueTeam(targets)),
        Err(e) => updates.push(Update::TopologyFailed(e.to_string())),
    }
    updates
}

fn prepare_spoofing(client: &ApiClient) -> Update {
    let ranges = match client.spoofing_ranges() {
        Ok(ranges) => ranges,
        Err(e) => return Update::SpoofingFailed(e.to_string()),
    };
    let Some(range) = ranges.into_iter().next() else {
        return Update::SpoofingFailed("no spoofing ranges offered".to_string());
    };

    let request = SpoofRequest {
        ip_range: Some(range.range.clone()),
        count: SPOOFED_IP_COUNT,
        starting_ip: None,
        use_sequential: false,
    };
    match client.generate_spoofed_ips(&request) {
        Ok(response) => Update::SpoofingReady {
            range: range.range,
            ips: response.spoofed_ips,
        },
        Err(e) => Update::SpoofingFailed(e.to_string()),
    }
}

/// Thread holding the live feed of one attack
///
/// Dropping or stopping the worker raises its shutdown flag; the thread
/// notices within one read timeout and closes the socket.
pub struct FeedWorker {
    attack_id: String,
    shutdown: Arc<AtomicBool>,
}

impl FeedWorker {
    /// Connect to `url` after `connect_delay` and stream events for `attack_id`
    pub fn spawn(
        attack_id: String,
        url: String,
        connect_delay: Duration,
        updates: Sender<Update>,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let id = attack_id.clone();

        let spawned = thread::Builder::new()
            .name("strikemap-feed".to_string())
            .spawn(move || {
                thread::sleep(connect_delay);
                if !flag.load(Ordering::Relaxed) {
                    run_feed(&id, &url, &flag, &updates);
                }
            });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to spawn feed worker");
        }

        Self { attack_id, shutdown }
    }

    pub fn attack_id(&self) -> &str {
        &self.attack_id
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for FeedWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_feed(attack_id: &str, url: &str, shutdown: &AtomicBool, updates: &Sender<Update>) {
    let send = |event: FeedEvent| {
        let _ = updates.send(Update::Feed {
            attack_id: attack_id.to_string(),
            event,
        });
    };

    let mut socket = match tungstenite::connect(url) {
        Ok((socket, _response)) => socket,
        Err(source) => {
            let err = FeedError::Connect {
                url: url.to_string(),
                source,
            };
            tracing::warn!(error = %err, "Feed connect failed");
            send(FeedEvent::Error(err.to_string()));
            send(FeedEvent::Closed);
            return;
        }
    };

    if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
        if let Err(e) = stream.set_read_timeout(Some(FEED_READ_TIMEOUT)) {
            tracing::warn!(error = %e, "Could not set feed read timeout");
        }
    }

    tracing::info!(attack_id, "Feed connected");
    send(FeedEvent::Opened);

    let mut last_ping = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        match socket.read() {
            Ok(Message::Text(text)) => {
                if text == "pong" {
                    continue;
                }
                match feed::parse(&text) {
                    Ok(message) => send(FeedEvent::Message(message)),
                    Err(e) => tracing::warn!(error = %e, "Skipping feed message"),
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                if last_ping.elapsed() >= FEED_PING_INTERVAL {
                    last_ping = Instant::now();
                    if let Err(e) = socket.send(Message::Text("ping".into())) {
                        tracing::debug!(error = %e, "Feed ping failed");
                    }
                }
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(e) => {
                let err = FeedError::Read(e);
                tracing::warn!(error = %err, "Feed read failed");
                send(FeedEvent::Error(err.to_string()));
                break;
            }
        }
    }

    let _ = socket.close(None);
    tracing::info!(attack_id, "Feed closed");
    send(FeedEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    const UNREACHABLE: &str = "http://127.0.0.1:1";

    /// Local WebSocket server that sends `frames`, then closes unless
    /// `hold_open`, in which case it waits for the client to hang up
    fn serve(frames: Vec<&'static str>, hold_open: bool) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            for frame in frames {
                ws.send(Message::Text(frame.into())).unwrap();
            }
            if !hold_open {
                let _ = ws.close(None);
            }
            // Run until the close handshake (or the socket) is done
            while ws.read().is_ok() {}
        });
        (url, handle)
    }

    /// Feed events until the worker reports Closed
    fn collect_feed(rx: &Receiver<Update>) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        while let Ok(update) = rx.recv_timeout(Duration::from_secs(5)) {
            if let Update::Feed { attack_id, event } = update {
                assert_eq!(attack_id, "a3");
                let closed = event == FeedEvent::Closed;
                events.push(event);
                if closed {
                    break;
                }
            }
        }
        events
    }

    #[test]
    fn test_health_is_false_when_unreachable() {
        let (tx, rx) = mpsc::channel();
        let client = ApiClient::new(UNREACHABLE).unwrap();
        let mut worker = ControlWorker::spawn(client, tx);

        assert!(worker.send(Command::CheckHealth));
        let update = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        assert!(matches!(update, Update::Health(false)));

        worker.shutdown();
        assert!(!worker.send(Command::CheckHealth));
    }

    #[test]
    fn test_launch_failure_is_reported() {
        let (tx, rx) = mpsc::channel();
        let client = ApiClient::new(UNREACHABLE).unwrap();
        let mut worker = ControlWorker::spawn(client, tx);

        worker.send(Command::Launch(AttackRequest {
            attack_type: crate::model::AttackType::UdpFlood,
            source_vms: vec!["generator".to_string()],
            target_id: "team1".to_string(),
            target_port: 9080,
            duration: 10,
            workers: 1,
            sockets: 1,
            enable_ip_spoofing: false,
            spoofed_ips: None,
        }));
        let update = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        assert!(matches!(update, Update::LaunchFailed(_)));
        worker.shutdown();
    }

    #[test]
    fn test_feed_connect_failure_closes() {
        let (tx, rx) = mpsc::channel();
        let _feed = FeedWorker::spawn(
            "a1".to_string(),
            crate::net::api::feed_url(UNREACHABLE, "a1"),
            Duration::ZERO,
            tx,
        );

        let first = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        assert!(matches!(
            first,
            Update::Feed { ref attack_id, event: FeedEvent::Error(_) } if attack_id == "a1"
        ));
        assert!(matches!(second, Update::Feed { event: FeedEvent::Closed, .. }));
    }

    #[test]
    fn test_stopped_feed_never_connects() {
        let (tx, rx) = mpsc::channel();
        let feed = FeedWorker::spawn(
            "a2".to_string(),
            crate::net::api::feed_url(UNREACHABLE, "a2"),
            Duration::from_millis(200),
            tx,
        );
        assert_eq!(feed.attack_id(), "a2");
        feed.stop();

        // Sender is dropped when the thread exits without sending anything
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn test_feed_forwards_messages_and_skips_noise() {
        let connected = r#"{"type":"connected","attack_id":"a3"}"#;
        let log = r#"{"type":"log","message":"✅ flood started","source":"generator"}"#;
        let complete = r#"{"type":"complete","attack_id":"a3"}"#;
        let (url, server) = serve(vec![connected, "pong", "not json", log, complete], false);

        let (tx, rx) = mpsc::channel();
        let _feed = FeedWorker::spawn("a3".to_string(), url, Duration::ZERO, tx);

        let events = collect_feed(&rx);
        assert_eq!(
            events,
            vec![
                FeedEvent::Opened,
                FeedEvent::Message(feed::parse(connected).unwrap()),
                FeedEvent::Message(feed::parse(log).unwrap()),
                FeedEvent::Message(feed::parse(complete).unwrap()),
                FeedEvent::Closed,
            ]
        );

        // Closing the feed ends the worker thread
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_stop_closes_an_idle_feed() {
        let (url, server) = serve(Vec::new(), true);

        let (tx, rx) = mpsc::channel();
        let feed = FeedWorker::spawn("a3".to_string(), url, Duration::ZERO, tx);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Ok(Update::Feed { event: FeedEvent::Opened, .. })
        ));

        let stopped_at = Instant::now();
        feed.stop();
        assert_eq!(collect_feed(&rx), vec![FeedEvent::Closed]);
        // Noticed within a read timeout or two
        assert!(stopped_at.elapsed() < FEED_READ_TIMEOUT * 4);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
        server.join().unwrap();
    }
}
