//! The connection: single point of I/O for one peer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{oneshot, watch, Notify};

use broadside_protocol::{Packet, ResponseCode};
use broadside_transport::{LineReader, LineWriter};

use crate::{
    CommandRegistry, ConnectionState, EngineError, PacketObserver, Role,
    QUIT_VERB,
};

/// A received response, as delivered to an outstanding wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The numeric code.
    pub code: ResponseCode,
    /// The message text, if any.
    pub message: Option<String>,
}

/// One protocol connection over one socket.
///
/// Constructed once per socket and shared as `Arc<Connection>` with the
/// orchestrator and every command handler; none of them closes it
/// directly — only the completion path does, exactly once.
///
/// Synchronization points (see the crate docs):
/// - `writer` — tokio mutex; one serialized line on the wire per lock.
/// - `pending` — the single outstanding-wait slot. Never a queue.
/// - `state_tx` / `closed_tx` — watch channels; a notification fires on
///   every real change and never on a same-value set.
pub struct Connection {
    role: Role,
    registry: CommandRegistry,
    // Handle back to our own Arc, for the receive-loop task and for
    // handing handlers a shareable connection reference.
    self_ref: Weak<Self>,
    writer: tokio::sync::Mutex<LineWriter>,
    // Taken exactly once by begin_listening.
    reader: Mutex<Option<LineReader>>,
    pending: Mutex<Option<oneshot::Sender<Reply>>>,
    observers: RwLock<Vec<Arc<dyn PacketObserver>>>,
    state_tx: watch::Sender<ConnectionState>,
    closed_tx: watch::Sender<bool>,
    close_requested: Notify,
    completed: AtomicBool,
}

impl Connection {
    /// Wraps a framed stream in a connection, starting in
    /// [`ConnectionState::Handshake`].
    pub fn open(
        role: Role,
        registry: CommandRegistry,
        reader: LineReader,
        writer: LineWriter,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Handshake);
        let (closed_tx, _) = watch::channel(false);
        Arc::new_cyclic(|self_ref| Self {
            role,
            registry,
            self_ref: self_ref.clone(),
            writer: tokio::sync::Mutex::new(writer),
            reader: Mutex::new(Some(reader)),
            pending: Mutex::new(None),
            observers: RwLock::new(Vec::new()),
            state_tx,
            closed_tx,
            close_requested: Notify::new(),
            completed: AtomicBool::new(false),
        })
    }

    /// Our own Arc. Infallible while any caller holds a reference.
    fn shared(&self) -> Arc<Self> {
        self.self_ref
            .upgrade()
            .expect("connection is referenced by the caller")
    }

    /// This peer's side of the connection.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The dispatch table installed at construction.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// A watch on the lifecycle state. Notified on every change, never
    /// on a no-op set.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// True once the connection has completed.
    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    /// Registers a passive observer. Observers are invoked synchronously
    /// from the receive loop and must not block.
    pub fn add_observer(&self, observer: Arc<dyn PacketObserver>) {
        self.observers.write().push(observer);
    }

    /// Transitions the lifecycle state.
    ///
    /// Setting the current state again is a silent no-op (no
    /// notification fires). Any other transition outside the legal table
    /// is a usage fault.
    pub fn set_state(&self, next: ConnectionState) -> Result<(), EngineError> {
        let mut result = Ok(());
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if !current.can_transition_to(next) {
                result = Err(EngineError::IllegalTransition {
                    from: *current,
                    to: next,
                });
                return false;
            }
            tracing::debug!(role = %self.role, from = %current, to = %next, "state transition");
            *current = next;
            true
        });
        result
    }

    /// Starts the background receive loop. Callable once.
    pub fn begin_listening(&self) -> Result<(), EngineError> {
        let reader = self
            .reader
            .lock()
            .take()
            .ok_or(EngineError::AlreadyListening)?;
        let conn = self.shared();
        tokio::spawn(async move {
            conn.receive_loop(reader).await;
        });
        Ok(())
    }

    /// Serializes and sends one command line.
    pub async fn send_command(
        &self,
        verb: &str,
        argument: Option<&str>,
    ) -> Result<(), EngineError> {
        let packet = Packet::command(verb, argument)?;
        self.send_packet(&packet).await
    }

    /// Serializes and sends one response line.
    pub async fn send_response(
        &self,
        code: ResponseCode,
        message: Option<&str>,
    ) -> Result<(), EngineError> {
        let packet = Packet::response(code, message)?;
        self.send_packet(&packet).await
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), EngineError> {
        if self.is_closed() {
            return Err(EngineError::ConnectionClosed);
        }
        let line = packet.to_string();
        // Single exclusion point for the write path: concurrent senders
        // serialize here, one whole line each.
        let mut writer = self.writer.lock().await;
        tracing::trace!(role = %self.role, %line, "send");
        writer.send_line(&line).await?;
        Ok(())
    }

    /// Claims the outstanding-wait slot.
    fn register_wait(&self) -> Result<oneshot::Receiver<Reply>, EngineError> {
        if self.is_closed() {
            return Err(EngineError::ConnectionClosed);
        }
        let (tx, rx) = oneshot::channel();
        let mut slot = self.pending.lock();
        if slot.is_some() {
            return Err(EngineError::WaitAlreadyPending);
        }
        *slot = Some(tx);
        Ok(rx)
    }

    /// Suspends the caller until the next response arrives, the timeout
    /// elapses, or the connection completes.
    ///
    /// At most one wait may be outstanding; a second concurrent call
    /// fails immediately with [`EngineError::WaitAlreadyPending`]
    /// without disturbing the first. The slot is released on delivery,
    /// timeout, cancellation, and completion alike.
    pub async fn expect_response(
        &self,
        timeout: Duration,
    ) -> Result<Reply, EngineError> {
        let rx = self.register_wait()?;
        // From here on we own the slot; the guard frees it even if this
        // future is dropped mid-wait.
        let _slot_guard = SlotGuard { conn: self };
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            // The loop dropped the sender: connection completed.
            Ok(Err(_)) => Err(EngineError::ConnectionClosed),
            Err(_) => Err(EngineError::Timeout(timeout)),
        }
    }

    /// Sends a command and waits for the reply it provokes.
    ///
    /// The wait slot is claimed before the command hits the wire, so a
    /// fast reply cannot slip past the correlation.
    pub async fn call(
        &self,
        verb: &str,
        argument: Option<&str>,
        timeout: Duration,
    ) -> Result<Reply, EngineError> {
        let packet = Packet::command(verb, argument)?;
        let rx = self.register_wait()?;
        let _slot_guard = SlotGuard { conn: self };
        self.send_packet(&packet).await?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(EngineError::ConnectionClosed),
            Err(_) => Err(EngineError::Timeout(timeout)),
        }
    }

    /// [`expect_response`](Self::expect_response), insisting on a code.
    ///
    /// Used for strict-sequence exchanges like the version greeting. A
    /// response with any other code is a sequence fault.
    pub async fn ensure_response(
        &self,
        expected: ResponseCode,
        timeout: Duration,
    ) -> Result<Reply, EngineError> {
        let reply = self.expect_response(timeout).await?;
        if reply.code != expected {
            return Err(EngineError::UnexpectedResponse {
                expected,
                actual: reply.code,
                message: reply.message,
            });
        }
        Ok(reply)
    }

    /// Asks the receive loop to stop, which completes the connection.
    /// Safe to call at any time; completion still fires exactly once.
    pub fn request_close(&self) {
        self.close_requested.notify_one();
    }

    /// Suspends until the connection completes.
    pub async fn wait_closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    async fn wait_closed_within(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_closed())
            .await
            .is_ok()
    }

    /// Runs the disconnect handshake for this peer's role.
    ///
    /// - Guest: sends QUIT, then waits up to `timeout` for the peer to
    ///   acknowledge and close; if the bound elapses first, closes
    ///   locally by force.
    /// - Host: sends the `220` closing response and closes immediately,
    ///   without waiting for any acknowledgment. The host owns the
    ///   authoritative closing signal; the asymmetry is deliberate.
    ///
    /// Calling this again after the connection has disconnected is a
    /// usage fault.
    pub async fn disconnect(&self, timeout: Duration) -> Result<(), EngineError> {
        if self.state() == ConnectionState::Disconnected {
            return Err(EngineError::AlreadyDisconnected);
        }
        match self.role {
            Role::Guest => {
                match self.call(QUIT_VERB, None, timeout).await {
                    // Acknowledged (or some last reply): wait for the
                    // transport to go down, forcing if it doesn't.
                    Ok(_) => {
                        if !self.wait_closed_within(timeout).await {
                            tracing::warn!("peer acknowledged QUIT but did not close; forcing");
                            self.request_close();
                            self.wait_closed().await;
                        }
                    }
                    // Loop completed before any reply: done.
                    Err(EngineError::ConnectionClosed) => {}
                    Err(EngineError::Timeout(_)) => {
                        tracing::warn!("no QUIT acknowledgment within {timeout:?}; forcing close");
                        self.request_close();
                        self.wait_closed().await;
                    }
                    // Another wait is in flight: caller bug, connection
                    // left alone.
                    Err(e @ EngineError::WaitAlreadyPending) => return Err(e),
                    // Transport-level failure: the connection is done
                    // for either way.
                    Err(e) => {
                        self.request_close();
                        self.wait_closed().await;
                        return Err(e);
                    }
                }
                Ok(())
            }
            Role::Host => {
                let sent = self
                    .send_response(
                        ResponseCode::ConnectionClosed,
                        Some("closing connection"),
                    )
                    .await;
                self.request_close();
                self.wait_closed().await;
                sent
            }
        }
    }

    // -----------------------------------------------------------------
    // Receive loop
    // -----------------------------------------------------------------

    async fn receive_loop(self: Arc<Self>, mut reader: LineReader) {
        loop {
            let line = tokio::select! {
                _ = self.close_requested.notified() => break,
                next = reader.next_line() => match next {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        tracing::debug!(role = %self.role, "peer closed the connection");
                        break;
                    }
                    Err(e) => {
                        let fault = EngineError::Transport(e);
                        tracing::debug!(role = %self.role, error = %fault, "receive failed");
                        self.notify_fault(&fault);
                        break;
                    }
                },
            };

            let packet = match Packet::parse(&line) {
                Ok(packet) => packet,
                Err(e) => {
                    let detail = e.to_string();
                    self.notify_fault(&EngineError::Protocol(e));
                    // Recoverable: tell the peer and keep reading. The
                    // send may fail if they are already gone.
                    let _ = self
                        .send_response(ResponseCode::SyntaxError, Some(&detail))
                        .await;
                    continue;
                }
            };

            self.notify_packet(&packet);

            match packet {
                Packet::Response { code, message } => {
                    self.deliver_reply(Reply { code, message });
                }
                Packet::Command { verb, argument } => {
                    self.dispatch(&verb, argument.as_deref()).await;
                }
            }
        }
        self.complete().await;
    }

    /// Hands a received response to the outstanding wait, if any. A
    /// response nobody is waiting for is a sequence fault reported to
    /// observers; the loop carries on.
    fn deliver_reply(&self, reply: Reply) {
        let waiter = self.pending.lock().take();
        match waiter {
            Some(tx) => {
                // The waiter may have been cancelled between delivery
                // and here; the reply is then as unsolicited as any.
                if let Err(reply) = tx.send(reply) {
                    self.notify_fault(&EngineError::UnsolicitedResponse {
                        code: reply.code,
                    });
                }
            }
            None => {
                self.notify_fault(&EngineError::UnsolicitedResponse {
                    code: reply.code,
                });
            }
        }
    }

    /// Dispatches one received command. Exactly one handler invocation
    /// per line; handler faults become error responses, never panics.
    async fn dispatch(&self, verb: &str, argument: Option<&str>) {
        let Some(handler) = self.registry.get(verb) else {
            self.notify_fault(&EngineError::UnknownCommand(verb.to_string()));
            let _ = self
                .send_response(
                    ResponseCode::SyntaxError,
                    Some(&format!("unknown command {verb}")),
                )
                .await;
            return;
        };
        if let Err(fault) = handler.handle(argument, &self.shared()).await {
            tracing::debug!(role = %self.role, %verb, %fault, "command rejected");
            let _ = self
                .send_response(fault.code, Some(&fault.message))
                .await;
        }
    }

    /// Tears the connection down. Runs exactly once regardless of what
    /// terminated the loop.
    async fn complete(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        // The terminal transition is always legal, whatever the state.
        self.state_tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                false
            } else {
                *state = ConnectionState::Disconnected;
                true
            }
        });
        // Fail the outstanding wait, if any, by dropping its sender.
        drop(self.pending.lock().take());
        {
            let mut writer = self.writer.lock().await;
            let _ = writer.shutdown().await;
        }
        for observer in self.observers.read().iter() {
            observer.on_closed();
        }
        self.closed_tx.send_replace(true);
        tracing::debug!(role = %self.role, "connection completed");
    }

    fn notify_packet(&self, packet: &Packet) {
        for observer in self.observers.read().iter() {
            observer.on_packet(packet);
        }
    }

    fn notify_fault(&self, fault: &EngineError) {
        for observer in self.observers.read().iter() {
            observer.on_fault(fault);
        }
    }
}

/// Frees the outstanding-wait slot when a wait ends for any reason.
/// Taking an already-empty slot (normal delivery) is harmless.
struct SlotGuard<'a> {
    conn: &'a Connection,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.conn.pending.lock().take();
    }
}
