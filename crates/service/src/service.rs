//! The oracle node service.
//!
//! Owns the per-request signing state and drives the pipeline: discover a
//! request, fetch, filter, build the response and backup transactions, sign
//! both, aggregate partial signatures from peers and relay the finished
//! transaction. All state mutations happen under one process-wide mutex;
//! network I/O happens outside it.

use crate::builder;
use crate::chain::{ChainSnapshot, OracleChain};
use crate::filter;
use crate::protocols::ProtocolRegistry;
use crate::rpc;
use crate::{OracleError, Result, Settings};
use oracle_core::script::ScriptBuilder;
use oracle_core::{contract, Contract, OracleRequest, OracleResponse, OracleResponseCode, Transaction};
use oracle_cryptography::{ECDsa, ECPoint, KeyPair};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// How often the poller scans the chain for unserved requests.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How often the janitor re-gossips and evicts, in milliseconds.
/// The re-gossip window below is expressed in the same unit.
pub const REFRESH_INTERVAL_MS: u64 = 180_000;

/// How long finished requests stay cached for duplicate rejection.
const FINISHED_CACHE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Lifecycle status of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OracleStatus {
    /// Not started yet.
    Unstarted = 0,
    /// Poller and timer are running.
    Running = 1,
    /// Stopped, either by the operator or by the liveness check.
    Stopped = 2,
}

impl OracleStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopped,
            _ => Self::Unstarted,
        }
    }
}

/// Per-request signing state, keyed by request id in the pending queue.
struct OracleTask {
    request: OracleRequest,
    tx: Option<Transaction>,
    backup_tx: Option<Transaction>,
    signs: BTreeMap<ECPoint, Vec<u8>>,
    backup_signs: BTreeMap<ECPoint, Vec<u8>>,
    created_at: Instant,
}

impl OracleTask {
    fn new(request: OracleRequest) -> Self {
        Self {
            request,
            tx: None,
            backup_tx: None,
            signs: BTreeMap::new(),
            backup_signs: BTreeMap::new(),
            created_at: Instant::now(),
        }
    }
}

#[derive(Default)]
struct OracleState {
    pending_queue: HashMap<u64, OracleTask>,
    finished_cache: HashMap<u64, Instant>,
}

/// The oracle node service.
pub struct OracleService {
    settings: Settings,
    chain: Arc<dyn OracleChain>,
    key_pairs: Vec<KeyPair>,
    protocols: ProtocolRegistry,
    state: Mutex<OracleState>,
    status: AtomicU8,
    shutdown: broadcast::Sender<()>,
    http: reqwest::Client,
    counter: AtomicU64,
}

impl OracleService {
    /// Creates the service over a chain collaborator and the wallet's
    /// decrypted oracle key pairs.
    pub fn new(settings: Settings, chain: Arc<dyn OracleChain>, key_pairs: Vec<KeyPair>) -> Arc<Self> {
        let protocols = ProtocolRegistry::new(&settings);
        let (shutdown, _) = broadcast::channel(4);
        Arc::new(Self {
            settings,
            chain,
            key_pairs,
            protocols,
            state: Mutex::new(OracleState::default()),
            status: AtomicU8::new(OracleStatus::Unstarted as u8),
            shutdown,
            http: reqwest::Client::new(),
            counter: AtomicU64::new(0),
        })
    }

    /// The current lifecycle status.
    pub fn status(&self) -> OracleStatus {
        OracleStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    fn running(&self) -> bool {
        self.status() == OracleStatus::Running
    }

    /// A receiver resolving when the service stops.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    /// Starts the poller and timer.
    ///
    /// Fails if already running, or if the wallet holds no key designated
    /// as an oracle for the next block.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        if self.running() {
            return Err(OracleError::Status("already running".to_string()));
        }

        let snapshot = self.chain.snapshot();
        let oracles = snapshot.designated_oracles(snapshot.height() + 1);
        if !self
            .key_pairs
            .iter()
            .any(|kp| oracles.contains(&kp.public_key()))
        {
            return Err(OracleError::AccountNotFound);
        }

        self.status
            .store(OracleStatus::Running as u8, Ordering::SeqCst);

        let poller = Arc::clone(self);
        tokio::spawn(async move { poller.run_poller().await });
        let timer = Arc::clone(self);
        tokio::spawn(async move { timer.run_timer().await });

        info!("Oracle service started");
        Ok(())
    }

    /// Stops the service and cancels its loops.
    pub fn stop(&self) {
        let previous = self
            .status
            .swap(OracleStatus::Stopped as u8, Ordering::SeqCst);
        if previous == OracleStatus::Running as u8 {
            let _ = self.shutdown.send(());
            info!("Oracle service stopped");
        }
    }

    /// Liveness self-check, to be called on every persisted block: if the
    /// wallet no longer holds a key designated for the next block, the
    /// service stops itself.
    pub fn on_persist(&self) {
        if !self.running() {
            return;
        }
        let snapshot = self.chain.snapshot();
        let oracles = snapshot.designated_oracles(snapshot.height() + 1);
        if !self
            .key_pairs
            .iter()
            .any(|kp| oracles.contains(&kp.public_key()))
        {
            warn!("oracle wallet no longer holds a designated key, stopping");
            self.stop();
        }
    }

    async fn run_poller(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }
            if !self.running() {
                break;
            }
            self.process_requests().await;
        }
        debug!("request poller stopped");
    }

    async fn run_timer(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let mut ticker = tokio::time::interval(Duration::from_millis(REFRESH_INTERVAL_MS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; skip it so
        // freshly created tasks are not inspected at age zero.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }
            if !self.running() {
                break;
            }
            self.timer_pass(Instant::now());
        }
        debug!("janitor timer stopped");
    }

    /// One pass over the chain's pending requests.
    pub async fn process_requests(&self) {
        let snapshot = self.chain.snapshot();
        for (id, request) in snapshot.pending_requests() {
            if self.status() == OracleStatus::Stopped {
                return;
            }
            let already_served = {
                let state = self.state.lock();
                state.finished_cache.contains_key(&id)
                    || state
                        .pending_queue
                        .get(&id)
                        .is_some_and(|task| task.tx.is_some())
            };
            if already_served {
                continue;
            }
            self.process_request(snapshot.as_ref(), id, &request).await;
        }
    }

    async fn process_request(&self, snapshot: &dyn ChainSnapshot, id: u64, request: &OracleRequest) {
        info!("Process oracle request: {id}, url: {}", request.url);

        // Fetch and filter happen outside the service lock.
        let (fetch_code, body) = self.protocols.process(&request.url).await;
        let (code, result) = match (fetch_code, body) {
            (OracleResponseCode::Success, Some(body)) => {
                match filter::filter(&body, request.filter.as_deref()) {
                    Ok(result) => (OracleResponseCode::Success, result),
                    Err(e) => {
                        debug!("filter failed for request {id}: {e}");
                        (OracleResponseCode::Error, Vec::new())
                    }
                }
            }
            (code, _) => (code, Vec::new()),
        };

        let response = OracleResponse::new(id, code, result);
        let Some(tx) = builder::create_response_tx(snapshot, &response) else {
            warn!("failed to create response tx for request {id}");
            return;
        };
        let backup_response = OracleResponse::consensus_unreachable(id);
        let Some(backup_tx) = builder::create_response_tx(snapshot, &backup_response) else {
            warn!("failed to create backup tx for request {id}");
            return;
        };
        debug!(
            "built response tx {} and backup tx {} for request {id}",
            tx.hash(),
            backup_tx.hash()
        );

        let magic = self.chain.network_magic();
        let oracle_nodes = snapshot.designated_oracles(snapshot.height() + 1);
        for key_pair in &self.key_pairs {
            if !oracle_nodes.contains(&key_pair.public_key()) {
                continue;
            }
            let (tx_sign, backup_sign) = match (
                tx.sign(key_pair, magic),
                backup_tx.sign(key_pair, magic),
            ) {
                (Ok(tx_sign), Ok(backup_sign)) => (tx_sign, backup_sign),
                _ => {
                    warn!("failed to sign response tx for request {id}");
                    continue;
                }
            };
            match self.add_response_tx_sign(
                snapshot,
                id,
                key_pair.public_key(),
                tx_sign.to_vec(),
                Some(tx.clone()),
                Some(backup_tx.clone()),
                Some(backup_sign.to_vec()),
            ) {
                Ok(()) | Err(OracleError::AlreadyFinished) => {}
                Err(e) => warn!("failed to record own signature for request {id}: {e}"),
            }
            self.send_response_signature(id, &tx_sign, key_pair);
        }
    }

    /// Records a partial signature for a request, installing the local
    /// transactions when provided, and finalizes once either signature book
    /// reaches the oracle threshold.
    pub fn add_response_tx_sign(
        &self,
        snapshot: &dyn ChainSnapshot,
        request_id: u64,
        oracle_pub: ECPoint,
        sign: Vec<u8>,
        tx: Option<Transaction>,
        backup_tx: Option<Transaction>,
        backup_sign: Option<Vec<u8>>,
    ) -> Result<()> {
        let magic = self.chain.network_magic();
        let mut state = self.state.lock();
        if state.finished_cache.contains_key(&request_id) {
            return Err(OracleError::AlreadyFinished);
        }

        let finalized = {
            let task = match state.pending_queue.entry(request_id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let request = snapshot
                        .request(request_id)
                        .ok_or(OracleError::RequestNotFound)?;
                    entry.insert(OracleTask::new(request))
                }
            };

            if let Some(tx) = tx {
                let sign_data = tx.sign_data(magic);
                task.tx = Some(tx);
                // Signatures parked before the tx existed may belong to the
                // other book; drop whatever no longer verifies.
                task.signs.retain(|pk, s| ECDsa::verify(&sign_data, s, pk));
            }
            if let Some(backup_tx) = backup_tx {
                let sign_data = backup_tx.sign_data(magic);
                task.backup_tx = Some(backup_tx);
                task.backup_signs
                    .retain(|pk, s| ECDsa::verify(&sign_data, s, pk));
                if let Some(backup_sign) = backup_sign {
                    task.backup_signs.entry(oracle_pub).or_insert(backup_sign);
                }
            }

            match &task.tx {
                None => {
                    // Collector mode: our own transactions are not built
                    // yet, so the signature cannot be verified against
                    // either. Park it in both books; installing the real
                    // transactions prunes the wrong one.
                    task.signs.entry(oracle_pub).or_insert_with(|| sign.clone());
                    task.backup_signs.entry(oracle_pub).or_insert(sign);
                    return Ok(());
                }
                Some(tx) => {
                    if ECDsa::verify(&tx.sign_data(magic), &sign, &oracle_pub) {
                        task.signs.entry(oracle_pub).or_insert(sign);
                    } else if task.backup_tx.as_ref().is_some_and(|backup| {
                        ECDsa::verify(&backup.sign_data(magic), &sign, &oracle_pub)
                    }) {
                        task.backup_signs.entry(oracle_pub).or_insert(sign);
                    } else {
                        return Err(OracleError::InvalidTxSign);
                    }
                }
            }

            Self::finalize_candidate(snapshot, task)
        };

        if let Some(tx) = finalized {
            // Exactly-once: the id leaves the pending queue and enters the
            // finished cache in the same critical section.
            state.pending_queue.remove(&request_id);
            state.finished_cache.insert(request_id, Instant::now());
            drop(state);
            info!("Send response tx: {}", tx.hash());
            self.chain.relay(tx);
        }
        Ok(())
    }

    /// Checks both signature books against the threshold and, if one is
    /// saturated, returns the transaction with its multisig witness filled.
    fn finalize_candidate(snapshot: &dyn ChainSnapshot, task: &OracleTask) -> Option<Transaction> {
        let oracle_nodes = snapshot.designated_oracles(snapshot.height() + 1);
        if oracle_nodes.is_empty() {
            return None;
        }
        let m = contract::oracle_threshold(oracle_nodes.len());
        let multisig = Contract::create_multi_sig_contract(m, &oracle_nodes).ok()?;

        let complete = |tx: &Option<Transaction>, signs: &BTreeMap<ECPoint, Vec<u8>>| {
            let tx = tx.as_ref()?;
            if signs.len() < m {
                return None;
            }
            // Exactly m signatures, ascending key order, as the multisig
            // verification script consumes them.
            let mut invocation = ScriptBuilder::new();
            for sign in signs.values().take(m) {
                invocation.emit_push_bytes(sign);
            }
            let index = tx
                .script_hashes_for_verifying()
                .iter()
                .position(|hash| *hash == multisig.script_hash())?;
            let mut tx = tx.clone();
            tx.witnesses[index].invocation_script = invocation.to_bytes();
            Some(tx)
        };

        complete(&task.tx, &task.signs).or_else(|| complete(&task.backup_tx, &task.backup_signs))
    }

    /// Handles a `submitoracleresponse` call from a peer oracle.
    pub fn submit_oracle_response(
        &self,
        oracle_pub: &ECPoint,
        request_id: u64,
        tx_sign: &[u8],
        msg_sign: &[u8],
    ) -> Result<()> {
        let message = signature_message(oracle_pub, request_id, tx_sign);
        if !ECDsa::verify(&message, msg_sign, oracle_pub) {
            return Err(OracleError::InvalidSign);
        }
        if self.state.lock().finished_cache.contains_key(&request_id) {
            return Err(OracleError::AlreadyFinished);
        }
        let snapshot = self.chain.snapshot();
        if snapshot.request(request_id).is_none() {
            return Err(OracleError::RequestNotFound);
        }
        self.add_response_tx_sign(
            snapshot.as_ref(),
            request_id,
            *oracle_pub,
            tx_sign.to_vec(),
            None,
            None,
            None,
        )
    }

    /// Pushes one of our partial signatures to every configured peer.
    /// Fire-and-forget; the janitor re-sends if the request stays open.
    fn send_response_signature(&self, request_id: u64, tx_sign: &[u8], key_pair: &KeyPair) {
        let message = signature_message(&key_pair.public_key(), request_id, tx_sign);
        let msg_sign = match key_pair.sign(&message) {
            Ok(msg_sign) => msg_sign,
            Err(e) => {
                warn!("failed to sign gossip message for request {request_id}: {e}");
                return;
            }
        };
        let envelope = rpc::signature_envelope(
            self.counter.fetch_add(1, Ordering::Relaxed),
            &key_pair.public_key(),
            request_id,
            tx_sign,
            &msg_sign,
        );
        for node in &self.settings.nodes {
            rpc::post_to_peer(self.http.clone(), node.clone(), envelope.clone());
        }
    }

    /// One janitor pass at the given instant: re-gossip backup signatures
    /// for tasks in the refresh window, evict tasks past the timeout and
    /// expire old finished-cache entries.
    pub fn timer_pass(&self, now: Instant) {
        let refresh = Duration::from_millis(REFRESH_INTERVAL_MS);
        let max_timeout = Duration::from_millis(self.settings.max_task_timeout_ms);

        let mut resend: Vec<(u64, Vec<u8>, KeyPair)> = Vec::new();
        {
            let mut state = self.state.lock();
            let mut expired = Vec::new();
            for (&id, task) in &state.pending_queue {
                let age = now.saturating_duration_since(task.created_at);
                if age > refresh && age < refresh * 2 {
                    // First gossip round presumably lost some sends; push
                    // our backup signatures again before giving up.
                    for key_pair in &self.key_pairs {
                        if let Some(sign) = task.backup_signs.get(&key_pair.public_key()) {
                            resend.push((id, sign.clone(), key_pair.clone()));
                        }
                    }
                } else if age > max_timeout {
                    expired.push(id);
                }
            }
            for id in expired {
                if let Some(task) = state.pending_queue.remove(&id) {
                    info!("Request {id} is timeout, url: {}", task.request.url);
                }
            }
            state
                .finished_cache
                .retain(|_, finished_at| now.saturating_duration_since(*finished_at) <= FINISHED_CACHE_TTL);
        }

        for (id, sign, key_pair) in resend {
            debug!("re-sending backup signature for request {id}");
            self.send_response_signature(id, &sign, &key_pair);
        }
    }

    /// Number of requests currently pending.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending_queue.len()
    }

    /// Whether the request has been finalized.
    pub fn is_finished(&self, request_id: u64) -> bool {
        self.state.lock().finished_cache.contains_key(&request_id)
    }

    /// Signature book sizes for a pending request, `(signs, backup_signs)`.
    pub fn signature_counts(&self, request_id: u64) -> Option<(usize, usize)> {
        let state = self.state.lock();
        state
            .pending_queue
            .get(&request_id)
            .map(|task| (task.signs.len(), task.backup_signs.len()))
    }
}

/// The bytes a gossiped partial signature's message signature covers:
/// `pubkey || LE64(request_id) || tx_sign`.
pub fn signature_message(oracle_pub: &ECPoint, request_id: u64, tx_sign: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(33 + 8 + tx_sign.len());
    message.extend_from_slice(oracle_pub.as_bytes());
    message.extend_from_slice(&request_id.to_le_bytes());
    message.extend_from_slice(tx_sign);
    message
}
