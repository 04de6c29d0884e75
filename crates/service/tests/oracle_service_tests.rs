//! End-to-end tests of the signature aggregation pipeline over an
//! in-memory chain.

mod common;

use common::{MemoryChain, NETWORK_MAGIC as MAGIC};
use oracle_core::io::Serializable;
use oracle_core::{OracleResponse, OracleResponseCode, Transaction, MAX_RESULT_SIZE};
use oracle_cryptography::KeyPair;
use oracle_service::builder::create_response_tx;
use oracle_service::{signature_message, OracleError, OracleService, OracleStatus, Settings};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn four_oracles() -> Vec<KeyPair> {
    (0..4).map(|_| KeyPair::generate()).collect()
}

fn make_service(chain: Arc<MemoryChain>, local_keys: Vec<KeyPair>) -> Arc<OracleService> {
    let settings = Settings {
        nodes: Vec::new(),
        ..Settings::default()
    };
    OracleService::new(settings, chain, local_keys)
}

/// Builds the primary and backup transactions the way every honest oracle
/// would from the same snapshot.
fn build_pair(chain: &MemoryChain, response: &OracleResponse) -> (Transaction, Transaction) {
    use oracle_service::OracleChain;
    let snapshot = chain.snapshot();
    let tx = create_response_tx(snapshot.as_ref(), response).expect("response tx builds");
    let backup = create_response_tx(
        snapshot.as_ref(),
        &OracleResponse::consensus_unreachable(response.id),
    )
    .expect("backup tx builds");
    (tx, backup)
}

/// Installs the local node's own transactions and signatures, as the
/// request pipeline does after a fetch.
fn install_local(
    service: &OracleService,
    chain: &MemoryChain,
    key: &KeyPair,
    id: u64,
    tx: &Transaction,
    backup: &Transaction,
) {
    use oracle_service::OracleChain;
    let snapshot = chain.snapshot();
    let tx_sign = tx.sign(key, MAGIC).unwrap();
    let backup_sign = backup.sign(key, MAGIC).unwrap();
    service
        .add_response_tx_sign(
            snapshot.as_ref(),
            id,
            key.public_key(),
            tx_sign.to_vec(),
            Some(tx.clone()),
            Some(backup.clone()),
            Some(backup_sign.to_vec()),
        )
        .expect("local signature records");
}

/// Submits a peer's partial signature through the inbound path.
fn submit_peer(
    service: &OracleService,
    key: &KeyPair,
    id: u64,
    tx_sign: &[u8],
) -> oracle_service::Result<()> {
    let message = signature_message(&key.public_key(), id, tx_sign);
    let msg_sign = key.sign(&message).unwrap();
    service.submit_oracle_response(&key.public_key(), id, tx_sign, &msg_sign)
}

#[tokio::test]
async fn test_happy_path_any_three_of_four_finalize_once() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(42, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let response = OracleResponse::new(42, OracleResponseCode::Success, b"hello".to_vec());
    let (tx, backup) = build_pair(&chain, &response);

    install_local(&service, &chain, &keys[0], 42, &tx, &backup);
    assert!(chain.relayed().is_empty());
    assert_eq!(service.signature_counts(42), Some((1, 1)));

    // Two more primary signatures, in arbitrary order, reach M = 3.
    submit_peer(&service, &keys[2], 42, &tx.sign(&keys[2], MAGIC).unwrap()).unwrap();
    assert!(chain.relayed().is_empty());
    submit_peer(&service, &keys[1], 42, &tx.sign(&keys[1], MAGIC).unwrap()).unwrap();

    let relayed = chain.relayed();
    assert_eq!(relayed.len(), 1);
    assert!(service.is_finished(42));
    assert_eq!(service.pending_count(), 0);

    // The invocation script carries exactly three signatures, in ascending
    // order of signer public key.
    let submitted = &relayed[0];
    let multisig_index = submitted
        .witnesses
        .iter()
        .position(|w| !w.verification_script.is_empty())
        .unwrap();
    assert_eq!(multisig_index, 1);
    let invocation = &submitted.witnesses[multisig_index].invocation_script;
    assert_eq!(invocation.len(), 3 * 66);

    let mut signers = vec![&keys[0], &keys[1], &keys[2]];
    signers.sort_by_key(|k| *k.public_key().as_bytes());
    let mut expected = Vec::new();
    for key in signers {
        let sign = tx.sign(key, MAGIC).unwrap();
        expected.push(0x0C);
        expected.push(64);
        expected.extend_from_slice(&sign);
    }
    assert_eq!(invocation, &expected);

    // The fourth, late signature is rejected without touching state.
    let err = submit_peer(&service, &keys[3], 42, &tx.sign(&keys[3], MAGIC).unwrap()).unwrap_err();
    assert!(matches!(err, OracleError::AlreadyFinished));
    assert_eq!(err.to_string(), "Request has already finished");
    assert_eq!(chain.relayed().len(), 1);
}

#[tokio::test]
async fn test_duplicate_signature_is_a_no_op() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(7, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let response = OracleResponse::new(7, OracleResponseCode::Success, b"body".to_vec());
    let (tx, backup) = build_pair(&chain, &response);
    install_local(&service, &chain, &keys[0], 7, &tx, &backup);

    let peer_sign = tx.sign(&keys[1], MAGIC).unwrap();
    submit_peer(&service, &keys[1], 7, &peer_sign).unwrap();
    let counts = service.signature_counts(7).unwrap();
    submit_peer(&service, &keys[1], 7, &peer_sign).unwrap();
    assert_eq!(service.signature_counts(7).unwrap(), counts);
    assert!(chain.relayed().is_empty());
}

#[tokio::test]
async fn test_divergent_fetch_falls_back_to_backup_consensus() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(9, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    // This node and one peer fetched "A"; the other two saw an error and
    // built a different primary transaction.
    let good = OracleResponse::new(9, OracleResponseCode::Success, b"A".to_vec());
    let bad = OracleResponse::new(9, OracleResponseCode::Error, Vec::new());
    let (tx_good, backup) = build_pair(&chain, &good);
    let (tx_bad, _) = build_pair(&chain, &bad);
    assert_ne!(tx_good.hash(), tx_bad.hash());

    install_local(&service, &chain, &keys[0], 9, &tx_good, &backup);
    submit_peer(&service, &keys[1], 9, &tx_good.sign(&keys[1], MAGIC).unwrap()).unwrap();
    assert_eq!(service.signature_counts(9), Some((2, 1)));

    // The divergent primary signatures verify against neither of our
    // transactions and are rejected.
    for key in [&keys[2], &keys[3]] {
        let err = submit_peer(&service, key, 9, &tx_bad.sign(key, MAGIC).unwrap()).unwrap_err();
        assert!(matches!(err, OracleError::InvalidTxSign));
    }
    assert_eq!(service.signature_counts(9), Some((2, 1)));
    assert!(chain.relayed().is_empty());

    // The re-gossip round carries their backup signatures, which do verify;
    // the third one saturates the backup book.
    submit_peer(&service, &keys[2], 9, &backup.sign(&keys[2], MAGIC).unwrap()).unwrap();
    assert!(chain.relayed().is_empty());
    submit_peer(&service, &keys[3], 9, &backup.sign(&keys[3], MAGIC).unwrap()).unwrap();

    let relayed = chain.relayed();
    assert_eq!(relayed.len(), 1);
    assert_eq!(
        relayed[0].oracle_response().unwrap().code,
        OracleResponseCode::ConsensusUnreachable
    );
    assert!(service.is_finished(9));
}

#[tokio::test]
async fn test_oversized_result_aggregates_as_response_too_large() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(11, "https://x/y", None, 10_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let oversized = OracleResponse::new(
        11,
        OracleResponseCode::Success,
        vec![7u8; MAX_RESULT_SIZE + 1],
    );
    let (tx, backup) = build_pair(&chain, &oversized);
    let response = tx.oracle_response().unwrap();
    assert_eq!(response.code, OracleResponseCode::ResponseTooLarge);
    assert!(response.result.is_empty());

    // Every honest oracle derives the same bytes, so signatures aggregate.
    let (tx_again, _) = build_pair(&chain, &oversized);
    assert_eq!(tx.to_bytes(), tx_again.to_bytes());

    install_local(&service, &chain, &keys[0], 11, &tx, &backup);
    submit_peer(&service, &keys[1], 11, &tx.sign(&keys[1], MAGIC).unwrap()).unwrap();
    submit_peer(&service, &keys[2], 11, &tx.sign(&keys[2], MAGIC).unwrap()).unwrap();

    let relayed = chain.relayed();
    assert_eq!(relayed.len(), 1);
    assert_eq!(
        relayed[0].oracle_response().unwrap().code,
        OracleResponseCode::ResponseTooLarge
    );
}

#[tokio::test]
async fn test_bad_message_signature_is_rejected_without_state_change() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(5, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let tx_sign = [1u8; 64];
    let wrong_msg_sign = [2u8; 64];
    let err = service
        .submit_oracle_response(&keys[1].public_key(), 5, &tx_sign, &wrong_msg_sign)
        .unwrap_err();
    assert!(matches!(err, OracleError::InvalidSign));
    assert_eq!(err.to_string(), "Invalid sign");
    assert_eq!(service.pending_count(), 0);
    assert!(chain.relayed().is_empty());
}

#[tokio::test]
async fn test_unknown_request_is_rejected() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let tx_sign = [1u8; 64];
    let message = signature_message(&keys[1].public_key(), 999, &tx_sign);
    let msg_sign = keys[1].sign(&message).unwrap();
    let err = service
        .submit_oracle_response(&keys[1].public_key(), 999, &tx_sign, &msg_sign)
        .unwrap_err();
    assert!(matches!(err, OracleError::RequestNotFound));
    assert_eq!(err.to_string(), "Request is not found");
}

#[tokio::test]
async fn test_collector_mode_parks_signature_in_both_books_until_pruned() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(13, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let response = OracleResponse::new(13, OracleResponseCode::Success, b"r".to_vec());
    let (tx, backup) = build_pair(&chain, &response);

    // A peer's backup signature arrives before this node has fetched:
    // it is parked speculatively in both books.
    let early_backup_sign = backup.sign(&keys[1], MAGIC).unwrap();
    submit_peer(&service, &keys[1], 13, &early_backup_sign).unwrap();
    assert_eq!(service.signature_counts(13), Some((1, 1)));

    // Installing the local transactions prunes the book the signature does
    // not belong to.
    install_local(&service, &chain, &keys[0], 13, &tx, &backup);
    assert_eq!(service.signature_counts(13), Some((1, 2)));
}

#[tokio::test]
async fn test_timed_out_task_is_evicted_and_can_be_recreated() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(21, "https://x/y", None, 1_0000_0000);
    let settings = Settings {
        max_task_timeout_ms: 1000,
        nodes: Vec::new(),
        ..Settings::default()
    };
    let service = OracleService::new(settings, chain.clone(), vec![keys[0].clone()]);

    let response = OracleResponse::new(21, OracleResponseCode::Success, b"r".to_vec());
    let (_, backup) = build_pair(&chain, &response);
    submit_peer(&service, &keys[1], 21, &backup.sign(&keys[1], MAGIC).unwrap()).unwrap();
    assert_eq!(service.pending_count(), 1);

    // Not yet past the timeout: nothing happens.
    service.timer_pass(Instant::now());
    assert_eq!(service.pending_count(), 1);

    // Past the timeout: the task disappears.
    service.timer_pass(Instant::now() + Duration::from_millis(1500));
    assert_eq!(service.pending_count(), 0);
    assert!(!service.is_finished(21));

    // A later signature creates a fresh task.
    submit_peer(&service, &keys[2], 21, &backup.sign(&keys[2], MAGIC).unwrap()).unwrap();
    assert_eq!(service.pending_count(), 1);
    assert_eq!(service.signature_counts(21), Some((1, 1)));
}

#[tokio::test]
async fn test_finished_cache_expires_after_three_days() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    chain.add_request(33, "https://x/y", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    let response = OracleResponse::new(33, OracleResponseCode::Success, b"r".to_vec());
    let (tx, backup) = build_pair(&chain, &response);
    install_local(&service, &chain, &keys[0], 33, &tx, &backup);
    submit_peer(&service, &keys[1], 33, &tx.sign(&keys[1], MAGIC).unwrap()).unwrap();
    submit_peer(&service, &keys[2], 33, &tx.sign(&keys[2], MAGIC).unwrap()).unwrap();
    assert!(service.is_finished(33));

    service.timer_pass(Instant::now() + Duration::from_secs(2 * 24 * 60 * 60));
    assert!(service.is_finished(33));
    service.timer_pass(Instant::now() + Duration::from_secs(3 * 24 * 60 * 60 + 60));
    assert!(!service.is_finished(33));
}

#[tokio::test]
async fn test_start_requires_a_designated_key() {
    let keys = four_oracles();
    let outsider = KeyPair::generate();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    let service = make_service(chain.clone(), vec![outsider]);

    let err = service.start().unwrap_err();
    assert!(matches!(err, OracleError::AccountNotFound));
    assert_eq!(service.status(), OracleStatus::Unstarted);
}

#[tokio::test]
async fn test_service_stops_itself_when_rotated_out() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    service.start().unwrap();
    assert_eq!(service.status(), OracleStatus::Running);

    // Still designated: nothing changes.
    service.on_persist();
    assert_eq!(service.status(), OracleStatus::Running);

    // The designated set rotates away from our key.
    let replacements: Vec<KeyPair> = (0..4).map(|_| KeyPair::generate()).collect();
    chain.set_oracles(replacements.iter().map(|k| k.public_key()).collect());
    service.on_persist();
    assert_eq!(service.status(), OracleStatus::Stopped);
}

#[tokio::test]
async fn test_poller_skips_finished_and_already_built_requests() {
    let keys = four_oracles();
    let chain = MemoryChain::new(keys.iter().map(|k| k.public_key()).collect());
    // The URL scheme is unregistered, so a processed request yields an
    // Error-code response without touching the network.
    chain.add_request(50, "file:///etc/data", None, 1_0000_0000);
    let service = make_service(chain.clone(), vec![keys[0].clone()]);

    service.process_requests().await;
    assert_eq!(service.pending_count(), 1);
    assert_eq!(service.signature_counts(50), Some((1, 1)));
    let first_pass = chain.relayed().len();

    // A second pass sees the primary tx in place and does not reprocess.
    service.process_requests().await;
    assert_eq!(service.signature_counts(50), Some((1, 1)));
    assert_eq!(chain.relayed().len(), first_pass);
}
