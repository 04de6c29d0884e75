//! Response transaction construction.
//!
//! Every honest oracle must derive byte-identical transactions from the
//! same snapshot, or their partial signatures will not aggregate. Nothing
//! here may depend on local time, randomness or map iteration order.

use crate::chain::ChainSnapshot;
use oracle_core::io::var_size;
use oracle_core::transaction::HEADER_SIZE;
use oracle_core::{
    contract, Contract, OracleResponse, OracleResponseCode, Signer, Transaction,
    TransactionAttribute, Witness, WitnessScope, MAX_RESULT_SIZE, MAX_VALID_UNTIL_BLOCK_INCREMENT,
    ORACLE_CONTRACT_HASH,
};
use tracing::debug;

/// Serialized size of one signature push in an invocation script
/// (PUSHDATA1, length byte, 64 signature bytes).
const SIGNATURE_PUSH_SIZE: usize = 66;

/// Builds the response transaction for an oracle response.
///
/// Returns `None` when the request cannot be served this round: no
/// designated oracles, unknown request, missing originating transaction,
/// or a faulting verification script. The caller retries on the next poll.
pub fn create_response_tx(
    snapshot: &dyn ChainSnapshot,
    response: &OracleResponse,
) -> Option<Transaction> {
    let oracle_nodes = snapshot.designated_oracles(snapshot.height() + 1);
    if oracle_nodes.is_empty() {
        debug!("no designated oracles at height {}", snapshot.height() + 1);
        return None;
    }
    let n = oracle_nodes.len();
    let m = contract::oracle_threshold(n);
    let oracle_sign_contract = Contract::create_multi_sig_contract(m, &oracle_nodes).ok()?;

    let request = snapshot.request(response.id)?;
    let request_height = snapshot.transaction_height(&request.original_tx_id)?;

    let mut response = response.clone();
    let mut tx = Transaction {
        version: 0,
        nonce: 0,
        system_fee: 0,
        network_fee: 0,
        valid_until_block: request_height + MAX_VALID_UNTIL_BLOCK_INCREMENT,
        signers: vec![
            Signer::with_scope(ORACLE_CONTRACT_HASH, WitnessScope::NONE),
            Signer::with_allowed_contracts(
                oracle_sign_contract.script_hash(),
                vec![ORACLE_CONTRACT_HASH],
            ),
        ],
        attributes: vec![TransactionAttribute::OracleResponse(response.clone())],
        script: OracleResponse::fixed_script(),
        witnesses: Vec::new(),
    };

    // Witness slots follow the verification hash order; the multisig slot
    // gets its invocation script at finalization time.
    tx.witnesses = tx
        .script_hashes_for_verifying()
        .iter()
        .map(|hash| {
            if *hash == oracle_sign_contract.script_hash() {
                Witness::new_with_scripts(Vec::new(), oracle_sign_contract.script.clone())
            } else {
                Witness::empty()
            }
        })
        .collect();

    // Network fee, part one: what the Oracle contract's verify method costs.
    let verification_fee = snapshot.verify_response_fee(&tx)?;
    tx.network_fee += verification_fee;

    // Part two: the multisig witness check.
    tx.network_fee += snapshot.exec_fee_factor() as i64 * contract::multisig_contract_cost(m, n);

    // Prospective serialized size, attributes excluded. The multisig
    // invocation script does not exist yet; account for m signature pushes.
    let size_inv = SIGNATURE_PUSH_SIZE * m;
    let mut size = HEADER_SIZE
        + var_size(tx.signers.len())
        + tx.signers
            .iter()
            .map(oracle_core::io::Serializable::size)
            .sum::<usize>()
        + var_size(tx.script.len())
        + tx.script.len()
        + var_size(tx.witnesses.len())
        + 2 // the Oracle contract witness, both scripts empty
        + var_size(size_inv)
        + size_inv
        + var_size(oracle_sign_contract.script.len())
        + oracle_sign_contract.script.len();

    let fee_per_byte = snapshot.fee_per_byte();
    let gas_for_response = request.gas_for_response as i64;

    if response.result.len() > MAX_RESULT_SIZE {
        response.code = OracleResponseCode::ResponseTooLarge;
        response.result = Vec::new();
    } else if tx.network_fee + (size + tx.attributes_size()) as i64 * fee_per_byte
        > gas_for_response
    {
        response.code = OracleResponseCode::InsufficientFunds;
        response.result = Vec::new();
    }
    tx.attributes = vec![TransactionAttribute::OracleResponse(response)];

    size += tx.attributes_size();
    tx.network_fee += size as i64 * fee_per_byte;
    tx.system_fee = gas_for_response - tx.network_fee;

    Some(tx)
}
