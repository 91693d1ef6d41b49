/// A well-known development address, pre-funded in the genesis block so
/// the CLI demo and integration tests have a minted account to work from
/// without a bespoke faucet transaction. Corresponds to no real keypair;
/// signatures from it only verify under `crate::signing::AcceptAllBackend`.
pub const DEV_GENESIS_ADDRESS: [u8; 32] = [0xde; 32];

/// Initial supply minted to `DEV_GENESIS_ADDRESS` at genesis.
pub const GENESIS_SUPPLY: u64 = 1_000_000_000; 