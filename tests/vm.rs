//! Governance VM bytecode programs driven end-to-end through a real block,
//! rather than against a bare `Interpreter` (see `src/governance/vm/interpreter.rs`
//! for the unit-level coverage of individual opcodes).

use std::sync::Arc;

use runtime::blockchain::constants::DEV_GENESIS_ADDRESS;
use runtime::blockchain::{Blockchain, DaoTx, NoopStorage, Transaction, TxInner};
use runtime::config::GovernanceConfig;
use runtime::governance::events;
use runtime::governance::vm::{encode_program, Instruction, Opcode, Value};
use runtime::ids::{Address, Hash};
use runtime::signing::AcceptAllBackend;

async fn chain() -> Blockchain {
    let (sink, _rx) = events::channel(32);
    Blockchain::new(GovernanceConfig::default(), Arc::new(AcceptAllBackend), sink, Arc::new(NoopStorage)).await
}

fn bytecode_tx(from: Address, nonce: i64, program: Vec<Instruction>) -> Transaction {
    Transaction {
        from,
        to: Address([0; 32]),
        value: 0,
        nonce,
        data: Some(encode_program(&program)),
        inner: TxInner::None,
        signature: Vec::new(),
    }
}

#[tokio::test]
async fn create_proposal_program_registers_a_proposal_reachable_via_the_facade() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let creator = Address([1; 32]);

    let mint = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::TokenMint {
            to: creator,
            amount: 10_000,
            reason: "bootstrap".into(),
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![mint], 1).await.unwrap();

    let program = vec![
        Instruction::Push(Value::Str("Raise the quorum".into())),
        Instruction::Push(Value::Str("Bump quorum to 25%".into())),
        Instruction::Push(Value::U64(3)), // ProposalType::Parameter
        Instruction::Push(Value::U64(0)), // VotingType::Simple
        Instruction::Push(Value::I64(1)),
        Instruction::Push(Value::I64(100)),
        Instruction::Push(Value::U64(5100)),
        Instruction::Push(Value::Hash(Hash::ZERO)),
        Instruction::Exec(Opcode::CreateProposal),
    ];
    let tx = bytecode_tx(creator, 0, program);
    let block = chain.add_block(vec![tx], 2).await.unwrap();
    assert_eq!(block.transactions.len(), 1);

    let facade = chain.facade();
    let proposals = facade.list_proposals().await;
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].creator, creator);
}

#[tokio::test]
async fn cast_vote_program_records_a_vote_once_the_window_is_open() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let creator = Address([1; 32]);
    let voter = Address([2; 32]);

    let mint = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::TokenMint {
            to: voter,
            amount: 10_000,
            reason: "bootstrap".into(),
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![mint], 1).await.unwrap();

    let create_program = vec![
        Instruction::Push(Value::Str("Fund the treasury".into())),
        Instruction::Push(Value::Str("General proposal".into())),
        Instruction::Push(Value::U64(0)), // General
        Instruction::Push(Value::U64(0)), // Simple
        Instruction::Push(Value::I64(2)),
        Instruction::Push(Value::I64(100)),
        Instruction::Push(Value::U64(5100)),
        Instruction::Push(Value::Hash(Hash::ZERO)),
        Instruction::Exec(Opcode::CreateProposal),
    ];
    let create_tx = bytecode_tx(creator, 0, create_program);
    chain.add_block(vec![create_tx], 2).await.unwrap();

    let facade = chain.facade();
    let proposal_id = facade.list_proposals().await[0].id;

    let vote_program = vec![
        Instruction::Push(Value::Nil), // no reason
        Instruction::Push(Value::U64(50)), // weight
        Instruction::Push(Value::U64(0)), // VoteChoice::Yes
        Instruction::Push(Value::Hash(proposal_id)),
        Instruction::Exec(Opcode::CastVote),
    ];
    let vote_tx = bytecode_tx(voter, 0, vote_program);
    let block = chain.add_block(vec![vote_tx], 5).await.unwrap();
    assert_eq!(block.transactions.len(), 1);

    let votes = facade.get_votes(&proposal_id).await;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].voter, voter);
}
