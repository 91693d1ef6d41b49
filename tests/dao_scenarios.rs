//! The six seed scenarios, plus a Treasury-proposal execution scenario,
//! end to end through `Blockchain::add_block`, using real `Transaction`/
//! `DaoTx` envelopes rather than calling `DaoProcessor` directly (that
//! level is already covered by the unit tests embedded next to each
//! module).

use std::sync::Arc;

use runtime::blockchain::constants::DEV_GENESIS_ADDRESS;
use runtime::blockchain::{Blockchain, DaoTx, NoopStorage, Transaction, TreasuryAction, TxInner};
use runtime::config::GovernanceConfig;
use runtime::governance::events;
use runtime::governance::proposal::{ProposalStatus, ProposalType, TreasuryPayout, VotingType};
use runtime::governance::vote::VoteChoice;
use runtime::ids::Address;
use runtime::signing::AcceptAllBackend;

async fn chain() -> Blockchain {
    let (sink, _rx) = events::channel(32);
    Blockchain::new(GovernanceConfig::default(), Arc::new(AcceptAllBackend), sink, Arc::new(NoopStorage)).await
}

fn mint_tx(from: Address, nonce: i64, to: Address, amount: u64) -> Transaction {
    Transaction {
        from,
        to: Address([0; 32]),
        value: 0,
        nonce,
        data: None,
        inner: TxInner::Dao(DaoTx::TokenMint { to, amount, reason: "seed".into() }),
        signature: Vec::new(),
    }
}

#[tokio::test]
async fn scenario_one_simple_proposal_lifecycle_passes() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let a = Address([1; 32]);
    let b = Address([2; 32]);
    let c = Address([3; 32]);
    let d = Address([4; 32]);
    let e = Address([5; 32]);

    let mints = vec![
        mint_tx(dev, 0, a, 10_000),
        mint_tx(dev, 1, b, 10_000),
        mint_tx(dev, 2, c, 10_000),
        mint_tx(dev, 3, d, 10_000),
        mint_tx(dev, 4, e, 10_000),
    ];
    chain.add_block(mints, 0).await.unwrap();

    let create = Transaction {
        from: a,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Proposal {
            title: "Raise the quorum".into(),
            description: "Bump quorum to 25%".into(),
            proposal_type: ProposalType::General,
            voting_type: VotingType::Simple,
            start_time: 0,
            end_time: 3_600,
            threshold: 5_100,
            metadata_hash: runtime::ids::Hash::ZERO,
            treasury_payout: None,
        }),
        signature: Vec::new(),
    };
    let proposal_id = create.content_hash();

    let vote = |voter: Address, choice: VoteChoice| Transaction {
        from: voter,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Vote {
            proposal_id,
            choice,
            weight: 1_000,
            reason: None,
        }),
        signature: Vec::new(),
    };

    chain
        .add_block(
            vec![
                create,
                vote(b, VoteChoice::Yes),
                vote(c, VoteChoice::Yes),
                vote(d, VoteChoice::Yes),
                vote(e, VoteChoice::No),
            ],
            1,
        )
        .await
        .unwrap();

    // Sweep the status once the voting window has closed.
    chain.add_block(vec![], 3_601).await.unwrap();

    let facade = chain.facade();
    let proposal = facade.get_proposal(&proposal_id).await.unwrap();
    assert_eq!(proposal.results.yes_votes, 3_000);
    assert_eq!(proposal.results.no_votes, 1_000);
    assert_eq!(proposal.results.abstain_votes, 0);
    assert_eq!(proposal.results.total_voters, 4);
    assert_eq!(proposal.results.quorum, 4_000);
    assert_eq!(proposal.status, ProposalStatus::Passed);
}

#[tokio::test]
async fn scenario_two_quadratic_cost_check() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let v = Address([1; 32]);

    chain.add_block(vec![mint_tx(dev, 0, v, 1_000)], 0).await.unwrap();

    let create = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Proposal {
            title: "Quadratic trial".into(),
            description: "d".into(),
            proposal_type: ProposalType::General,
            voting_type: VotingType::Quadratic,
            start_time: 0,
            end_time: 3_600,
            threshold: 5_100,
            metadata_hash: runtime::ids::Hash::ZERO,
            treasury_payout: None,
        }),
        signature: Vec::new(),
    };
    let proposal_id = create.content_hash();

    let vote = Transaction {
        from: v,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Vote {
            proposal_id,
            choice: VoteChoice::Yes,
            weight: 15,
            reason: None,
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![create, vote], 1).await.unwrap();

    let facade = chain.facade();
    let config = GovernanceConfig::default();
    // 15^2 == 225 debited on top of the flat per-vote fee.
    let expected_balance = 1_000 - config.fees.vote - 225;
    assert_eq!(facade.get_balance(&v).await, expected_balance);

    let votes = facade.get_votes(&proposal_id).await;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].weight, 15);

    let proposal = facade.get_proposal(&proposal_id).await.unwrap();
    assert_eq!(proposal.results.yes_votes, 15);
}

#[tokio::test]
async fn scenario_three_delegation_moves_power_and_revoke_restores_it() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let delegator = Address([1; 32]);
    let delegate = Address([2; 32]);

    chain
        .add_block(vec![mint_tx(dev, 0, delegator, 10_000), mint_tx(dev, 1, delegate, 10_000)], 0)
        .await
        .unwrap();

    let delegate_tx = Transaction {
        from: delegator,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Delegation {
            delegate: Some(delegate),
            duration_seconds: 3_600,
            revoke: false,
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![delegate_tx], 1).await.unwrap();

    let facade = chain.facade();
    let config = GovernanceConfig::default();
    let delegator_balance_after_fee = 10_000 - config.fees.delegation;
    assert_eq!(facade.get_effective_power(&delegator, 1_800).await, 0);
    assert_eq!(
        facade.get_effective_power(&delegate, 1_800).await,
        10_000 + delegator_balance_after_fee
    );

    let revoke_tx = Transaction {
        from: delegator,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Delegation {
            delegate: None,
            duration_seconds: 0,
            revoke: true,
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![revoke_tx], 1_900).await.unwrap();

    let delegator_balance_after_second_fee = delegator_balance_after_fee - config.fees.delegation;
    assert_eq!(
        facade.get_effective_power(&delegator, 2_000).await,
        delegator_balance_after_second_fee
    );
    assert_eq!(facade.get_effective_power(&delegate, 2_000).await, 10_000);
}

#[tokio::test]
async fn scenario_four_treasury_multisig_executes_once_threshold_met() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let s1 = Address([1; 32]);
    let s2 = Address([2; 32]);
    let s3 = Address([3; 32]);
    let recipient = Address([9; 32]);

    chain.add_block(vec![mint_tx(dev, 0, s1, 1_000)], 0).await.unwrap();
    {
        let mut guard = chain.engine.state.write_all().await;
        guard.treasury.initialize(vec![s1, s2, s3], 2, 100_000).unwrap();
    }

    let create = Transaction {
        from: s1,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Create {
            recipient,
            amount: 10_000,
            purpose: "grant".into(),
        })),
        signature: Vec::new(),
    };
    let tx_id = create.content_hash();
    chain.add_block(vec![create], 1).await.unwrap();

    let sign = |signer: Address, nonce: i64| Transaction {
        from: signer,
        to: Address([0; 32]),
        value: 0,
        nonce,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Sign { tx_id, signature: b"sig".to_vec() })),
        signature: Vec::new(),
    };
    chain.add_block(vec![sign(s1, 1), sign(s2, 0)], 10).await.unwrap();

    let execute = |nonce: i64| Transaction {
        from: s1,
        to: Address([0; 32]),
        value: 0,
        nonce,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Execute { tx_id })),
        signature: Vec::new(),
    };
    chain.add_block(vec![execute(2)], 20).await.unwrap();

    let facade = chain.facade();
    let treasury = facade.get_treasury().await;
    assert_eq!(treasury.balance, 90_000);
    assert_eq!(facade.get_balance(&recipient).await, 10_000);
    assert!(facade.get_pending_tx(&tx_id).await.unwrap().executed);

    // A second execute (fresh nonce, same tx id) is a no-op: the treasury
    // does not debit twice.
    chain.add_block(vec![execute(3)], 21).await.unwrap();
    let treasury_after_replay = facade.get_treasury().await;
    assert_eq!(treasury_after_replay.balance, 90_000);
}

#[tokio::test]
async fn scenario_five_double_vote_is_rejected() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let voter = Address([1; 32]);

    chain.add_block(vec![mint_tx(dev, 0, voter, 10_000)], 0).await.unwrap();

    let create = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Proposal {
            title: "Double vote check".into(),
            description: "d".into(),
            proposal_type: ProposalType::General,
            voting_type: VotingType::Simple,
            start_time: 0,
            end_time: 3_600,
            threshold: 5_100,
            metadata_hash: runtime::ids::Hash::ZERO,
            treasury_payout: None,
        }),
        signature: Vec::new(),
    };
    let proposal_id = create.content_hash();
    chain.add_block(vec![create], 1).await.unwrap();

    let first_vote = Transaction {
        from: voter,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Vote {
            proposal_id,
            choice: VoteChoice::Yes,
            weight: 500,
            reason: None,
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![first_vote], 2).await.unwrap();

    let second_vote = Transaction {
        from: voter,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Vote {
            proposal_id,
            choice: VoteChoice::No,
            weight: 500,
            reason: None,
        }),
        signature: Vec::new(),
    };
    // The envelope itself is accepted (valid nonce/signature); the DAO
    // precondition inside the applier is what rejects the duplicate vote.
    chain.add_block(vec![second_vote], 3).await.unwrap();

    let facade = chain.facade();
    let votes = facade.get_votes(&proposal_id).await;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].choice, VoteChoice::Yes);
    let proposal = facade.get_proposal(&proposal_id).await.unwrap();
    assert_eq!(proposal.results.total_voters, 1);
    assert_eq!(proposal.results.no_votes, 0);
}

#[tokio::test]
async fn scenario_six_non_signer_cannot_sign_a_pending_tx() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let s1 = Address([1; 32]);
    let attacker = Address([66; 32]);
    let recipient = Address([9; 32]);

    chain.add_block(vec![mint_tx(dev, 0, s1, 1_000)], 0).await.unwrap();
    {
        let mut guard = chain.engine.state.write_all().await;
        guard.treasury.initialize(vec![s1], 1, 50_000).unwrap();
    }

    let create = Transaction {
        from: s1,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Create {
            recipient,
            amount: 5_000,
            purpose: "payout".into(),
        })),
        signature: Vec::new(),
    };
    let tx_id = create.content_hash();
    chain.add_block(vec![create], 1).await.unwrap();

    let attacker_sign = Transaction {
        from: attacker,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Sign { tx_id, signature: b"sig".to_vec() })),
        signature: Vec::new(),
    };
    chain.add_block(vec![attacker_sign], 2).await.unwrap();

    let facade = chain.facade();
    let pending = facade.get_pending_tx(&tx_id).await.unwrap();
    assert!(pending.signatures.is_empty());
    assert!(!pending.executed);
}

#[tokio::test]
async fn scenario_seven_treasury_proposal_execution_schedules_and_pays_out() {
    let chain = chain().await;
    let dev = Address(DEV_GENESIS_ADDRESS);
    let voter = Address([1; 32]);
    let signer = Address([2; 32]);
    let recipient = Address([9; 32]);

    chain.add_block(vec![mint_tx(dev, 0, voter, 10_000)], 0).await.unwrap();
    {
        let mut guard = chain.engine.state.write_all().await;
        guard.treasury.initialize(vec![signer], 1, 100_000).unwrap();
    }

    let create = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Proposal {
            title: "Fund the grants pool".into(),
            description: "Send 20,000 to the grants recipient".into(),
            proposal_type: ProposalType::Treasury,
            voting_type: VotingType::Simple,
            start_time: 0,
            end_time: 100,
            threshold: 5_100,
            metadata_hash: runtime::ids::Hash::ZERO,
            treasury_payout: Some(TreasuryPayout { recipient, amount: 20_000 }),
        }),
        signature: Vec::new(),
    };
    let proposal_id = create.content_hash();
    chain.add_block(vec![create], 1).await.unwrap();

    let vote = Transaction {
        from: voter,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Vote {
            proposal_id,
            choice: VoteChoice::Yes,
            weight: 5_000,
            reason: None,
        }),
        signature: Vec::new(),
    };
    chain.add_block(vec![vote], 50).await.unwrap();

    // The sweep at `now >= end_time` finalizes the window; quorum/approval
    // are met since `voter` cast the only (Yes) vote.
    chain.add_block(vec![], 100).await.unwrap();

    let facade = chain.facade();
    assert_eq!(
        facade.get_proposal(&proposal_id).await.unwrap().status,
        ProposalStatus::Passed
    );

    let execute = Transaction {
        from: dev,
        to: Address([0; 32]),
        value: 0,
        nonce: 2,
        data: None,
        inner: TxInner::Dao(DaoTx::ExecuteProposal { proposal_id }),
        signature: Vec::new(),
    };
    chain.add_block(vec![execute], 101).await.unwrap();

    assert_eq!(
        facade.get_proposal(&proposal_id).await.unwrap().status,
        ProposalStatus::Executed
    );
    let pending = facade.get_pending_tx(&proposal_id).await.unwrap();
    assert_eq!(pending.recipient, recipient);
    assert_eq!(pending.amount, 20_000);
    assert!(!pending.executed);

    let sign = Transaction {
        from: signer,
        to: Address([0; 32]),
        value: 0,
        nonce: 0,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Sign {
            tx_id: proposal_id,
            signature: b"sig".to_vec(),
        })),
        signature: Vec::new(),
    };
    chain.add_block(vec![sign], 102).await.unwrap();

    let payout_execute = Transaction {
        from: signer,
        to: Address([0; 32]),
        value: 0,
        nonce: 1,
        data: None,
        inner: TxInner::Dao(DaoTx::Treasury(TreasuryAction::Execute { tx_id: proposal_id })),
        signature: Vec::new(),
    };
    chain.add_block(vec![payout_execute], 103).await.unwrap();

    assert_eq!(facade.get_balance(&recipient).await, 20_000);
    assert_eq!(facade.get_treasury().await.balance, 80_000);
}
