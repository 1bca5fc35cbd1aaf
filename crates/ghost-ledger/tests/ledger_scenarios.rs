use ghost_ledger::{
    audit, codec, Chain, ChainBuilder, ChangeKind, FaultKind, LiveStatus, TamperStatus,
    Verification,
};
use ghost_test_utils::{edit_json, temp_dir, write_file};
use proptest::prelude::*;

fn digest(n: usize) -> Option<String> {
    Some(format!("{n:064x}"))
}

#[test]
fn ten_changes_seal_one_block_with_two_history_entries() {
    let mut chain = Chain::create(2).unwrap();

    assert!(chain
        .record_change("doc.txt", ChangeKind::Create, digest(1))
        .unwrap()
        .is_none());
    assert!(chain
        .record_change("doc.txt", ChangeKind::Modify, digest(2))
        .unwrap()
        .is_none());

    let mut sealed = None;
    for i in 0..8 {
        sealed = chain
            .record_change(format!("file{i}.txt"), ChangeKind::Create, digest(10 + i))
            .unwrap();
    }

    let block = sealed.expect("tenth change seals a block");
    assert_eq!(block.index(), 1);
    assert_eq!(block.changes().len(), 10);
    assert!(block.digest().starts_with("00"));
    assert_eq!(chain.len(), 2);

    let history = chain.history_for("doc.txt");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].change.kind, ChangeKind::Create);
    assert_eq!(history[1].change.kind, ChangeKind::Modify);
    assert!(history.iter().all(|h| h.block_index == 1));

    assert!(chain.verify().is_valid());
}

#[test]
fn flipped_hash_in_saved_file_is_detected() {
    let dir = temp_dir();
    let path = dir.path().join("blockchain.json");

    let mut chain = Chain::builder().difficulty(1).create().unwrap();
    chain
        .record_change("a.txt", ChangeKind::Create, digest(1))
        .unwrap();
    chain.commit_pending().unwrap();
    codec::save(&chain, &path).unwrap();

    edit_json(&path, |value| {
        let hash = value["blocks"][1]["hash"].as_str().unwrap().to_string();
        let mut chars: Vec<char> = hash.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'a' { 'b' } else { 'a' };
        value["blocks"][1]["hash"] = chars.into_iter().collect::<String>().into();
    });

    let loaded = codec::load(&path, ChainBuilder::new()).unwrap();
    let verification = loaded.verify();
    assert!(!verification.is_valid());
    let fault = verification.fault().unwrap();
    assert_eq!(fault.index, 1);
    assert_eq!(fault.kind, FaultKind::HashMismatch);
}

#[test]
fn edited_change_record_is_detected() {
    let dir = temp_dir();
    let path = dir.path().join("blockchain.json");

    let mut chain = Chain::builder().difficulty(1).create().unwrap();
    for round in 0..3 {
        chain
            .record_change("report.pdf", ChangeKind::Modify, digest(round))
            .unwrap();
        chain.commit_pending().unwrap();
    }
    codec::save(&chain, &path).unwrap();

    edit_json(&path, |value| {
        value["blocks"][2]["data"]["changes"][0]["hash"] = "0".repeat(64).into();
    });

    let loaded = codec::load(&path, ChainBuilder::new()).unwrap();
    assert_eq!(
        loaded.verify().fault().map(|f| (f.index, f.kind)),
        Some((2, FaultKind::HashMismatch))
    );
}

#[test]
fn untracked_and_deleted_paths() {
    let dir = temp_dir();
    let gone = dir.path().join("gone.txt");
    let mut chain = Chain::builder().difficulty(0).create().unwrap();

    assert_eq!(
        chain.detect_tampering(dir.path().join("never.txt")).unwrap(),
        TamperStatus::NotTracked
    );

    chain.record_change(&gone, ChangeKind::Delete, None).unwrap();
    chain.commit_pending().unwrap();
    assert_eq!(chain.detect_tampering(&gone).unwrap(), TamperStatus::DeletedRecorded);
}

#[test]
fn audit_after_reload_sees_live_files() {
    let dir = temp_dir();
    let chain_path = dir.path().join("logs").join("blockchain.json");
    let tracked = write_file(dir.path(), "src/main.txt", "v1");

    let mut chain = Chain::builder().difficulty(1).create().unwrap();
    chain.record_change(&tracked, ChangeKind::Create, None).unwrap();
    chain.commit_pending().unwrap();
    codec::save(&chain, &chain_path).unwrap();

    std::fs::write(&tracked, "v2").unwrap();
    let loaded = codec::load_verified(&chain_path, ChainBuilder::new()).unwrap();
    let report = audit(&loaded);

    assert!(report.verification.is_valid());
    assert_eq!(report.files.len(), 1);
    assert!(matches!(report.files[0].status, LiveStatus::Tampered { .. }));
}

#[test]
fn loaded_difficulty_wins_over_builder() {
    let dir = temp_dir();
    let path = dir.path().join("chain.json");
    let chain = Chain::builder().difficulty(1).create().unwrap();
    codec::save(&chain, &path).unwrap();

    let loaded = codec::load(&path, Chain::builder().difficulty(3)).unwrap();
    assert_eq!(loaded.difficulty(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Record(u8, ChangeKind),
    Commit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..6, prop_oneof![
            Just(ChangeKind::Create),
            Just(ChangeKind::Modify),
            Just(ChangeKind::Delete),
        ])
            .prop_map(|(f, k)| Op::Record(f, k)),
        1 => Just(Op::Commit),
    ]
}

fn run(ops: &[Op], batch_size: usize) -> Chain {
    let mut chain = Chain::builder()
        .difficulty(1)
        .batch_size(batch_size)
        .create()
        .unwrap();
    for (i, op) in ops.iter().enumerate() {
        match op {
            Op::Record(f, kind) => {
                chain
                    .record_change(format!("f{f}"), *kind, digest(i))
                    .unwrap();
            }
            Op::Commit => {
                chain.commit_pending().unwrap();
            }
        }
    }
    chain
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_sequence_keeps_chain_valid(ops in prop::collection::vec(op(), 0..40), batch in 1usize..6) {
        let chain = run(&ops, batch);
        prop_assert_eq!(chain.verify(), Verification::Valid);
        prop_assert!(chain.pending().len() < batch);
        for (i, pair) in chain.blocks().windows(2).enumerate() {
            prop_assert_eq!(pair[1].index(), (i + 1) as u64);
            prop_assert_eq!(pair[1].previous_digest(), pair[0].digest());
            prop_assert!(pair[1].digest().starts_with('0'));
        }
    }

    #[test]
    fn save_load_preserves_blocks_and_verdict(ops in prop::collection::vec(op(), 1..20)) {
        let chain = run(&ops, 3);
        let json = codec::to_json(&chain).unwrap();
        let loaded = codec::from_json(&json, ChainBuilder::new()).unwrap();
        prop_assert_eq!(loaded.blocks(), chain.blocks());
        prop_assert_eq!(loaded.verify(), chain.verify());
    }

    #[test]
    fn nonce_edit_fails_at_that_block(ops in prop::collection::vec(op(), 10..30), pick in any::<prop::sample::Index>()) {
        let chain = run(&ops, 2);
        prop_assume!(chain.len() > 1);
        let target = 1 + pick.index(chain.len() - 1);

        let mut value: serde_json::Value = serde_json::from_str(&codec::to_json(&chain).unwrap()).unwrap();
        let nonce = value["blocks"][target]["nonce"].as_u64().unwrap();
        value["blocks"][target]["nonce"] = (nonce + 1).into();
        let tampered = codec::from_json(&value.to_string(), ChainBuilder::new()).unwrap();

        let fault = tampered.verify().fault().unwrap();
        prop_assert_eq!(fault.index, target as u64);
        prop_assert_eq!(fault.kind, FaultKind::HashMismatch);
    }

    #[test]
    fn history_is_oldest_first(ops in prop::collection::vec(op(), 0..40)) {
        let chain = run(&ops, 4);
        for path in chain.tracked_paths() {
            let history = chain.history_for(path);
            prop_assert!(!history.is_empty());
            prop_assert!(history.windows(2).all(|w| w[0].block_index <= w[1].block_index));
        }
    }
}
