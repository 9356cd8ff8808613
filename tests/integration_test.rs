/// End-to-end integration tests for the solchunk pipeline.
///
/// Tests the complete flow:
///   Config → metadata → ChunkRunner → chunk JSONL → summary → matching
use std::collections::HashSet;
use std::fs;

use solchunk::chunker::ContractChunks;
use solchunk::chunker::ranges::to_consecutive_ranges;
use solchunk::config::Config;
use solchunk::report;
use solchunk::runner::ChunkRunner;
use solchunk::tokenizer::mock::MockCounter;
use tempfile::tempdir;

const VAULT_SOL: &str = "\
pragma solidity ^0.8.0;

contract Vault {
    address owner;
    uint256 total;

    modifier onlyOwner() {
        require(msg.sender == owner);
        _;
    }

    function sweep(address target) public onlyOwner {
        uint256 balance = address(this).balance;
        if (balance > threshold) {
            payable(target).transfer(balance);
        } else {
            emit SweepSkipped(target, balance);
        }
        total = total + balance;
        lastSweep = block.timestamp;
    }

    function setOwner(address next) public {
        owner = next;
    }

    function getTotal() public view returns (uint256) {
        return total;
    }
}
";

const VAULT_META: &str = r#"{"file": "Vault", "elements": [
{"full_name": "sweep(address)", "lines": "12-21", "type": "function", "modifiers": [{"name": "onlyOwner", "lines": "7-10"}]},
{"full_name": "setOwner(address)", "lines": "23-25", "type": "function", "modifiers": []},
{"full_name": "getTotal()", "lines": "27-29", "type": "function", "modifiers": []}]}"#;

/// Build a workspace with one contract and run the full pipeline.
fn run_pipeline(max_tokens: usize) -> (Config, ContractChunks, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let sols = dir.path().join("sols");
    fs::create_dir_all(&sols).unwrap();
    fs::write(sols.join("Vault.sol"), VAULT_SOL).unwrap();

    // Metadata is JSONL: one record per line.
    let meta_path = dir.path().join("elements.jsonl");
    fs::write(&meta_path, VAULT_META.replace('\n', " ")).unwrap();

    let config = Config {
        contracts_dir: sols.to_string_lossy().to_string(),
        elements_file: meta_path.to_string_lossy().to_string(),
        output_file: dir.path().join("out/chunks.jsonl").to_string_lossy().to_string(),
        max_tokens,
        ..Config::default()
    };

    let runner = ChunkRunner::new(&config, &MockCounter);
    let result = runner.run().unwrap();
    assert_eq!(result.contracts, 1);

    let out = fs::read_to_string(&config.output_file).unwrap();
    let record: ContractChunks = serde_json::from_str(out.trim()).unwrap();
    (config, record, dir)
}

/// Oversized function → placeholder + covering sub-chunks; everything else
/// lands in budget-respecting normal chunks.
#[test]
fn test_full_pipeline_with_oversized_function() {
    let (config, record, _dir) = run_pipeline(30);
    assert_eq!(record.contract, "Vault");

    // One oversized placeholder, the rest normal.
    let placeholders: Vec<_> = record.chunks.iter().filter(|c| c.is_oversized()).collect();
    assert_eq!(placeholders.len(), 1, "chunks: {:?}", record.chunks);

    let placeholder = placeholders[0];
    assert!(placeholder.lines.is_empty());
    assert!(
        placeholder.token_count > config.max_tokens,
        "placeholder keeps the element's true token count"
    );
    assert!(
        placeholder.sub_chunks.len() >= 2,
        "got {} sub-chunks",
        placeholder.sub_chunks.len()
    );

    // Sub-chunks respect the budget and all point at their placeholder.
    for sub in &placeholder.sub_chunks {
        assert!(sub.token_count <= config.max_tokens);
        assert_eq!(sub.parent_chunk_id, placeholder.id);
        assert_eq!(sub.lines.len(), sub.line_indices.len());
    }

    // The placeholder's indices are exactly the union of its sub-chunks.
    let sub_union: Vec<usize> = placeholder
        .sub_chunks
        .iter()
        .flat_map(|s| s.line_indices.iter().copied())
        .collect();
    assert_eq!(placeholder.line_indices, sub_union);

    // Normal chunks stay within budget.
    for chunk in record.chunks.iter().filter(|c| !c.is_oversized()) {
        assert!(
            chunk.token_count <= config.max_tokens,
            "chunk {} over budget: {}",
            chunk.id,
            chunk.token_count
        );
        assert!(chunk.sub_chunks.is_empty());
    }

    // The two small functions end up in one normal chunk together with the
    // remaining plain lines.
    let last = record.chunks.last().unwrap();
    assert!(last.lines.iter().any(|l| l.contains("setOwner")));
    assert!(last.lines.iter().any(|l| l.contains("getTotal")));
}

/// Every file line is covered exactly once; line indices are strictly
/// increasing within each chunk and sub-chunk.
#[test]
fn test_coverage_partition() {
    let (_config, record, _dir) = run_pipeline(30);

    let mut seen = Vec::new();
    for chunk in &record.chunks {
        assert!(
            chunk.line_indices.windows(2).all(|w| w[0] < w[1]),
            "chunk {} indices not strictly increasing: {:?}",
            chunk.id,
            chunk.line_indices
        );
        if chunk.is_oversized() {
            for sub in &chunk.sub_chunks {
                assert!(sub.line_indices.windows(2).all(|w| w[0] < w[1]));
                seen.extend(sub.line_indices.iter().copied());
            }
        } else {
            seen.extend(chunk.line_indices.iter().copied());
        }
    }

    let unique: HashSet<usize> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "no line may appear twice: {seen:?}");

    let mut sorted = seen;
    sorted.sort_unstable();
    let total_lines = VAULT_SOL.lines().count();
    assert_eq!(sorted, (1..=total_lines).collect::<Vec<_>>());
}

/// An `if`/`else` chain must never straddle two sub-chunks.
#[test]
fn test_control_chain_cohesion_end_to_end() {
    let (_config, record, _dir) = run_pipeline(30);

    let placeholder = record.chunks.iter().find(|c| c.is_oversized()).unwrap();
    let if_holder = placeholder
        .sub_chunks
        .iter()
        .find(|s| s.lines.iter().any(|l| l.contains("if (balance")))
        .expect("if block must be present");
    assert!(
        if_holder.lines.iter().any(|l| l.contains("else")),
        "if and else must share a sub-chunk: {:?}",
        if_holder.lines
    );
}

/// The prepended modifier declaration keeps its original line numbers, and
/// appears exactly once for this single-chunk owner.
#[test]
fn test_modifier_travels_with_oversized_function() {
    let (_config, record, _dir) = run_pipeline(30);

    let placeholder = record.chunks.iter().find(|c| c.is_oversized()).unwrap();
    let modifier_sub = &placeholder.sub_chunks[0];
    assert!(modifier_sub.lines[0].trim_start().starts_with("modifier"));
    assert_eq!(modifier_sub.line_indices, vec![7, 8, 9, 10]);
}

/// Summary output carries minimal range lists, and labeled ranges match
/// back to their source sub-chunks by equality.
#[test]
fn test_summary_and_label_matching() {
    let (config, record, dir) = run_pipeline(30);

    let summary_path = dir.path().join("out/summary.jsonl");
    let written = report::summarize_file(
        std::path::Path::new(&config.output_file),
        &summary_path,
    )
    .unwrap();
    assert_eq!(written, 1);

    let out = fs::read_to_string(&summary_path).unwrap();
    let summary: report::ContractSummary = serde_json::from_str(out.trim()).unwrap();

    let placeholder = record.chunks.iter().find(|c| c.is_oversized()).unwrap();
    let summarized = summary.chunks.iter().find(|c| c.id == placeholder.id).unwrap();
    assert_eq!(
        summarized.lines_range,
        to_consecutive_ranges(&placeholder.line_indices)
    );
    assert_eq!(summarized.sub_chunks.len(), placeholder.sub_chunks.len());

    // Re-attach every summarized sub-chunk to its source by range equality.
    let mut used = HashSet::new();
    for sub_summary in &summarized.sub_chunks {
        let (_, matched) = report::match_sub_chunk(
            &sub_summary.lines_range,
            &placeholder.sub_chunks,
            &mut used,
        )
        .expect("every summary sub-chunk must match a source sub-chunk");
        assert_eq!(matched.token_count, sub_summary.token_count);
    }
    assert_eq!(used.len(), placeholder.sub_chunks.len());
}
