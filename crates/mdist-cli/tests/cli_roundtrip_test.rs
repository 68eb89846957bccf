//! End-to-end tests for the subcommand handlers: generate a distribution
//! from a balances file, verify it, tamper with it, and export it.

use std::path::Path;

use mdist_cli::export::{run_export, ExportArgs};
use mdist_cli::generate::{run_generate, ClaimsFormat, GenerateArgs, GeneratedPaths};
use mdist_cli::verify::{run_verify, VerifyArgs};
use mdist_core::{ClaimRecord, DistributorInfo, TreeInfo};
use mdist_store::open_claim_store;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BALANCES: &str = r#"{
    "0x3333333333333333333333333333333333333333": "0x2710",
    "0x1111111111111111111111111111111111111111": 100,
    "0x2222222222222222222222222222222222222222": "2500",
    "0x4444444444444444444444444444444444444444": "0xff"
}"#;

fn generate_as(dir: &Path, claims_format: ClaimsFormat) -> GeneratedPaths {
    let input = dir.join("epoch.json");
    std::fs::write(&input, BALANCES).unwrap();
    let args = GenerateArgs {
        input: input.clone(),
        out_dir: None,
        info_out: Some(dir.join("info.json")),
        claims_format,
    };
    assert_eq!(run_generate(&args).unwrap(), 0);
    GeneratedPaths::for_input(&input, None, claims_format)
}

fn generate(dir: &Path) -> GeneratedPaths {
    generate_as(dir, ClaimsFormat::Sqlite)
}

fn read_claims(path: &Path) -> Vec<ClaimRecord> {
    open_claim_store(path).unwrap().load_all().unwrap()
}

fn rewrite_claims(path: &Path, claims: &[ClaimRecord]) {
    open_claim_store(path).unwrap().bulk_write(claims).unwrap();
}

#[test]
fn generate_writes_consistent_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate(dir.path());

    let tree: TreeInfo =
        serde_json::from_str(&std::fs::read_to_string(&paths.tree_info).unwrap()).unwrap();
    let info: DistributorInfo =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("info.json")).unwrap())
            .unwrap();
    let claims = read_claims(&paths.claims);

    assert_eq!(tree.recipients_count, 4);
    assert_eq!(tree.root, info.merkle_root);
    // Map strings are hex: 0x2710 + 100 + 0x2500 + 0xff = 19827
    assert_eq!(tree.token_total.to_hex(), "0x4d73");
    assert!(paths.claims.to_string_lossy().ends_with(".claims.sqlite"));
    assert_eq!(claims, info.claims);
    let indices: Vec<u64> = claims.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(
        claims[0].address.to_checksum().to_lowercase(),
        "0x1111111111111111111111111111111111111111"
    );
}

#[test]
fn generated_distribution_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate(dir.path());
    let args = VerifyArgs {
        root: paths.tree_info,
        claims: paths.claims,
    };
    assert_eq!(run_verify(&args).unwrap(), 0);
}

#[test]
fn jsonl_claims_verify() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate_as(dir.path(), ClaimsFormat::Jsonl);
    let lines = std::fs::read_to_string(&paths.claims).unwrap();
    assert_eq!(lines.lines().count(), 4);
    let args = VerifyArgs {
        root: paths.tree_info,
        claims: paths.claims,
    };
    assert_eq!(run_verify(&args).unwrap(), 0);
}

#[test]
fn map_string_balances_commit_as_hex() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hex.json");
    std::fs::write(
        &input,
        r#"{ "0x1111111111111111111111111111111111111111": "100" }"#,
    )
    .unwrap();
    let args = GenerateArgs {
        input: input.clone(),
        out_dir: None,
        info_out: None,
        claims_format: ClaimsFormat::Sqlite,
    };
    assert_eq!(run_generate(&args).unwrap(), 0);
    let paths = GeneratedPaths::for_input(&input, None, ClaimsFormat::Sqlite);
    let claims = read_claims(&paths.claims);
    assert_eq!(claims[0].amount.to_hex(), "0x100");
}

#[test]
fn tampered_claim_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate(dir.path());

    let mut claims = read_claims(&paths.claims);
    claims[2].amount = mdist_core::Amount::from(1);
    rewrite_claims(&paths.claims, &claims);

    let args = VerifyArgs {
        root: paths.tree_info,
        claims: paths.claims,
    };
    assert_eq!(run_verify(&args).unwrap(), 1);
}

#[test]
fn dropped_claim_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate(dir.path());

    let claims = read_claims(&paths.claims);
    rewrite_claims(&paths.claims, &claims[1..]);

    let args = VerifyArgs {
        root: paths.tree_info,
        claims: paths.claims,
    };
    assert_eq!(run_verify(&args).unwrap(), 1);
}

#[test]
fn invalid_balances_produce_no_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(
        &input,
        r#"{ "0x1111111111111111111111111111111111111111": 0 }"#,
    )
    .unwrap();
    let args = GenerateArgs {
        input: input.clone(),
        out_dir: None,
        info_out: None,
        claims_format: ClaimsFormat::Sqlite,
    };
    assert!(run_generate(&args).is_err());
    let paths = GeneratedPaths::for_input(&input, None, ClaimsFormat::Sqlite);
    assert!(!paths.claims.exists());
    assert!(!paths.tree_info.exists());
}

#[test]
fn export_uploads_every_claim() {
    let dir = tempfile::tempdir().unwrap();
    let paths = generate(dir.path());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(MockServer::start());
    runtime.block_on(
        Mock::given(method("PUT"))
            .and(path("/accounts/acct/storage/kv/namespaces/ns/bulk"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "success": true, "errors": [] })),
            )
            .mount(&mock_server),
    );

    let args = ExportArgs {
        claims: paths.claims,
        token: Some("test-token".to_string()),
        account_identifier: Some("acct".to_string()),
        namespace_identifier: Some("ns".to_string()),
        api_url: Some(mock_server.uri()),
        batch_size: 3,
    };
    assert_eq!(run_export(&args).unwrap(), 0);

    let requests = runtime.block_on(mock_server.received_requests()).unwrap();
    assert_eq!(requests.len(), 2);
}
