use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use mutual_crypto::signatures::{address_of, generate_keypair, sign_transaction};
use mutual_storage::MemoryStore;
use mutual_types::{ClaimStatus, InsuranceInstruction};
use tower::ServiceExt;

const HOLDER: [u8; 32] = [1u8; 32];

fn app_with(ledger: LedgerState) -> (Router, mpsc::Receiver<Transaction>) {
    let (tx_sender, tx_receiver) = mpsc::channel(8);
    let state = AppState {
        ledger: Arc::new(RwLock::new(ledger)),
        storage: Arc::new(MemoryStore::new()),
        tx_sender,
        metrics: Arc::new(Metrics::new()),
    };
    (build_router(state), tx_receiver)
}

fn sample_ledger() -> LedgerState {
    let mut ledger = LedgerState::new([0xAA; 32]);
    ledger.custody_balance = 6_000;
    ledger.pool.credit(6_000).unwrap();
    ledger.policies.insert(HOLDER, 100_000, 1_000, 10, 20);
    ledger.claims.insert(1, HOLDER, 500, 15, "flood damage".into());
    ledger
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn pool_reports_both_balances() {
    let (app, _rx) = app_with(sample_ledger());
    let (status, body) = call(app, get("/pool")).await;

    assert_eq!(status, StatusCode::OK);
    let pool: PoolView = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        pool,
        PoolView {
            pool_balance: 6_000,
            ledger_balance: 6_000,
            policies: 1,
            claims: 1,
        }
    );
}

#[tokio::test]
async fn policy_and_claim_lookups() {
    let (app, _rx) = app_with(sample_ledger());

    let (status, body) = call(app.clone(), get("/policy/1")).await;
    assert_eq!(status, StatusCode::OK);
    let policy: PolicyView = serde_json::from_slice(&body).unwrap();
    assert_eq!(policy.holder, hex::encode(HOLDER));
    assert!(policy.is_active);

    let (status, body) = call(app.clone(), get("/policy/99")).await;
    assert_eq!(status, StatusCode::OK);
    let missing: PolicyView = serde_json::from_slice(&body).unwrap();
    assert_eq!(missing.id, 0);
    assert_eq!(missing.coverage_amount, 0);

    let (_, body) = call(app.clone(), get("/claim/1")).await;
    let claim: ClaimView = serde_json::from_slice(&body).unwrap();
    assert_eq!(claim.status, ClaimStatus::Submitted);
    assert_eq!(claim.description, "flood damage");

    let (_, body) = call(app.clone(), get("/policy/1/claims")).await;
    assert_eq!(serde_json::from_slice::<Vec<u64>>(&body).unwrap(), vec![1]);

    let (_, body) = call(app.clone(), get(&format!("/policies/{}", hex::encode(HOLDER)))).await;
    assert_eq!(serde_json::from_slice::<Vec<u64>>(&body).unwrap(), vec![1]);

    let (status, _) = call(app, get("/policies/not-hex")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_checks_signature_before_queueing() {
    let (app, mut rx) = app_with(sample_ledger());
    let key = generate_keypair();
    let mut tx = Transaction::new(address_of(&key), 0, InsuranceInstruction::Contribute { amount: 10 });

    let (status, _) = call(app.clone(), post_json("/tx", &tx)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());

    sign_transaction(&key, &mut tx);
    let (status, body) = call(app.clone(), post_json("/tx", &tx)).await;
    assert_eq!(status, StatusCode::OK);
    let submitted: SubmittedView = serde_json::from_slice(&body).unwrap();
    assert_eq!(submitted.tx_id, hex::encode(tx.id()));
    assert_eq!(rx.try_recv().unwrap(), tx);

    let (_, body) = call(app, get("/metrics")).await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("mutual_transactions_submitted_total{instruction=\"contribute\"} 1"));
    assert!(text.contains("mutual_pool_balance 6000"));
}

#[tokio::test]
async fn missing_blocks_and_receipts_are_not_found() {
    let (app, _rx) = app_with(sample_ledger());

    let (status, body) = call(app.clone(), get("/block/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "block 1 not found");

    let (status, _) = call(app.clone(), get(&format!("/receipt/{}", hex::encode([7u8; 32])))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(app, get(&format!("/account/{}", hex::encode(HOLDER)))).await;
    assert_eq!(status, StatusCode::OK);
    let account: AccountView = serde_json::from_slice(&body).unwrap();
    assert_eq!(account.balance, 0);
}
