//! Contract tests for passport resolution.
//!
//! Every resolution returns a fully populated record; these tests pin down
//! which shape each fetch/verify outcome produces.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use passport_core::{
    passport::FALLBACK_MANUFACTURER, BatteryPassportRecord, IdentifierParser, PassportFields,
    SupplyChainEvent, TransactionRef, VerificationStatus, UNKNOWN,
};
use passport_ledger::{
    InMemoryLedger, LedgerError, LedgerFetcher, LedgerRecord, PassportVerifier,
    SimulatedVerifier, VerifyError,
};
use passport_resolver::{PassportDraft, PassportPublisher, PassportResolver};
use serde_json::json;
use tokio::sync::{watch, Notify};

// ── Stubs ────────────────────────────────────────────────────────────

struct NotFoundLedger;

#[async_trait]
impl LedgerFetcher for NotFoundLedger {
    async fn fetch(&self, _: &TransactionRef) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(None)
    }

    fn fetcher_name(&self) -> &str {
        "NotFoundLedger"
    }
}

struct UnreachableLedger;

#[async_trait]
impl LedgerFetcher for UnreachableLedger {
    async fn fetch(&self, _: &TransactionRef) -> Result<Option<LedgerRecord>, LedgerError> {
        Err(LedgerError::Unavailable {
            reason: "connection refused".into(),
        })
    }

    fn fetcher_name(&self) -> &str {
        "UnreachableLedger"
    }
}

/// Records every reference it is asked for.
#[derive(Default)]
struct RecordingLedger {
    inner: InMemoryLedger,
    requested: parking_lot::Mutex<Vec<String>>,
}

#[async_trait]
impl LedgerFetcher for RecordingLedger {
    async fn fetch(&self, r: &TransactionRef) -> Result<Option<LedgerRecord>, LedgerError> {
        self.requested.lock().push(r.to_string());
        self.inner.fetch(r).await
    }

    fn fetcher_name(&self) -> &str {
        "RecordingLedger"
    }
}

struct CountingVerifier {
    outcome: bool,
    calls: AtomicU32,
}

impl CountingVerifier {
    fn new(outcome: bool) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl PassportVerifier for CountingVerifier {
    async fn verify(&self, _: &str) -> Result<bool, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome)
    }

    fn verifier_name(&self) -> &str {
        "CountingVerifier"
    }
}

struct FaultyVerifier;

#[async_trait]
impl PassportVerifier for FaultyVerifier {
    async fn verify(&self, _: &str) -> Result<bool, VerifyError> {
        Err(VerifyError::Unavailable {
            reason: "node offline".into(),
        })
    }

    fn verifier_name(&self) -> &str {
        "FaultyVerifier"
    }
}

/// Blocks until released.
struct GatedVerifier {
    gate: Arc<Notify>,
}

#[async_trait]
impl PassportVerifier for GatedVerifier {
    async fn verify(&self, _: &str) -> Result<bool, VerifyError> {
        self.gate.notified().await;
        Ok(true)
    }

    fn verifier_name(&self) -> &str {
        "GatedVerifier"
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

fn bmw_payload() -> String {
    json!({
        "@context": "https://ref.gs1.org/standards/epcis/2.0.0/epcis-context.jsonld",
        "type": "EPCISDocument",
        "epcisBody": {"eventList": [
            {
                "eventTime": "2025-03-15",
                "bizStep": "https://ref.gs1.org/voc/Bizstep-manufacturing",
                "bizLocation": {"id": "BMW Leipzig, Germany"},
                "userExtensions": {
                    "manufacturer": "BMW",
                    "model": "BMW iX3 Battery Pack",
                    "chemistry": "NCM811 (LiNi0.8Co0.1Mn0.1O2)",
                    "carbonFootprint": 49,
                    "participant": "BMW Group",
                    "role": "Pack Assembler"
                }
            },
            {
                "eventTime": "2025-03-10T10:00:00Z",
                "bizLocation": {"id": "Ningde, China"},
                "signature": "0xcafe",
                "userExtensions": {
                    "participant": "CATL",
                    "role": "Cell Manufacturer",
                    "carbonFootprint": "49 kgCO2eq/kWh"
                }
            },
            {
                "eventTime": "2025-02-01T08:00:00Z",
                "readPoint": {"id": "Jiangxi, China"},
                "userExtensions": {
                    "participant": "Ganfeng Lithium",
                    "role": "Lithium Supplier",
                    "materials": ["Li2CO3: 15kg", "recycledContent: 6%"]
                }
            }
        ]}
    })
    .to_string()
}

fn seeded(payload: &str) -> (Arc<InMemoryLedger>, String) {
    let ledger = Arc::new(InMemoryLedger::new());
    let reference = ledger.anchor(payload);
    (ledger, format!("iota:tx:{reference}"))
}

// ── Not found / unparseable ──────────────────────────────────────────

#[tokio::test]
async fn not_found_yields_failed_record_with_original_id() {
    let verifier = CountingVerifier::new(true);
    let resolver = PassportResolver::new(Arc::new(NotFoundLedger), verifier.clone());

    let record = resolver.resolve("did:iota:rms1q:x").await;

    assert_eq!(record.verification_status, VerificationStatus::Failed);
    assert_eq!(record.battery_id, "did:iota:rms1q:x");
    assert_eq!(record, BatteryPassportRecord::failed("did:iota:rms1q:x"));
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fetch_fault_is_treated_as_not_found() {
    let resolver = PassportResolver::new(
        Arc::new(UnreachableLedger),
        Arc::new(SimulatedVerifier::new(true)),
    );
    let resolution = resolver.resolve_detailed("iota:tx:abc").await;
    assert_eq!(resolution.record, BatteryPassportRecord::failed("iota:tx:abc"));
    assert_eq!(resolution.faults.len(), 1);
    assert!(resolution.faults[0].to_string().contains("connection refused"));
}

#[tokio::test]
async fn unparseable_identifier_skips_fetch_but_still_verifies() {
    let ledger = Arc::new(RecordingLedger::default());
    let verifier = CountingVerifier::new(true);
    let resolver = PassportResolver::new(ledger.clone(), verifier.clone());

    for id in ["foo-bar-baz", "iota:tx:", "did:iota", ""] {
        let record = resolver.resolve(id).await;
        assert_eq!(record, BatteryPassportRecord::failed(id));
    }

    assert!(ledger.requested.lock().is_empty());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn did_identifier_fetches_third_segment() {
    let ledger = Arc::new(RecordingLedger::default());
    ledger
        .inner
        .insert(TransactionRef::new("rms1qabc").unwrap(), bmw_payload());
    let resolver = PassportResolver::new(ledger.clone(), Arc::new(SimulatedVerifier::new(true)));

    let record = resolver.resolve("did:iota:rms1qabc:extra").await;

    assert_eq!(*ledger.requested.lock(), vec!["rms1qabc".to_string()]);
    assert_eq!(record.manufacturer, "BMW");
    assert_eq!(record.battery_id, "did:iota:rms1qabc:extra");
}

// ── Payload handling ─────────────────────────────────────────────────

#[tokio::test]
async fn malformed_payload_uses_fallback_and_keeps_verification() {
    for verified in [true, false] {
        let (ledger, id) = seeded("this is not an event list");
        let resolver = PassportResolver::new(ledger, Arc::new(SimulatedVerifier::new(verified)));

        let record = resolver.resolve(&id).await;

        assert_eq!(record.manufacturer, FALLBACK_MANUFACTURER);
        let fallback = PassportFields::fallback();
        assert_eq!(record.model, fallback.model);
        assert_eq!(record.plant, fallback.plant);
        assert_eq!(record.date, fallback.date);
        assert_eq!(record.chemistry, fallback.chemistry);
        assert_eq!(record.carbon_footprint, fallback.carbon_footprint);
        assert!(record.supply_chain.is_empty());
        assert_eq!(
            record.verification_status,
            VerificationStatus::from_outcome(verified)
        );
    }
}

#[tokio::test]
async fn supply_chain_preserves_ledger_order_and_per_event_fields() {
    let (ledger, id) = seeded(&bmw_payload());
    let resolver = PassportResolver::new(ledger, Arc::new(SimulatedVerifier::new(true)));

    let record = resolver.resolve(&id).await;

    let summary: Vec<(&str, &str, &str)> = record
        .supply_chain
        .iter()
        .map(|e| (e.participant.as_str(), e.role.as_str(), e.location.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("BMW Group", "Pack Assembler", "BMW Leipzig, Germany"),
            ("CATL", "Cell Manufacturer", "Ningde, China"),
            ("Ganfeng Lithium", "Lithium Supplier", "Jiangxi, China"),
        ]
    );
    assert_eq!(record.supply_chain[1].signature.as_deref(), Some("0xcafe"));
    assert_eq!(record.supply_chain[2].timestamp, "2025-02-01T08:00:00Z");
    assert_eq!(record.supply_chain[2].data["materials"][1], "recycledContent: 6%");

    assert_eq!(record.manufacturer, "BMW");
    assert_eq!(record.model, "BMW iX3 Battery Pack");
    assert_eq!(record.plant, "BMW Leipzig, Germany");
    assert_eq!(record.date, "2025-03-15");
    assert_eq!(record.chemistry, "NCM811 (LiNi0.8Co0.1Mn0.1O2)");
    assert_eq!(record.carbon_footprint, 49.0);
    assert_eq!(record.verification_status, VerificationStatus::Verified);
}

#[tokio::test]
async fn missing_scalars_read_unknown_not_fallback() {
    let (ledger, id) = seeded(r#"{"epcisBody":{"eventList":[{"userExtensions":{"model":"X"}}]}}"#);
    let resolver = PassportResolver::new(ledger, Arc::new(SimulatedVerifier::new(true)));

    let record = resolver.resolve(&id).await;

    assert_eq!(record.model, "X");
    assert_eq!(record.manufacturer, UNKNOWN);
    assert_eq!(record.carbon_footprint, 0.0);
    assert_eq!(record.supply_chain.len(), 1);
}

// ── Verification ─────────────────────────────────────────────────────

#[tokio::test]
async fn verifier_fault_fails_status_but_keeps_scalars() {
    let (ledger, id) = seeded(&bmw_payload());
    let resolver = PassportResolver::new(ledger, Arc::new(FaultyVerifier));

    let resolution = resolver.resolve_detailed(&id).await;

    assert_eq!(resolution.record.verification_status, VerificationStatus::Failed);
    assert_eq!(resolution.record.manufacturer, "BMW");
    assert_eq!(resolution.record.supply_chain.len(), 3);
    assert_eq!(resolution.faults.len(), 1);
}

#[tokio::test]
async fn verification_runs_once_per_resolution() {
    let (ledger, id) = seeded(&bmw_payload());
    let verifier = CountingVerifier::new(false);
    let resolver = PassportResolver::new(ledger, verifier.clone());

    let record = resolver.resolve(&id).await;

    assert_eq!(record.verification_status, VerificationStatus::Failed);
    assert_eq!(record.manufacturer, "BMW");
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn observed_resolution_reports_pending_while_verifying() {
    let (ledger, id) = seeded(&bmw_payload());
    let gate = Arc::new(Notify::new());
    let resolver = Arc::new(PassportResolver::new(
        ledger,
        Arc::new(GatedVerifier { gate: gate.clone() }),
    ));
    let (status_tx, mut status_rx) = watch::channel(VerificationStatus::Failed);

    let handle = tokio::spawn({
        let resolver = resolver.clone();
        async move { resolver.resolve_observed(&id, &status_tx).await }
    });

    status_rx.changed().await.unwrap();
    assert_eq!(*status_rx.borrow_and_update(), VerificationStatus::Pending);

    gate.notify_one();
    let record = handle.await.unwrap();

    assert_eq!(record.verification_status, VerificationStatus::Verified);
    assert_eq!(*status_rx.borrow(), VerificationStatus::Verified);
}

// ── Identity of batteryId ────────────────────────────────────────────

#[tokio::test]
async fn battery_id_is_never_the_derived_reference() {
    let (ledger, id) = seeded(&bmw_payload());
    let resolver = PassportResolver::new(ledger, Arc::new(FaultyVerifier));
    let inputs = [
        id.clone(),
        "iota:tx:missing".to_string(),
        "did:iota:abc:def".to_string(),
        "  spaced  ".to_string(),
        "ünïcödé:tx:ref".to_string(),
    ];

    for input in inputs {
        let record = resolver.resolve(&input).await;
        assert_eq!(record.battery_id.as_bytes(), input.as_bytes());
    }
}

// ── Concurrency ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_are_independent() {
    let ledger = Arc::new(InMemoryLedger::new());
    let good = format!("iota:tx:{}", ledger.anchor(bmw_payload()));
    let bad = format!("iota:tx:{}", ledger.anchor("garbage"));
    let resolver = Arc::new(PassportResolver::new(
        ledger,
        Arc::new(SimulatedVerifier::new(true)),
    ));

    let mut handles = Vec::new();
    for i in 0..32 {
        let resolver = resolver.clone();
        let id = match i % 3 {
            0 => good.clone(),
            1 => bad.clone(),
            _ => "foo-bar-baz".to_string(),
        };
        handles.push(tokio::spawn(async move { (i, resolver.resolve(&id).await) }));
    }

    for handle in handles {
        let (i, record) = handle.await.unwrap();
        match i % 3 {
            0 => assert_eq!(record.manufacturer, "BMW"),
            1 => assert_eq!(record.manufacturer, FALLBACK_MANUFACTURER),
            _ => assert_eq!(record.verification_status, VerificationStatus::Failed),
        }
    }
}

// ── Publish then resolve ─────────────────────────────────────────────

#[tokio::test]
async fn published_history_resolves_in_order() {
    let ledger = Arc::new(InMemoryLedger::new());
    let publisher = PassportPublisher::new(ledger.clone());
    let draft = PassportDraft {
        battery_id: "did:iota:bmw:SN-0042:1741996800000".into(),
        manufacturer: "BMW".into(),
        model: "BMW iX3 Battery Pack".into(),
        plant: "BMW Leipzig, Germany".into(),
        date: "2025-03-15".into(),
        chemistry: "NCM811".into(),
        carbon_footprint: 49.0,
        participant: Some("BMW Group".into()),
        role: Some("Pack Assembler".into()),
    };

    let first = publisher.create_passport(&draft).await.unwrap();
    let cell = SupplyChainEvent {
        participant: "CATL".into(),
        role: "Cell Manufacturer".into(),
        location: "Ningde, China".into(),
        timestamp: "2025-03-10T10:00:00Z".into(),
        data: json!({"carbonFootprint": "49 kgCO2eq/kWh"})
            .as_object()
            .cloned()
            .unwrap(),
        signature: Some("0xbeef".into()),
    };
    let second = publisher
        .add_supply_chain_event(&draft.battery_id, &first, &cell)
        .await
        .unwrap();
    assert_ne!(first, second);

    let resolver = PassportResolver::new(ledger, Arc::new(SimulatedVerifier::new(true)));

    let original = resolver.resolve(&first).await;
    assert_eq!(original.supply_chain.len(), 1);

    let extended = resolver.resolve(&second).await;
    assert_eq!(extended.manufacturer, "BMW");
    assert_eq!(extended.plant, "BMW Leipzig, Germany");
    assert_eq!(extended.carbon_footprint, 49.0);
    assert_eq!(extended.supply_chain.len(), 2);
    assert_eq!(extended.supply_chain[0].participant, "BMW Group");
    assert_eq!(extended.supply_chain[1].participant, "CATL");
    assert_eq!(extended.supply_chain[1].role, "Cell Manufacturer");
    assert_eq!(extended.supply_chain[1].signature.as_deref(), Some("0xbeef"));
    assert_eq!(extended.battery_id, second);
}

#[tokio::test]
async fn custom_scheme_round_trips_through_publisher_and_resolver() {
    let ledger = Arc::new(InMemoryLedger::new());
    let publisher =
        PassportPublisher::new(ledger.clone()).with_parser(IdentifierParser::new("smr"));
    let draft = PassportDraft {
        battery_id: "b".into(),
        manufacturer: "M".into(),
        model: "X".into(),
        plant: "P".into(),
        date: "2025-01-01".into(),
        chemistry: "LFP".into(),
        carbon_footprint: 1.0,
        participant: None,
        role: None,
    };
    let id = publisher.create_passport(&draft).await.unwrap();
    assert!(id.starts_with("smr:tx:"));

    let default_resolver =
        PassportResolver::new(ledger.clone(), Arc::new(SimulatedVerifier::new(true)));
    assert_eq!(
        default_resolver.resolve(&id).await.verification_status,
        VerificationStatus::Failed
    );

    let smr_resolver = default_resolver.with_parser(IdentifierParser::new("smr"));
    assert_eq!(smr_resolver.resolve(&id).await.manufacturer, "M");
}
