//! # Passport Resolver
//!
//! Turns a battery identifier into a [`BatteryPassportRecord`]:
//!
//! 1. Derive the transaction reference. Unparseable → failed placeholder,
//!    no fetch.
//! 2. Fetch the ledger record. Not found or fetch fault → failed
//!    placeholder.
//! 3. Parse the payload. Malformed → fixed fallback scalars, empty supply
//!    chain; resolution continues.
//! 4. Verify the identifier. Runs exactly once per resolution, concurrently
//!    with steps 1–3, whatever they yield. A fault counts as not verified.
//! 5. Assemble the record. `battery_id` is always the caller's input.
//!
//! [`PassportResolver::resolve`] is total: every fault is recovered locally
//! and logged. [`PassportResolver::resolve_detailed`] also returns the
//! faults that were recovered from.
//!
//! The resolver holds no mutable state; concurrent resolutions share
//! nothing but the injected capabilities.

use std::sync::Arc;

use tokio::sync::watch;

use passport_core::{
    BatteryPassportRecord, IdentifierParser, PassportContent, ResolutionFault,
    VerificationStatus,
};
use passport_ledger::{parse_payload, LedgerFetcher, PassportVerifier};

/// A resolved record together with the faults recovered from on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: BatteryPassportRecord,
    /// Empty when every step succeeded.
    pub faults: Vec<ResolutionFault>,
}

/// Outcome of steps 1–3.
enum Lookup {
    Resolved(PassportContent),
    /// Record found but its payload is unusable; fallback content applies.
    Fallback(PassportContent, ResolutionFault),
    /// No record to build from.
    Unresolved(ResolutionFault),
}

/// Resolves battery identifiers against injected ledger capabilities.
#[derive(Clone)]
pub struct PassportResolver {
    parser: IdentifierParser,
    fetcher: Arc<dyn LedgerFetcher>,
    verifier: Arc<dyn PassportVerifier>,
}

impl std::fmt::Debug for PassportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassportResolver")
            .field("parser", &self.parser)
            .field("fetcher", &self.fetcher.fetcher_name())
            .field("verifier", &self.verifier.verifier_name())
            .finish()
    }
}

impl PassportResolver {
    /// Create a resolver that accepts `iota:tx:` direct references.
    pub fn new(fetcher: Arc<dyn LedgerFetcher>, verifier: Arc<dyn PassportVerifier>) -> Self {
        Self {
            parser: IdentifierParser::default(),
            fetcher,
            verifier,
        }
    }

    /// Replace the identifier parser (e.g. to accept another tx scheme).
    pub fn with_parser(mut self, parser: IdentifierParser) -> Self {
        self.parser = parser;
        self
    }

    /// The identifier parser in use.
    pub fn parser(&self) -> &IdentifierParser {
        &self.parser
    }

    /// Resolve `battery_id` to a fully populated passport record.
    pub async fn resolve(&self, battery_id: &str) -> BatteryPassportRecord {
        self.run(battery_id, None).await.record
    }

    /// Resolve `battery_id`, also reporting recovered faults.
    pub async fn resolve_detailed(&self, battery_id: &str) -> Resolution {
        self.run(battery_id, None).await
    }

    /// Resolve `battery_id`, publishing the verification status as it
    /// changes.
    ///
    /// `status` reads [`VerificationStatus::Pending`] while verification is
    /// in flight and the final status once the record is assembled.
    pub async fn resolve_observed(
        &self,
        battery_id: &str,
        status: &watch::Sender<VerificationStatus>,
    ) -> BatteryPassportRecord {
        self.run(battery_id, Some(status)).await.record
    }

    async fn run(
        &self,
        battery_id: &str,
        progress: Option<&watch::Sender<VerificationStatus>>,
    ) -> Resolution {
        let (lookup, (verified, verify_fault)) =
            tokio::join!(self.lookup(battery_id), self.verify(battery_id, progress));

        let mut faults = Vec::new();
        let record = match lookup {
            Lookup::Resolved(content) => BatteryPassportRecord::assemble(
                battery_id,
                content,
                VerificationStatus::from_outcome(verified),
            ),
            Lookup::Fallback(content, fault) => {
                faults.push(fault);
                BatteryPassportRecord::assemble(
                    battery_id,
                    content,
                    VerificationStatus::from_outcome(verified),
                )
            }
            Lookup::Unresolved(fault) => {
                faults.push(fault);
                BatteryPassportRecord::failed(battery_id)
            }
        };
        faults.extend(verify_fault);

        if let Some(status) = progress {
            status.send_replace(record.verification_status);
        }

        tracing::debug!(
            battery_id,
            status = %record.verification_status,
            events = record.supply_chain.len(),
            faults = faults.len(),
            "passport resolved"
        );

        Resolution { record, faults }
    }

    async fn lookup(&self, battery_id: &str) -> Lookup {
        let Some(reference) = self.parser.parse(battery_id) else {
            let fault = ResolutionFault::UnparseableIdentifier(battery_id.to_string());
            tracing::warn!("{fault}");
            return Lookup::Unresolved(fault);
        };

        let record = match self.fetcher.fetch(&reference).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                let fault = ResolutionFault::RecordNotFound(reference.to_string());
                tracing::warn!(battery_id, "{fault}");
                return Lookup::Unresolved(fault);
            }
            Err(e) => {
                let fault = ResolutionFault::FetcherFault {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(battery_id, fetcher = self.fetcher.fetcher_name(), "{fault}");
                return Lookup::Unresolved(fault);
            }
        };

        match parse_payload(&record.payload) {
            Ok(content) => Lookup::Resolved(content),
            Err(e) => {
                let fault = ResolutionFault::MalformedPayload {
                    reference: record.reference.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(battery_id, "{fault}; using fallback passport data");
                Lookup::Fallback(PassportContent::fallback(), fault)
            }
        }
    }

    async fn verify(
        &self,
        battery_id: &str,
        progress: Option<&watch::Sender<VerificationStatus>>,
    ) -> (bool, Option<ResolutionFault>) {
        if let Some(status) = progress {
            status.send_replace(VerificationStatus::Pending);
        }

        match self.verifier.verify(battery_id).await {
            Ok(verified) => (verified, None),
            Err(e) => {
                let fault = ResolutionFault::VerificationFault {
                    battery_id: battery_id.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(verifier = self.verifier.verifier_name(), "{fault}");
                (false, Some(fault))
            }
        }
    }
}
