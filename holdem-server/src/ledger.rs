//! Ledger client (spec component C5): the orchestrator's only path to the
//! external balance/settlement service. Every call resolves to a
//! `LedgerOutcome` rather than a bare `Result` so the orchestrator can apply
//! the "trust and continue" policy uniformly at the call site instead of
//! unwinding a transport error through the hand pipeline.

use async_trait::async_trait;
use holdem_shared::ledger::{
    CancelPotRequest, CommitReservationRequest, LedgerOutcome, ProcessCashOutRequest,
    RecordContributionRequest, ReleaseReservationRequest, ReserveForBuyInRequest,
    ReserveForBuyInResponse, SettlePotRequest,
};

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn reserve_for_buy_in(
        &self,
        req: ReserveForBuyInRequest,
    ) -> LedgerOutcome<ReserveForBuyInResponse>;
    async fn commit_reservation(&self, req: CommitReservationRequest) -> LedgerOutcome<()>;
    async fn release_reservation(&self, req: ReleaseReservationRequest) -> LedgerOutcome<()>;
    async fn record_contribution(&self, req: RecordContributionRequest) -> LedgerOutcome<()>;
    async fn settle_pot(&self, req: SettlePotRequest) -> LedgerOutcome<()>;
    async fn cancel_pot(&self, req: CancelPotRequest) -> LedgerOutcome<()>;
    async fn process_cash_out(&self, req: ProcessCashOutRequest) -> LedgerOutcome<()>;
}

/// Always succeeds. Used when no `ledger_base_url` is configured, which lets
/// the service run standalone (e.g. in tests) without a ledger dependency.
pub struct InProcessLedger;

#[async_trait]
impl LedgerClient for InProcessLedger {
    async fn reserve_for_buy_in(
        &self,
        _req: ReserveForBuyInRequest,
    ) -> LedgerOutcome<ReserveForBuyInResponse> {
        LedgerOutcome::Ok(ReserveForBuyInResponse {
            reservation_id: holdem_shared::ids::ReservationId::new(),
        })
    }

    async fn commit_reservation(&self, _req: CommitReservationRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }

    async fn release_reservation(&self, _req: ReleaseReservationRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }

    async fn record_contribution(&self, _req: RecordContributionRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }

    async fn settle_pot(&self, _req: SettlePotRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }

    async fn cancel_pot(&self, _req: CancelPotRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }

    async fn process_cash_out(&self, _req: ProcessCashOutRequest) -> LedgerOutcome<()> {
        LedgerOutcome::Ok(())
    }
}

/// Talks to a real ledger service over HTTP. A transport-level failure
/// (connection refused, timeout, non-2xx with no parseable body) maps to
/// `Unavailable`; a well-formed refusal from the ledger maps to `Error`.
pub struct HttpLedgerClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpLedgerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    async fn post<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        req: &Req,
    ) -> LedgerOutcome<Resp> {
        let url = format!("{}{}", self.base_url, path);
        match self.http.post(&url).json(req).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<Resp>().await {
                Ok(body) => LedgerOutcome::Ok(body),
                Err(e) => {
                    tracing::warn!(error = %e, path, "ledger response failed to deserialize");
                    LedgerOutcome::Unavailable
                }
            },
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(%status, path, %body, "ledger returned a refusal");
                LedgerOutcome::Error(body)
            }
            Err(e) => {
                tracing::warn!(error = %e, path, "ledger unreachable");
                LedgerOutcome::Unavailable
            }
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn reserve_for_buy_in(
        &self,
        req: ReserveForBuyInRequest,
    ) -> LedgerOutcome<ReserveForBuyInResponse> {
        self.post("/v1/reservations", &req).await
    }

    async fn commit_reservation(&self, req: CommitReservationRequest) -> LedgerOutcome<()> {
        self.post("/v1/reservations/commit", &req).await
    }

    async fn release_reservation(&self, req: ReleaseReservationRequest) -> LedgerOutcome<()> {
        self.post("/v1/reservations/release", &req).await
    }

    async fn record_contribution(&self, req: RecordContributionRequest) -> LedgerOutcome<()> {
        self.post("/v1/contributions", &req).await
    }

    async fn settle_pot(&self, req: SettlePotRequest) -> LedgerOutcome<()> {
        self.post("/v1/pots/settle", &req).await
    }

    async fn cancel_pot(&self, req: CancelPotRequest) -> LedgerOutcome<()> {
        self.post("/v1/pots/cancel", &req).await
    }

    async fn process_cash_out(&self, req: ProcessCashOutRequest) -> LedgerOutcome<()> {
        self.post("/v1/cashouts", &req).await
    }
}
