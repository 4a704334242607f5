//! Transaction lifecycle controller.
//!
//! Drives one user action through `Idle → Pending → Submitted → Sealed`,
//! or to `Failed` from any in-flight stage. A sealed action triggers a
//! position sync for the signed-in address.
//!
//! There is no queue and no cancellation. Each invocation is an independent
//! lifecycle with its own [`TransactionRecord`]; the shared dashboard status
//! shows whichever lifecycle wrote last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::TransactionConfig;
use crate::constants::PENDING_STATUS_TEXT;
use crate::errors::LendError;
use crate::execution::cadence::{bind_amount, NumericType};
use crate::execution::ledger::{FinalitySubscription, LedgerMutate};
use crate::execution::programs::Programs;
use crate::types::{ActionKind, TransactionRecord, TransactionStatus};

use super::amount::{normalize, validate_amount};
use super::error_translator::translate;
use super::position_sync::PositionSync;

pub struct TransactionController {
    mutate: Arc<dyn LedgerMutate>,
    finality: Arc<dyn FinalitySubscription>,
    sync: Arc<PositionSync>,
    programs: Arc<Programs>,
    compute_limit: u64,
    reject_invalid_amounts: bool,
    next_action_id: AtomicU64,
}

impl TransactionController {
    pub fn new(
        mutate: Arc<dyn LedgerMutate>,
        finality: Arc<dyn FinalitySubscription>,
        sync: Arc<PositionSync>,
        programs: Arc<Programs>,
        config: &TransactionConfig,
    ) -> Self {
        Self {
            mutate,
            finality,
            sync,
            programs,
            compute_limit: config.compute_limit,
            reject_invalid_amounts: config.reject_invalid_amounts,
            next_action_id: AtomicU64::new(1),
        }
    }

    /// Run one lifecycle to completion and return its terminal record.
    pub async fn execute(&self, kind: ActionKind, raw_amount: &str) -> TransactionRecord {
        let record = self.begin(kind, raw_amount);
        let (tx, _rx) = watch::channel(record.clone());
        self.run(record, &tx).await
    }

    /// Start a lifecycle on the runtime and return a receiver that observes
    /// each transition of its record.
    pub fn submit_action(
        self: &Arc<Self>,
        kind: ActionKind,
        raw_amount: &str,
    ) -> watch::Receiver<TransactionRecord> {
        let record = self.begin(kind, raw_amount);
        let (tx, rx) = watch::channel(record.clone());
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run(record, &tx).await;
        });
        rx
    }

    /// Allocate an action id and normalize the amount.
    fn begin(&self, kind: ActionKind, raw_amount: &str) -> TransactionRecord {
        let action_id = self.next_action_id.fetch_add(1, Ordering::Relaxed);
        TransactionRecord::idle(action_id, kind, normalize(raw_amount))
    }

    async fn run(
        &self,
        mut record: TransactionRecord,
        tx: &watch::Sender<TransactionRecord>,
    ) -> TransactionRecord {
        let action_id = record.action_id;
        let kind = record.kind;

        self.publish(&mut record, TransactionStatus::Pending, PENDING_STATUS_TEXT.to_string(), tx)
            .await;
        info!(action_id, kind = kind.as_str(), amount = %record.amount, "action pending");

        if self.reject_invalid_amounts {
            if let Err(e) = validate_amount(&record.amount) {
                return self.fail(record, &e, tx).await;
            }
        }

        // Pending → Submitted
        let program = self.programs.transaction(kind);
        let args = vec![bind_amount(&record.amount, NumericType::UFix64)];
        let tx_id = match self.mutate.mutate(program, args, self.compute_limit).await {
            Ok(id) => id,
            Err(e) => return self.fail(record, &e, tx).await,
        };
        record.tx_id = Some(tx_id.clone());
        self.publish(&mut record, TransactionStatus::Submitted, format!("Submitted: {tx_id}"), tx)
            .await;
        info!(action_id, kind = kind.as_str(), %tx_id, "transaction submitted");

        // Submitted → Sealed
        let sealed = match self.finality.await_sealed(&tx_id).await {
            Ok(sealed) => sealed,
            Err(e) => return self.fail(record, &e, tx).await,
        };
        self.publish(
            &mut record,
            TransactionStatus::Sealed,
            format!("Sealed: {}", sealed.status_string),
            tx,
        )
        .await;
        info!(action_id, kind = kind.as_str(), %tx_id, status = %sealed.status_string, "transaction sealed");

        match self.sync.refresh_current().await {
            Ok(report) if !report.is_complete() => {
                warn!(action_id, failed = ?report.failed_fields(), "post-seal sync incomplete");
            }
            Ok(_) => {}
            Err(e) => debug!(action_id, error = %e, "post-seal sync skipped"),
        }

        record
    }

    async fn fail(
        &self,
        mut record: TransactionRecord,
        err: &LendError,
        tx: &watch::Sender<TransactionRecord>,
    ) -> TransactionRecord {
        warn!(
            action_id = record.action_id,
            kind = record.kind.as_str(),
            tx_id = ?record.tx_id,
            error = %err,
            "action failed"
        );
        self.publish(&mut record, TransactionStatus::Failed, translate(err), tx)
            .await;
        record
    }

    async fn publish(
        &self,
        record: &mut TransactionRecord,
        status: TransactionStatus,
        text: String,
        tx: &watch::Sender<TransactionRecord>,
    ) {
        record.status = status;
        record.status_text = Some(text.clone());
        tx.send_replace(record.clone());
        self.sync.state().set_tx_status(text).await;
    }
}
