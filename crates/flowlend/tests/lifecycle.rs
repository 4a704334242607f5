//! End-to-end lifecycle against an in-memory ledger.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use flowlend::config::{AppDetailConfig, ContractsConfig, LedgerConfig, TransactionConfig};
use flowlend::constants::{COLLATERAL_FACTOR, LIQUIDATION_THRESHOLD};
use flowlend::core::position_sync::{DashboardState, PositionSync};
use flowlend::core::risk::health_summary;
use flowlend::core::session::{AuthProvider, WalletSession};
use flowlend::core::tx_controller::TransactionController;
use flowlend::display::format_health_factor;
use flowlend::errors::LendError;
use flowlend::execution::cadence::{CadenceValue, Composite, CompositeField};
use flowlend::execution::ledger::{FinalitySubscription, LedgerMutate, LedgerQuery};
use flowlend::execution::programs::Programs;
use flowlend::types::{ActionKind, HealthFactor, SealedResult, TransactionStatus};

const USER: &str = "0x01cf0e2f2f715450";

// ---------------------------------------------------------------------------
// In-memory ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Book {
    wallet: Decimal,
    collateral: Decimal,
    borrowed: Decimal,
    pending: HashMap<String, (ActionKind, Decimal)>,
    next_tx: u64,
}

#[derive(Default)]
struct FakeLedger {
    book: Mutex<Book>,
    queries: AtomicUsize,
    submitted_args: Mutex<Vec<Vec<CadenceValue>>>,
}

impl FakeLedger {
    fn with_position(wallet: Decimal, collateral: Decimal, borrowed: Decimal) -> Arc<Self> {
        let ledger = Self::default();
        {
            let mut book = ledger.book.lock().unwrap();
            book.wallet = wallet;
            book.collateral = collateral;
            book.borrowed = borrowed;
        }
        Arc::new(ledger)
    }

    fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

fn ufix(v: Decimal) -> CadenceValue {
    CadenceValue::UFix64(format!("{:.8}", v))
}

fn record(id: &str, fields: Vec<(&str, Decimal)>) -> CadenceValue {
    CadenceValue::Struct(Composite {
        id: id.into(),
        fields: fields
            .into_iter()
            .map(|(name, v)| CompositeField {
                name: name.into(),
                value: ufix(v),
            })
            .collect(),
    })
}

#[async_trait]
impl LedgerQuery for FakeLedger {
    async fn query(
        &self,
        program: &str,
        _args: Vec<CadenceValue>,
    ) -> Result<CadenceValue, LendError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let book = self.book.lock().unwrap();

        if program.contains("getUserPosition") {
            Ok(record(
                "A.cf265b057b710867.FlowLend.UserPosition",
                vec![("collateral", book.collateral), ("borrowed", book.borrowed)],
            ))
        } else if program.contains("getUserHealthFactor") {
            let hf = if book.borrowed.is_zero() {
                Decimal::ZERO
            } else {
                book.collateral * COLLATERAL_FACTOR / book.borrowed
            };
            Ok(ufix(hf))
        } else if program.contains("getPoolState") {
            let util = if book.collateral.is_zero() {
                Decimal::ZERO
            } else {
                book.borrowed / book.collateral
            };
            Ok(record(
                "A.cf265b057b710867.FlowLend.PoolState",
                vec![
                    ("totalCollateral", book.collateral),
                    ("totalBorrows", book.borrowed),
                    ("utilizationRate", util),
                ],
            ))
        } else {
            Err(LendError::Network {
                reason: "unknown script".into(),
            })
        }
    }
}

#[async_trait]
impl LedgerMutate for FakeLedger {
    async fn mutate(
        &self,
        program: &str,
        args: Vec<CadenceValue>,
        _compute_limit: u64,
    ) -> Result<String, LendError> {
        self.submitted_args.lock().unwrap().push(args.clone());

        let amount = match args.first() {
            Some(CadenceValue::UFix64(v)) => Decimal::from_str(v).map_err(|_| {
                LendError::Rejected {
                    message: format!("invalid UFix64 argument {v}"),
                }
            })?,
            _ => {
                return Err(LendError::Rejected {
                    message: "missing amount argument".into(),
                })
            }
        };

        let kind = ActionKind::ALL
            .into_iter()
            .find(|k| program.contains(&format!("FlowLend.{}(", k.as_str())))
            .ok_or_else(|| LendError::Rejected {
                message: "unknown transaction".into(),
            })?;

        let mut book = self.book.lock().unwrap();
        if matches!(kind, ActionKind::Deposit | ActionKind::Repay) && amount > book.wallet {
            return Err(LendError::Rejected {
                message: "error: panic: Cannot withdraw tokens: amount exceeds balance".into(),
            });
        }

        book.next_tx += 1;
        let id = format!("{:064x}", book.next_tx);
        book.pending.insert(id.clone(), (kind, amount));
        Ok(id)
    }
}

#[async_trait]
impl FinalitySubscription for FakeLedger {
    async fn await_sealed(&self, tx_id: &str) -> Result<SealedResult, LendError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut book = self.book.lock().unwrap();
        let (kind, amount) = book
            .pending
            .remove(tx_id)
            .ok_or_else(|| LendError::Rejected {
                message: format!("unknown transaction {tx_id}"),
            })?;

        match kind {
            ActionKind::Deposit => {
                book.wallet -= amount;
                book.collateral += amount;
            }
            ActionKind::Withdraw => {
                book.collateral -= amount;
                book.wallet += amount;
            }
            ActionKind::Borrow => {
                let limit = book.collateral * COLLATERAL_FACTOR / LIQUIDATION_THRESHOLD;
                if book.borrowed + amount > limit {
                    return Err(LendError::Rejected {
                        message: "pre-condition failed: borrow would make position unhealthy"
                            .into(),
                    });
                }
                book.borrowed += amount;
                book.wallet += amount;
            }
            ActionKind::Repay => {
                book.wallet -= amount;
                book.borrowed -= amount;
            }
        }

        Ok(SealedResult {
            status_string: "SEALED".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

struct Harness {
    ledger: Arc<FakeLedger>,
    sync: Arc<PositionSync>,
    controller: Arc<TransactionController>,
}

fn contracts() -> ContractsConfig {
    ContractsConfig {
        flow_lend: "0xcf265b057b710867".into(),
        flow_token: "0x7e60df042a9c0868".into(),
        fungible_token: "0x9a0766d93b6608b7".into(),
    }
}

fn harness(ledger: Arc<FakeLedger>) -> Harness {
    let programs = Arc::new(Programs::new(&contracts()));
    let sync = Arc::new(PositionSync::new(
        ledger.clone(),
        programs.clone(),
        Arc::new(DashboardState::new()),
    ));
    let controller = Arc::new(TransactionController::new(
        ledger.clone(),
        ledger.clone(),
        sync.clone(),
        programs,
        &TransactionConfig::default(),
    ));
    Harness {
        ledger,
        sync,
        controller,
    }
}

fn ledger_config() -> LedgerConfig {
    LedgerConfig {
        network: "testnet".into(),
        access_node_api: "https://rest-testnet.onflow.org".into(),
        discovery_wallet: "https://fcl-discovery.onflow.org/testnet/authn".into(),
        app_detail: AppDetailConfig {
            title: "FlowLend".into(),
            icon: String::new(),
        },
        contracts: contracts(),
        wallet_connect_project_id: None,
    }
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn borrow_then_sync_shows_new_health_factor() {
    let h = harness(FakeLedger::with_position(dec!(10), dec!(100), Decimal::ZERO));
    h.sync.refresh(USER).await;

    let before = h.sync.state().snapshot().await;
    assert_eq!(
        health_summary(before.position.as_ref()).health_factor,
        HealthFactor::Infinite
    );

    let record = h.controller.execute(ActionKind::Borrow, "50").await;
    assert_eq!(record.status, TransactionStatus::Sealed);
    assert_eq!(record.amount.as_str(), "50.0");
    assert_eq!(
        h.ledger.submitted_args.lock().unwrap().last().cloned(),
        Some(vec![CadenceValue::UFix64("50.0".into())])
    );

    let after = h.sync.state().snapshot().await;
    let position = after.position.clone().unwrap();
    assert_eq!(position.borrowed.to_decimal(), dec!(50));
    let summary = health_summary(Some(&position));
    assert_eq!(summary.health_factor, HealthFactor::Finite(dec!(1.5)));
    assert_eq!(format_health_factor(summary.health_factor), "1.500");
    assert_eq!(after.health_factor.unwrap().to_decimal(), dec!(1.5));
    assert_eq!(after.tx_status.as_deref(), Some("Sealed: SEALED"));
}

#[tokio::test]
async fn logout_clears_state_without_querying() {
    let h = harness(FakeLedger::with_position(dec!(10), dec!(100), dec!(50)));
    let session = WalletSession::new(&ledger_config(), Some(USER.into()));
    let shutdown = CancellationToken::new();

    let watcher = {
        let sync = h.sync.clone();
        let rx = session.subscribe();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { sync.watch_session(rx, shutdown).await })
    };

    session.log_in().await.unwrap();
    let state = h.sync.state().clone();
    eventually(|| {
        let state = state.clone();
        async move { state.snapshot().await.pool.is_some() }
    })
    .await;
    let queries_before_logout = h.ledger.query_count();
    assert_eq!(queries_before_logout, 3);

    session.log_out().await.unwrap();
    eventually(|| {
        let state = state.clone();
        async move { state.snapshot().await.position.is_none() }
    })
    .await;

    let snap = state.snapshot().await;
    assert!(snap.pool.is_none());
    assert!(snap.health_factor.is_none());
    assert!(snap.address.is_none());
    assert_eq!(h.ledger.query_count(), queries_before_logout);

    shutdown.cancel();
    watcher.await.unwrap();
}

#[tokio::test]
async fn deposit_beyond_wallet_is_insufficient_funds() {
    let h = harness(FakeLedger::with_position(dec!(5), Decimal::ZERO, Decimal::ZERO));
    h.sync.refresh(USER).await;

    let record = h.controller.execute(ActionKind::Deposit, "25.").await;
    assert_eq!(record.status, TransactionStatus::Failed);
    assert!(record.tx_id.is_none());
    assert_eq!(
        record.status_text.as_deref(),
        Some("Error: Not enough funds in your wallet for that amount. Lower the amount or top up.")
    );
}

#[tokio::test]
async fn borrow_past_limit_fails_at_finality() {
    let h = harness(FakeLedger::with_position(dec!(0), dec!(100), Decimal::ZERO));
    h.sync.refresh(USER).await;
    let queries_before = h.ledger.query_count();

    let record = h.controller.execute(ActionKind::Borrow, "72").await;
    assert_eq!(record.status, TransactionStatus::Failed);
    assert!(record.tx_id.is_some());
    assert!(record
        .status_text
        .as_deref()
        .unwrap()
        .starts_with("Error: This action would push your health factor below the limit."));

    // No resync after a failed action.
    assert_eq!(h.ledger.query_count(), queries_before);
}

#[tokio::test]
async fn withdraw_the_max_leaves_position_at_threshold() {
    let h = harness(FakeLedger::with_position(Decimal::ZERO, dec!(100), dec!(50)));
    h.sync.refresh(USER).await;

    let summary = health_summary(h.sync.state().snapshot().await.position.as_ref());
    assert_eq!(summary.max_withdrawable, dec!(30));

    let record = h
        .controller
        .execute(ActionKind::Withdraw, &summary.max_withdrawable.to_string())
        .await;
    assert_eq!(record.status, TransactionStatus::Sealed);

    let after = h.sync.state().snapshot().await;
    let summary = health_summary(after.position.as_ref());
    assert_eq!(summary.health_factor, HealthFactor::Finite(LIQUIDATION_THRESHOLD));
    assert_eq!(summary.max_withdrawable, Decimal::ZERO);
}

#[tokio::test]
async fn submit_action_is_observable() {
    let h = harness(FakeLedger::with_position(dec!(10), Decimal::ZERO, Decimal::ZERO));
    h.sync.refresh(USER).await;

    let mut rx = h.controller.submit_action(ActionKind::Deposit, "4");
    let mut seen = vec![rx.borrow_and_update().status];
    while rx.changed().await.is_ok() {
        let status = rx.borrow_and_update().status;
        seen.push(status);
        if status.is_terminal() {
            break;
        }
    }

    assert_eq!(seen.first(), Some(&TransactionStatus::Idle));
    assert_eq!(seen.last(), Some(&TransactionStatus::Sealed));
    assert!(seen.contains(&TransactionStatus::Submitted));

    let state = h.sync.state().clone();
    eventually(|| {
        let state = state.clone();
        async move {
            state
                .snapshot()
                .await
                .position
                .is_some_and(|p| p.collateral.to_decimal() == dec!(4))
        }
    })
    .await;
}
