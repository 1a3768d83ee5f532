use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use stockfolio_core::accounting::AccountingError;
use stockfolio_core::db;
use stockfolio_core::errors::Error;
use stockfolio_core::instruments::{
    Instrument, InstrumentRepository, InstrumentRepositoryTrait, InstrumentService,
    InstrumentServiceTrait, NewInstrument,
};
use stockfolio_core::ledger::{
    LedgerRepository, LedgerRepositoryTrait, NewTransaction, ACTION_BUY_TO_OPEN, ACTION_CASH_IN,
    ACTION_DIVIDEND, ACTION_SELL_TO_CLOSE, ACTION_SPLIT,
};
use stockfolio_core::market_data::ManualProvider;
use stockfolio_core::portfolios::{
    NewPortfolio, Portfolio, PortfolioRepository, PortfolioRepositoryTrait, PortfolioService,
    PortfolioServiceTrait,
};
use stockfolio_core::positions::{PositionRepository, PositionService, PositionServiceTrait};
use stockfolio_core::valuation::{ValuationService, ValuationServiceTrait};

mod common;

struct Fixture {
    pool: Arc<db::DbPool>,
    ledger: Arc<LedgerRepository>,
    portfolios: Arc<PortfolioRepository>,
    instruments: Arc<InstrumentRepository>,
    provider: Arc<ManualProvider>,
    positions: PositionService,
    valuation: ValuationService,
    portfolio_service: PortfolioService,
}

fn setup(test_id: &str) -> Fixture {
    let pool = common::setup_pool(test_id);

    let ledger = Arc::new(LedgerRepository::new(pool.clone()));
    let position_repository = Arc::new(PositionRepository::new(pool.clone()));
    let portfolios = Arc::new(PortfolioRepository::new(pool.clone()));
    let instruments = Arc::new(InstrumentRepository::new(pool.clone()));
    let provider = Arc::new(ManualProvider::new());

    let positions = PositionService::new(
        pool.clone(),
        ledger.clone(),
        position_repository.clone(),
        portfolios.clone(),
        instruments.clone(),
    );
    let valuation = ValuationService::new(
        position_repository.clone(),
        portfolios.clone(),
        provider.clone(),
    );
    let portfolio_service = PortfolioService::new(portfolios.clone());

    Fixture {
        pool,
        ledger,
        portfolios,
        instruments,
        provider,
        positions,
        valuation,
        portfolio_service,
    }
}

fn create_portfolio(fixture: &Fixture) -> Portfolio {
    fixture
        .portfolio_service
        .create_portfolio(NewPortfolio {
            id: None,
            owner_id: "owner-1".to_string(),
            name: "Growth".to_string(),
            description: None,
        })
        .expect("Failed to create portfolio")
}

fn create_instrument(fixture: &Fixture, symbol: &str) -> Instrument {
    fixture
        .instruments
        .create(NewInstrument {
            symbol: symbol.to_string(),
            ..Default::default()
        })
        .expect("Failed to create instrument")
}

fn txn(
    portfolio_id: &str,
    instrument_id: Option<&str>,
    action: &str,
    quantity: Decimal,
    unit_price: Decimal,
    fees: Decimal,
) -> NewTransaction {
    NewTransaction {
        id: None,
        portfolio_id: portfolio_id.to_string(),
        instrument_id: instrument_id.map(String::from),
        action: action.to_string(),
        txn_time: Utc::now(),
        quantity,
        unit_price,
        fees,
        split_ratio: None,
        note: None,
    }
}

#[test]
fn full_accounting_flow() {
    let fixture = setup("full_flow");
    let portfolio = create_portfolio(&fixture);
    let aapl = create_instrument(&fixture, "AAPL");

    assert!(fixture.portfolio_service.exists(&portfolio.id).unwrap());
    let owned = fixture
        .portfolio_service
        .list_portfolios_for_owner("owner-1")
        .unwrap();
    assert_eq!(owned.len(), 1);

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            None,
            ACTION_CASH_IN,
            dec!(10000),
            dec!(1),
            dec!(0),
        ))
        .unwrap();
    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(10),
            dec!(100),
            dec!(0),
        ))
        .unwrap();
    let recorded = fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(10),
            dec!(200),
            dec!(0),
        ))
        .unwrap();

    let position = recorded.position.expect("trade must touch a position");
    assert_eq!(position.quantity, dec!(20));
    assert_eq!(position.average_cost, dec!(150));
    assert_eq!(recorded.portfolio.cash_balance, dec!(7000));

    let recorded = fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_SELL_TO_CLOSE,
            dec!(20),
            dec!(180),
            dec!(5),
        ))
        .unwrap();
    let position = recorded.position.expect("trade must touch a position");
    assert_eq!(position.quantity, Decimal::ZERO);
    assert_eq!(position.average_cost, Decimal::ZERO);
    assert_eq!(recorded.portfolio.realized_pnl, dec!(595.00));
    assert_eq!(recorded.portfolio.cash_balance, dec!(10595.00));

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(10),
            dec!(150),
            dec!(0),
        ))
        .unwrap();
    let recorded = fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_DIVIDEND,
            dec!(10),
            dec!(0.5),
            dec!(0),
        ))
        .unwrap();
    assert_eq!(recorded.portfolio.realized_pnl, dec!(600.00));
    assert_eq!(recorded.portfolio.cash_balance, dec!(9100.00));

    let mut split = txn(
        &portfolio.id,
        Some(&aapl.id),
        ACTION_SPLIT,
        dec!(0),
        dec!(0),
        dec!(0),
    );
    split.split_ratio = Some(dec!(2));
    let recorded = fixture.positions.record_transaction(split).unwrap();
    let position = recorded.position.expect("split must touch a position");
    assert_eq!(position.quantity, dec!(20));
    assert_eq!(position.average_cost, dec!(75));

    // The ledger now replays to exactly the materialized state.
    fixture.positions.verify_portfolio(&portfolio.id).unwrap();

    let stored = fixture
        .portfolio_service
        .get_portfolio(&portfolio.id)
        .unwrap();
    assert_eq!(stored.cash_balance, dec!(9100.00));
    assert_eq!(stored.realized_pnl, dec!(600.00));

    let holdings = fixture.positions.get_holdings(&portfolio.id).unwrap();
    assert_eq!(holdings.len(), 1);

    let entries = fixture.ledger.replay(&portfolio.id).unwrap();
    assert_eq!(entries.len(), 7);
    // Replay order is strictly increasing in (txn_time, seq_id).
    for pair in entries.windows(2) {
        assert!((pair[0].txn_time, pair[0].seq_id) < (pair[1].txn_time, pair[1].seq_id));
    }
}

#[test]
fn valuation_marks_holdings_to_market() {
    let fixture = setup("valuation");
    let portfolio = create_portfolio(&fixture);
    let aapl = create_instrument(&fixture, "AAPL");

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            None,
            ACTION_CASH_IN,
            dec!(5000),
            dec!(1),
            dec!(0),
        ))
        .unwrap();
    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(20),
            dec!(75),
            dec!(0),
        ))
        .unwrap();

    // No quote yet: the valuation must fail as a whole.
    match fixture.valuation.value_portfolio(&portfolio.id, None) {
        Err(Error::MarketData(_)) => {}
        other => panic!("expected a market data error, got {:?}", other.map(|v| v.total_value)),
    }

    fixture.provider.set_price(&aapl.id, dec!(80));
    let valuation = fixture.valuation.value_portfolio(&portfolio.id, None).unwrap();
    assert_eq!(valuation.positions_value, dec!(1600.00));
    assert_eq!(valuation.total_value, dec!(5100.00));
    assert_eq!(valuation.positions[0].unrealized_pnl, dec!(100.00));

    // Unchanged prices: revaluation reproduces the same numbers.
    let again = fixture.valuation.value_portfolio(&portfolio.id, None).unwrap();
    assert_eq!(again.total_value, valuation.total_value);
    assert_eq!(again.positions_value, valuation.positions_value);

    let stored = fixture.portfolios.get_by_id(&portfolio.id).unwrap();
    assert_eq!(stored.total_value, dec!(5100.00));
    assert!(stored.valued_at.is_some());

    let holdings = fixture.positions.get_holdings(&portfolio.id).unwrap();
    assert_eq!(holdings[0].market_value, dec!(1600.00));
    assert!(holdings[0].valued_at.is_some());
}

#[test]
fn rejected_transaction_leaves_no_trace() {
    let fixture = setup("atomic_reject");
    let portfolio = create_portfolio(&fixture);
    let aapl = create_instrument(&fixture, "AAPL");

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            None,
            ACTION_CASH_IN,
            dec!(1000),
            dec!(1),
            dec!(0),
        ))
        .unwrap();

    // Selling with no open position must fail and roll everything back.
    let result = fixture.positions.record_transaction(txn(
        &portfolio.id,
        Some(&aapl.id),
        ACTION_SELL_TO_CLOSE,
        dec!(5),
        dec!(100),
        dec!(0),
    ));
    assert!(matches!(
        result,
        Err(Error::Accounting(AccountingError::InvalidTransaction(_)))
    ));

    let entries = fixture.ledger.replay(&portfolio.id).unwrap();
    assert_eq!(entries.len(), 1);

    let stored = fixture.portfolios.get_by_id(&portfolio.id).unwrap();
    assert_eq!(stored.cash_balance, dec!(1000.00));
    assert_eq!(stored.realized_pnl, Decimal::ZERO);

    assert!(fixture
        .positions
        .get_position_state(&portfolio.id, &aapl.id)
        .unwrap()
        .is_flat());
}

#[test]
fn verify_detects_corruption_and_rebuild_repairs_it() {
    let fixture = setup("verify_rebuild");
    let portfolio = create_portfolio(&fixture);
    let aapl = create_instrument(&fixture, "AAPL");

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            None,
            ACTION_CASH_IN,
            dec!(5000),
            dec!(1),
            dec!(0),
        ))
        .unwrap();
    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(10),
            dec!(100),
            dec!(0),
        ))
        .unwrap();

    fixture.positions.verify_portfolio(&portfolio.id).unwrap();

    // Corrupt the materialized row behind the service's back.
    {
        use stockfolio_core::schema::positions::dsl::*;
        let mut conn = fixture.pool.get().unwrap();
        diesel::update(positions.filter(portfolio_id.eq(&portfolio.id)))
            .set(quantity.eq("999"))
            .execute(&mut conn)
            .unwrap();
    }

    assert!(matches!(
        fixture.positions.verify_portfolio(&portfolio.id),
        Err(Error::Accounting(AccountingError::ReplayInconsistency(_)))
    ));

    let replayed = fixture.positions.rebuild_portfolio(&portfolio.id).unwrap();
    assert_eq!(replayed.position(&aapl.id).quantity, dec!(10));

    fixture.positions.verify_portfolio(&portfolio.id).unwrap();
    let state = fixture
        .positions
        .get_position_state(&portfolio.id, &aapl.id)
        .unwrap();
    assert_eq!(state.quantity, dec!(10));
    assert_eq!(state.average_cost, dec!(100));
}

#[test]
fn flat_positions_can_be_removed_but_open_ones_cannot() {
    let fixture = setup("remove_flat");
    let portfolio = create_portfolio(&fixture);
    let aapl = create_instrument(&fixture, "AAPL");

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            None,
            ACTION_CASH_IN,
            dec!(5000),
            dec!(1),
            dec!(0),
        ))
        .unwrap();
    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_BUY_TO_OPEN,
            dec!(10),
            dec!(100),
            dec!(0),
        ))
        .unwrap();

    assert!(fixture
        .positions
        .remove_flat_position(&portfolio.id, &aapl.id)
        .is_err());

    fixture
        .positions
        .record_transaction(txn(
            &portfolio.id,
            Some(&aapl.id),
            ACTION_SELL_TO_CLOSE,
            dec!(10),
            dec!(110),
            dec!(0),
        ))
        .unwrap();

    fixture
        .positions
        .remove_flat_position(&portfolio.id, &aapl.id)
        .unwrap();
    assert!(fixture.positions.get_holdings(&portfolio.id).unwrap().is_empty());

    // The history survives the row's removal.
    assert_eq!(fixture.ledger.replay(&portfolio.id).unwrap().len(), 3);
}

#[test]
fn instrument_profile_sync() {
    let fixture = setup("profile_sync");
    let aapl = create_instrument(&fixture, "aapl");
    assert_eq!(aapl.symbol, "AAPL");

    let service = InstrumentService::new(fixture.instruments.clone(), fixture.provider.clone());

    tokio_test::block_on(async {
        let refreshed = service.sync_profile(&aapl.id).await.unwrap();
        assert_eq!(refreshed.name.as_deref(), Some("AAPL"));

        let created = service.get_or_create_by_symbol("msft").await.unwrap();
        assert_eq!(created.symbol, "MSFT");
        let found = service.get_or_create_by_symbol("MSFT").await.unwrap();
        assert_eq!(found.id, created.id);
    });
}
