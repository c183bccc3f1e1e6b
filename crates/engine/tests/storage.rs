use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BalanceStatus, CashEventKind, ConfigAccess, DrinkRecipe, Engine, EngineError, FixedCosts,
    MoneyCents, NewCounterReading, PriceSource, SaveConfiguration,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn office_config() -> SaveConfiguration {
    SaveConfiguration {
        id: None,
        name: "Office".to_string(),
        fixed_costs: FixedCosts::new(10.0, 50),
        ingredient_prices: BTreeMap::from([
            ("coffee_beans".to_string(), 20.0),
            ("milk".to_string(), 1.2),
        ]),
        drinks: vec![
            DrinkRecipe::new("Espresso")
                .ingredient("coffee_beans", 0.007)
                .vending_price(1.2),
            DrinkRecipe::new("Mint Tea").tea_bag("Mint", 1),
        ],
    }
}

fn reading(config_id: Option<Uuid>, counters: &[(&str, i64)], cash_cents: i64) -> NewCounterReading {
    NewCounterReading {
        config_id,
        counter_data: counters
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
        cash_in_register: MoneyCents::new(cash_cents),
        notes: None,
        product_prices: BTreeMap::new(),
    }
}

#[tokio::test]
async fn save_creates_then_updates_by_name() {
    let (engine, _db) = engine_with_db().await;

    let saved = engine
        .save_configuration("alice", office_config())
        .await
        .unwrap();
    assert!(saved.created);

    let mut update = office_config();
    update.id = Some(saved.id);
    update.fixed_costs = FixedCosts::new(5.0, 25);
    let updated = engine.save_configuration("alice", update).await.unwrap();
    assert_eq!(updated.id, saved.id);
    assert!(!updated.created);

    let (config, access) = engine.configuration("alice", saved.id).await.unwrap();
    assert_eq!(access, ConfigAccess::Owner);
    assert_eq!(config.fixed_costs, FixedCosts::new(5.0, 25));
    assert_eq!(config.drinks.len(), 2);

    // Same id, different name: saved as a new configuration.
    let mut copy = office_config();
    copy.id = Some(saved.id);
    copy.name = "Office copy".to_string();
    let copied = engine.save_configuration("alice", copy).await.unwrap();
    assert!(copied.created);
    assert_ne!(copied.id, saved.id);

    let list = engine.list_configurations("alice").await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].name, "Office copy");
}

#[tokio::test]
async fn configuration_names_are_unique_per_owner() {
    let (engine, _db) = engine_with_db().await;
    engine
        .save_configuration("alice", office_config())
        .await
        .unwrap();

    let err = engine
        .save_configuration("alice", office_config())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Office".to_string()));

    // Another user may use the same name.
    assert!(
        engine
            .save_configuration("bob", office_config())
            .await
            .unwrap()
            .created
    );

    let mut blank = office_config();
    blank.name = "   ".to_string();
    assert!(matches!(
        engine.save_configuration("alice", blank).await,
        Err(EngineError::InvalidName(_))
    ));
}

#[tokio::test]
async fn sharing_grants_read_or_write() {
    let (engine, _db) = engine_with_db().await;
    let id = engine
        .save_configuration("alice", office_config())
        .await
        .unwrap()
        .id;

    assert!(matches!(
        engine.configuration("bob", id).await,
        Err(EngineError::KeyNotFound(_))
    ));

    engine
        .share_configuration("alice", id, "bob", false)
        .await
        .unwrap();
    engine
        .share_configuration("alice", id, "carol", true)
        .await
        .unwrap();

    let (_, access) = engine.configuration("bob", id).await.unwrap();
    assert_eq!(access, ConfigAccess::Viewer);
    let listed = engine.list_configurations("bob").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].owner, "alice");

    let mut edit = office_config();
    edit.id = Some(id);
    assert!(matches!(
        engine.save_configuration("bob", edit.clone()).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(!engine.save_configuration("carol", edit).await.unwrap().created);

    assert!(matches!(
        engine.record_counter_reading("bob", reading(Some(id), &[("Espresso", 1)], 0)).await,
        Err(EngineError::Forbidden(_))
    ));

    // Only the owner manages shares and deletes.
    assert!(matches!(
        engine.list_shares("carol", id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.delete_configuration("carol", id).await,
        Err(EngineError::Forbidden(_))
    ));

    let shares = engine.list_shares("alice", id).await.unwrap();
    let names: Vec<_> = shares.iter().map(|s| s.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "carol"]);

    engine
        .unshare_configuration("alice", id, "bob")
        .await
        .unwrap();
    assert!(matches!(
        engine.configuration("bob", id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.share_configuration("alice", id, "nobody", false).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn tea_bags_crud_and_prices() {
    let (engine, _db) = engine_with_db().await;

    let mint = engine
        .upsert_tea_bag("alice", None, "Mint", 0.1)
        .await
        .unwrap();
    engine
        .upsert_tea_bag("alice", None, "Earl Grey", 0.15)
        .await
        .unwrap();
    assert_eq!(
        engine.upsert_tea_bag("alice", None, " Mint ", 0.2).await,
        Err(EngineError::ExistingKey("Mint".to_string()))
    );

    let same = engine
        .upsert_tea_bag("alice", Some(mint), "Mint", 0.12)
        .await
        .unwrap();
    assert_eq!(same, mint);

    let prices = engine.tea_bag_prices("alice").await.unwrap();
    assert_eq!(prices.get("Mint"), Some(&0.12));
    assert_eq!(prices.len(), 2);

    let names: Vec<_> = engine
        .list_tea_bags("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Earl Grey", "Mint"]);

    assert!(matches!(
        engine.delete_tea_bag("bob", mint).await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine.delete_tea_bag("alice", mint).await.unwrap();
    assert_eq!(engine.tea_bag_prices("alice").await.unwrap().len(), 1);
    assert!(engine.tea_bag_prices("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn readings_reconcile_with_config_prices() {
    let (engine, _db) = engine_with_db().await;
    engine
        .upsert_tea_bag("alice", None, "Mint", 0.1)
        .await
        .unwrap();
    let id = engine
        .save_configuration("alice", office_config())
        .await
        .unwrap()
        .id;

    let first = engine
        .record_counter_reading(
            "alice",
            reading(Some(id), &[("Espresso", 10), ("Mint Tea", 4)], 50_00),
        )
        .await
        .unwrap();
    assert!(first.sales.is_none());
    // Only vending prices are stored; Mint Tea has none.
    assert_eq!(
        first.reading.product_prices.get("Espresso"),
        Some(&MoneyCents::new(120))
    );
    assert_eq!(first.reading.product_prices.get("Mint Tea"), None);

    let second = engine
        .record_counter_reading(
            "alice",
            reading(Some(id), &[("Espresso", 15), ("Mint Tea", 2)], 56_00),
        )
        .await
        .unwrap();
    let sales = second.sales.unwrap();
    assert_eq!(sales.reading_id, second.reading.id);
    assert_eq!(sales.lines[0].product, "Espresso");
    assert_eq!(sales.lines[0].units_sold, 5);
    assert_eq!(sales.lines[0].revenue, MoneyCents::new(600));
    assert_eq!(sales.lines[0].price_source, PriceSource::Recorded);
    assert_eq!(sales.counter_resets, vec!["Mint Tea".to_string()]);

    let listed = engine
        .list_counter_readings("alice", Some(id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.reading.id);
    assert!(listed[0].taken_at > listed[1].taken_at);

    // Personal scope is separate from the configuration scope.
    assert!(
        engine
            .list_counter_readings("alice", None)
            .await
            .unwrap()
            .is_empty()
    );

    let stats = engine.sales_statistics("alice", Some(id), 30).await.unwrap();
    assert_eq!(stats.total_items_sold, 5);
    assert_eq!(stats.total_revenue, MoneyCents::new(600));
    assert_eq!(stats.readings_count, 2);
    assert_eq!(stats.period_days, 30);

    let third = engine
        .record_counter_reading(
            "alice",
            reading(Some(id), &[("Espresso", 15), ("Mint Tea", 5)], 56_90),
        )
        .await
        .unwrap();
    let sales = third.sales.unwrap();
    let mint = sales
        .lines
        .iter()
        .find(|line| line.product == "Mint Tea")
        .unwrap();
    assert_eq!(mint.units_sold, 3);
    assert_eq!(mint.unit_price, MoneyCents::new(30));
    assert_eq!(mint.revenue, MoneyCents::new(90));
    assert_eq!(mint.price_source, PriceSource::ProductionCost);
}

#[tokio::test]
async fn reading_validation_and_deletion() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.record_counter_reading("alice", reading(None, &[], 0)).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine
            .record_counter_reading("alice", reading(None, &[("A", 1)], -100))
            .await,
        Err(EngineError::InvalidAmount(_))
    ));

    let first = engine
        .record_counter_reading("alice", reading(None, &[("A", 10)], 0))
        .await
        .unwrap();
    let second = engine
        .record_counter_reading("alice", reading(None, &[("A", 15)], 0))
        .await
        .unwrap();
    let third = engine
        .record_counter_reading("alice", reading(None, &[("A", 22)], 0))
        .await
        .unwrap();
    assert_eq!(third.sales.unwrap().lines[0].units_sold, 7);
    // No configuration: no price to fall back to.
    assert_eq!(
        second.sales.unwrap().lines[0].price_source,
        PriceSource::Missing
    );

    assert!(matches!(
        engine.delete_counter_reading("bob", second.reading.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine
        .delete_counter_reading("alice", second.reading.id)
        .await
        .unwrap();

    let stats = engine.sales_statistics("alice", None, 7).await.unwrap();
    assert_eq!(stats.total_items_sold, 12);
    assert_eq!(stats.readings_count, 2);
    assert_eq!(
        engine
            .list_counter_readings("alice", None)
            .await
            .unwrap()
            .last()
            .map(|r| r.id),
        Some(first.reading.id)
    );
}

#[tokio::test]
async fn cash_balance_follows_events_after_last_reading() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_cash_event("alice", None, CashEventKind::Deposit, MoneyCents::new(99_00), None)
        .await
        .unwrap();
    engine
        .record_counter_reading("alice", reading(None, &[("A", 1)], 100_00))
        .await
        .unwrap();
    engine
        .record_cash_event(
            "alice",
            None,
            CashEventKind::Deposit,
            MoneyCents::new(20_00),
            Some("change"),
        )
        .await
        .unwrap();
    engine
        .record_cash_event("alice", None, CashEventKind::Withdrawal, MoneyCents::new(5_00), None)
        .await
        .unwrap();

    let balance = engine.cash_balance("alice", None).await.unwrap();
    assert_eq!(balance.expected, MoneyCents::new(115_00));
    assert_eq!(balance.actual, MoneyCents::new(100_00));
    assert_eq!(balance.difference, MoneyCents::new(-15_00));
    assert_eq!(balance.status, BalanceStatus::Error);

    let events = engine.list_cash_events("alice", None).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, CashEventKind::Withdrawal);
    assert_eq!(events[1].description.as_deref(), Some("change"));

    assert!(matches!(
        engine
            .record_cash_event("alice", None, CashEventKind::Deposit, MoneyCents::ZERO, None)
            .await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(engine.list_cash_events("bob", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_configuration_detaches_history() {
    let (engine, db) = engine_with_db().await;
    let id = engine
        .save_configuration("alice", office_config())
        .await
        .unwrap()
        .id;
    engine
        .share_configuration("alice", id, "bob", true)
        .await
        .unwrap();
    engine
        .record_counter_reading("bob", reading(Some(id), &[("Espresso", 3)], 10_00))
        .await
        .unwrap();
    engine
        .record_cash_event("alice", Some(id), CashEventKind::Deposit, MoneyCents::new(5_00), None)
        .await
        .unwrap();

    engine.delete_configuration("alice", id).await.unwrap();

    assert!(matches!(
        engine.configuration("alice", id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.list_configurations("bob").await.unwrap().is_empty());

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM counter_readings WHERE config_id IS NULL",
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<i64>("", "n").unwrap(), 1);

    // The history now belongs to each author's personal scope.
    assert_eq!(
        engine.list_counter_readings("bob", None).await.unwrap().len(),
        1
    );
    assert_eq!(engine.list_cash_events("alice", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn users_are_created_once() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine.create_user("  dave ", "pw").await.unwrap(),
        "dave".to_string()
    );
    assert!(engine.user_exists("dave").await.unwrap());
    assert!(!engine.user_exists("erin").await.unwrap());
    assert_eq!(
        engine.create_user("dave", "other").await,
        Err(EngineError::ExistingKey("dave".to_string()))
    );
    assert!(matches!(
        engine.create_user(" ", "pw").await,
        Err(EngineError::InvalidName(_))
    ));
    assert!(matches!(
        engine.create_user("erin", "").await,
        Err(EngineError::InvalidName(_))
    ));
    assert_eq!(
        engine.list_users().await.unwrap(),
        vec!["alice", "bob", "carol", "dave"]
    );
}
