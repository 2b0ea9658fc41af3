//! Library-level tests driving the import engine against the SQLite store.

use std::path::PathBuf;

use qsolog::config::{Config, DbConfig, ExportConfig, LotwConfig};
use qsolog::import::import_adif;
use qsolog::sqlite_store::SqliteStore;
use qsolog_core::adif::Decoder;
use qsolog_core::collapse::collapse_duplicates;
use qsolog_core::models::{ImportPolicy, QsoRecord};
use qsolog_core::progress::NoProgress;
use qsolog_core::store::ContactStore;
use tempfile::TempDir;

const LOG: &str = "<CALL:4>W1AW<QSO_DATE:8>20250920<TIME_ON:4>1430<FREQ:6>14.205<EOR>\n\
<CALL:5>K1ABC<QSO_DATE:8>20250921<TIME_ON:4>0100<FREQ:5>7.074<MODE:2>CW<TX_PWR:3>100<QSL_RCVD:1>Y<EOR>\n";

async fn open_store() -> (TempDir, SqliteStore) {
    let tmp = TempDir::new().unwrap();
    let config = Config {
        db: DbConfig {
            path: PathBuf::from(tmp.path()).join("data").join("qso.sqlite"),
        },
        import: ImportPolicy::default(),
        lotw: LotwConfig::default(),
        export: ExportConfig::default(),
    };
    let store = SqliteStore::open(&config).await.unwrap();
    (tmp, store)
}

fn policy(merge_duplicates: bool, update_existing: bool) -> ImportPolicy {
    ImportPolicy {
        merge_duplicates,
        update_existing,
    }
}

#[tokio::test]
async fn test_sqlite_round_trips_every_field() {
    let (_tmp, store) = open_store().await;
    let outcome = import_adif(
        &store,
        LOG,
        "log.adi",
        policy(false, false),
        &Decoder::new(),
        &NoProgress,
    )
    .await;
    assert_eq!(outcome.imported, 2);

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    let k1abc = all.iter().find(|c| c.record.callsign == "K1ABC").unwrap();
    let expected = QsoRecord {
        callsign: "K1ABC".to_string(),
        date: "2025-09-21".to_string(),
        time_on: "01:00:00".to_string(),
        time_off: "01:00:00".to_string(),
        frequency_mhz: 7.074,
        band: "40m".to_string(),
        mode: "CW".to_string(),
        rst_sent: "59".to_string(),
        rst_received: "59".to_string(),
        power_watts: 100,
        confirmed: true,
        ..Default::default()
    };
    assert_eq!(k1abc.record, expected);
    assert!(k1abc.created_at > 0);
    assert_eq!(k1abc.id.len(), 36);
}

#[tokio::test]
async fn test_merge_then_update_policies() {
    let (_tmp, store) = open_store().await;
    let decoder = Decoder::new();

    import_adif(&store, LOG, "a.adi", policy(true, false), &decoder, &NoProgress).await;
    let again = import_adif(&store, LOG, "a.adi", policy(true, false), &decoder, &NoProgress).await;
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, 2);

    let changed = LOG.replace("<MODE:2>CW", "<MODE:3>RTTY");
    let updated =
        import_adif(&store, &changed, "b.adi", policy(false, true), &decoder, &NoProgress).await;
    assert_eq!(updated.imported, 2);
    assert_eq!(store.count().await.unwrap(), 2);

    let key = QsoRecord {
        callsign: "K1ABC".to_string(),
        date: "2025-09-21".to_string(),
        time_on: "01:00:00".to_string(),
        ..Default::default()
    }
    .dedup_key();
    let found = store.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(found.record.mode, "RTTY");
}

#[tokio::test]
async fn test_collapse_on_sqlite() {
    let (_tmp, store) = open_store().await;
    let decoder = Decoder::new();
    for _ in 0..3 {
        import_adif(&store, LOG, "log.adi", policy(false, false), &decoder, &NoProgress).await;
    }
    assert_eq!(store.count().await.unwrap(), 6);

    let outcome = collapse_duplicates(&store).await.unwrap();
    assert_eq!(outcome.groups_merged, 2);
    assert_eq!(outcome.removed, 4);
    assert!(outcome.errors.is_empty());
    assert_eq!(store.count().await.unwrap(), 2);

    let again = collapse_duplicates(&store).await.unwrap();
    assert_eq!(again.removed, 0);
}

#[tokio::test]
async fn test_list_between_is_inclusive() {
    let (_tmp, store) = open_store().await;
    import_adif(
        &store,
        LOG,
        "log.adi",
        policy(false, false),
        &Decoder::new(),
        &NoProgress,
    )
    .await;

    let both = store
        .list_between(Some("2025-09-20"), Some("2025-09-21"))
        .await
        .unwrap();
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].record.callsign, "W1AW");

    let first = store.list_between(None, Some("2025-09-20")).await.unwrap();
    assert_eq!(first.len(), 1);
    let second = store.list_between(Some("2025-09-21"), None).await.unwrap();
    assert_eq!(second[0].record.callsign, "K1ABC");
}

#[tokio::test]
async fn test_merge_group_missing_keeper_rolls_back() {
    let (_tmp, store) = open_store().await;
    import_adif(
        &store,
        LOG,
        "log.adi",
        policy(false, false),
        &Decoder::new(),
        &NoProgress,
    )
    .await;
    let all = store.list_all().await.unwrap();

    let mut ghost = all[0].clone();
    ghost.id = "not-a-real-id".to_string();
    let remove = vec![all[1].id.clone()];
    assert!(store.merge_group(&ghost, &remove).await.is_err());
    assert_eq!(store.count().await.unwrap(), 2);
}
