use mtg_collection::orchestrator::NoProgress;
use mtg_collection::{import_catalog, Db, ImportError, ImportOptions};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

fn write_catalog(cards: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(cards.to_string().as_bytes()).expect("write");
    file
}

fn catalog() -> Value {
    json!([
        {
            "id": "e3285e6b-3e79-4d7c-bf96-d920f973b80d",
            "oracle_id": "4457ed35-7c10-48c8-9776-456485fdf070",
            "name": "Lightning Bolt",
            "set": "lea",
            "collector_number": "161",
            "layout": "normal",
            "mana_cost": "{R}",
            "cmc": 1.0,
            "type_line": "Instant",
            "oracle_text": "Lightning Bolt deals 3 damage to any target.",
            "colors": ["R"],
            "color_identity": ["R"],
            "keywords": [],
            "finishes": ["nonfoil"],
            "rarity": "common",
            "reserved": false
        },
        {
            "id": "b6e5f3a8-5b1c-4a3b-9a4e-1f0b2f1c9e77",
            "name": "Fire // Ice",
            "set": "apc",
            "layout": "split",
            "cmc": 4.0,
            "colors": ["U", "R"],
            "card_faces": [
                { "name": "Fire", "mana_cost": "{1}{R}", "type_line": "Instant",
                  "oracle_text": "Fire deals 2 damage divided as you choose among one or two targets." },
                { "name": "Ice", "mana_cost": "{1}{U}", "type_line": "Instant",
                  "oracle_text": "Tap target permanent.\nDraw a card." }
            ]
        },
        {
            "id": "0a4ef7f4-6c4b-4b3e-8c5e-3b2a1c0d9f10",
            "name": "Black Lotus",
            "set": "lea",
            "cmc": 0,
            "reserved": true
        }
    ])
}

fn open_store(dir: &TempDir) -> Db {
    Db::open(dir.path().join("collection.db")).expect("open store")
}

fn snapshot(db: &Db) -> Vec<String> {
    let mut out = Vec::new();
    for sql in [
        "SELECT id || '|' || name || '|' || colors || '|' || cmc || '|' || reserved FROM cards ORDER BY id",
        "SELECT card_id || '|' || face_index || '|' || name FROM card_faces ORDER BY card_id, face_index",
    ] {
        let mut stmt = db.conn().prepare(sql).unwrap();
        let rows = stmt
            .query_map([], |r| r.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        out.extend(rows);
    }
    out
}

fn run(db: &mut Db, path: &Path) -> Result<mtg_collection::ImportSummary, ImportError> {
    import_catalog(db, path, &ImportOptions::default(), &NoProgress)
}

#[test]
fn end_to_end_two_card_catalog() {
    let dir = TempDir::new().unwrap();
    let source = write_catalog(&catalog());
    let mut db = open_store(&dir);

    let summary = run(&mut db, source.path()).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.faces_written, 2);
    assert_eq!(summary.to_string().lines().next(), Some("Imported 3 cards. (2 card faces)"));

    let colors: String = db
        .conn()
        .query_row(
            "SELECT colors FROM cards WHERE name = 'Lightning Bolt'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(colors, "R");

    let faces: Vec<(i64, String)> = {
        let mut stmt = db
            .conn()
            .prepare(
                "SELECT f.face_index, f.name FROM card_faces f JOIN cards c ON c.id = f.card_id \
                 WHERE c.name = 'Fire // Ice' ORDER BY f.face_index",
            )
            .unwrap();
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        rows
    };
    assert_eq!(faces, vec![(0, "Fire".to_string()), (1, "Ice".to_string())]);
}

#[test]
fn reimport_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let source = write_catalog(&catalog());
    let mut db = open_store(&dir);

    run(&mut db, source.path()).unwrap();
    let once = snapshot(&db);
    run(&mut db, source.path()).unwrap();
    assert_eq!(snapshot(&db), once);
    assert_eq!(once.len(), 5);
    assert!(once.contains(&"0a4ef7f4-6c4b-4b3e-8c5e-3b2a1c0d9f10|Black Lotus||0.0|1".to_string()));
}

#[test]
fn reimport_with_fewer_faces_clears_stale_rows() {
    let dir = TempDir::new().unwrap();
    let mut db = open_store(&dir);
    run(&mut db, write_catalog(&catalog()).path()).unwrap();

    let mut corrected = catalog();
    corrected[1]["card_faces"] = json!([{ "name": "Fire" }]);
    run(&mut db, write_catalog(&corrected).path()).unwrap();

    let faces: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM card_faces", [], |r| r.get(0))
        .unwrap();
    assert_eq!(faces, 1);
}

#[test]
fn record_without_identifier_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut cards = catalog();
    cards
        .as_array_mut()
        .unwrap()
        .push(json!({ "name": "Mystery", "set": "unk", "reserved": true }));
    let mut db = open_store(&dir);

    let summary = run(&mut db, write_catalog(&cards).path()).unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].record.position, 3);
    let mystery: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM cards WHERE name = 'Mystery'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(mystery, 0);
}

#[test]
fn unreadable_or_invalid_source_aborts_before_writes() {
    let dir = TempDir::new().unwrap();
    let mut db = open_store(&dir);

    let missing = dir.path().join("does-not-exist.json");
    assert!(matches!(
        run(&mut db, &missing),
        Err(ImportError::SourceRead { .. })
    ));

    let mut truncated = NamedTempFile::new().unwrap();
    truncated
        .write_all(br#"[{"id": "a", "name": "A", "set": "x"}, {"id": "#)
        .unwrap();
    assert!(matches!(
        run(&mut db, truncated.path()),
        Err(ImportError::SourceParse { .. })
    ));

    let not_array = write_catalog(&json!({ "id": "a", "name": "A", "set": "x" }));
    assert!(matches!(
        run(&mut db, not_array.path()),
        Err(ImportError::SourceParse { .. })
    ));

    assert!(!db.table_exists("cards").unwrap());
}

#[test]
fn strict_abort_commits_nothing_from_the_open_batch() {
    let dir = TempDir::new().unwrap();
    let mut cards = catalog();
    cards
        .as_array_mut()
        .unwrap()
        .push(json!({ "name": "Mystery", "set": "unk" }));
    let mut db = open_store(&dir);
    let opts = ImportOptions {
        strict: true,
        ..ImportOptions::default()
    };

    let err = import_catalog(&mut db, write_catalog(&cards).path(), &opts, &NoProgress)
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedRecord(_)));
    assert!(snapshot(&db).is_empty());
}
