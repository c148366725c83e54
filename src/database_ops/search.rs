use crate::database_ops::db::Db;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub set: String,
    pub type_line: Option<String>,
    pub faces: i64,
}

/// Substring match on card name, ordered by name then set.
pub fn search_cards_by_name(db: &Db, q: &str, limit: i64) -> rusqlite::Result<Vec<SearchHit>> {
    let pattern = format!("%{}%", q);
    let mut stmt = db.conn().prepare(
        r#"
        SELECT c.id, c.name, c."set", c.type_line,
               (SELECT COUNT(*) FROM card_faces f WHERE f.card_id = c.id) AS faces
        FROM cards c
        WHERE c.name LIKE ?1
        ORDER BY c.name, c."set"
        LIMIT ?2
        "#,
    )?;
    let rows = stmt.query_map(rusqlite::params![pattern, limit], |r| {
        Ok(SearchHit {
            id: r.get("id")?,
            name: r.get("name")?,
            set: r.get("set")?,
            type_line: r.get("type_line")?,
            faces: r.get("faces")?,
        })
    })?;
    rows.collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub cards: i64,
    pub card_faces: i64,
    pub multi_faced_cards: i64,
}

pub fn table_counts(db: &Db) -> rusqlite::Result<TableCounts> {
    let count = |sql: &str| db.conn().query_row(sql, [], |r| r.get::<_, i64>(0));
    Ok(TableCounts {
        cards: count("SELECT COUNT(*) FROM cards")?,
        card_faces: count("SELECT COUNT(*) FROM card_faces")?,
        multi_faced_cards: count("SELECT COUNT(DISTINCT card_id) FROM card_faces")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::upsert::{write_batch, CardWrite};
    use crate::normalization::{expand_faces, normalize_card};
    use serde_json::json;

    fn seeded() -> Db {
        let mut db = Db::open_in_memory().unwrap();
        db.init_schema().unwrap();
        let batch: Vec<CardWrite> = [
            json!({ "id": "b", "name": "Lightning Bolt", "set": "lea", "type_line": "Instant" }),
            json!({ "id": "h", "name": "Lightning Helix", "set": "rav" }),
            json!({ "id": "fi", "name": "Fire // Ice", "set": "apc",
                    "card_faces": [{ "name": "Fire" }, { "name": "Ice" }] }),
        ]
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let (card, faces) = normalize_card(i, v).unwrap();
            let faces = expand_faces(&card.id, faces.as_deref()).faces;
            CardWrite { card, faces }
        })
        .collect();
        write_batch(&mut db, &batch).unwrap();
        db
    }

    #[test]
    fn finds_by_substring() {
        let db = seeded();
        let hits = search_cards_by_name(&db, "lightning", 10).unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Lightning Bolt", "Lightning Helix"]);
        assert_eq!(hits[0].type_line.as_deref(), Some("Instant"));

        let split = search_cards_by_name(&db, "Ice", 10).unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].faces, 2);
    }

    #[test]
    fn hits_serialize_for_json_output() {
        let db = seeded();
        let hits = search_cards_by_name(&db, "Bolt", 10).unwrap();
        assert_eq!(
            serde_json::to_value(&hits).unwrap(),
            json!([{ "id": "b", "name": "Lightning Bolt", "set": "lea",
                     "type_line": "Instant", "faces": 0 }])
        );
    }

    #[test]
    fn counts_rows() {
        let db = seeded();
        assert_eq!(
            table_counts(&db).unwrap(),
            TableCounts {
                cards: 3,
                card_faces: 2,
                multi_faced_cards: 1
            }
        );
    }
}
