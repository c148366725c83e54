use rusqlite::{params, Transaction};
use tracing::{debug, instrument};

use super::db::Db;
use crate::error::ImportError;
use crate::normalization::{CardFaceRow, CardRow};

const UPSERT_CARD_SQL: &str = r#"
INSERT INTO cards (
    id, oracle_id, name, "set", collector_number, lang,
    layout, released_at, mana_cost, cmc, type_line,
    oracle_text, flavor_text, power, toughness, loyalty, defense, rarity, colors, color_identity,
    keywords, produced_mana, edhrec_rank, penny_rank, reserved, is_story_spotlight, hand_modifier, life_modifier,
    artist, border_color, frame, frame_effects, full_art,
    promo, promo_types, variation, finishes, oversized, textless, reprint, set_name, set_type
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21,
    ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38, ?39, ?40, ?41, ?42
)
ON CONFLICT (id) DO UPDATE SET
    oracle_id = excluded.oracle_id,
    name = excluded.name,
    "set" = excluded."set",
    collector_number = excluded.collector_number,
    lang = excluded.lang,
    layout = excluded.layout,
    released_at = excluded.released_at,
    mana_cost = excluded.mana_cost,
    cmc = excluded.cmc,
    type_line = excluded.type_line,
    oracle_text = excluded.oracle_text,
    flavor_text = excluded.flavor_text,
    power = excluded.power,
    toughness = excluded.toughness,
    loyalty = excluded.loyalty,
    defense = excluded.defense,
    rarity = excluded.rarity,
    colors = excluded.colors,
    color_identity = excluded.color_identity,
    keywords = excluded.keywords,
    produced_mana = excluded.produced_mana,
    edhrec_rank = excluded.edhrec_rank,
    penny_rank = excluded.penny_rank,
    reserved = excluded.reserved,
    is_story_spotlight = excluded.is_story_spotlight,
    hand_modifier = excluded.hand_modifier,
    life_modifier = excluded.life_modifier,
    artist = excluded.artist,
    border_color = excluded.border_color,
    frame = excluded.frame,
    frame_effects = excluded.frame_effects,
    full_art = excluded.full_art,
    promo = excluded.promo,
    promo_types = excluded.promo_types,
    variation = excluded.variation,
    finishes = excluded.finishes,
    oversized = excluded.oversized,
    textless = excluded.textless,
    reprint = excluded.reprint,
    set_name = excluded.set_name,
    set_type = excluded.set_type
"#;

const DELETE_FACES_SQL: &str = "DELETE FROM card_faces WHERE card_id = ?1";

const UPSERT_FACE_SQL: &str = r#"
INSERT OR REPLACE INTO card_faces (
    card_id, face_index, name, mana_cost,
    type_line, oracle_text, flavor_text, power, toughness, defense,
    loyalty, colors, color_indicator, artist, illustration_id, watermark
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
"#;

/// A card and the complete face list it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct CardWrite {
    pub card: CardRow,
    pub faces: Vec<CardFaceRow>,
}

/// Totals for one committed batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub cards: usize,
    pub faces: usize,
}

/// Write one card with full-row replace semantics and swap its face rows.
///
/// Existing faces for the card are deleted first so a layout that shrank
/// (two faces down to one, or to none) never leaves stale rows behind.
pub fn upsert_card(tx: &Transaction<'_>, write: &CardWrite) -> rusqlite::Result<usize> {
    let c = &write.card;
    let mut card_stmt = tx.prepare_cached(UPSERT_CARD_SQL)?;
    card_stmt.execute(params![
        c.id,
        c.oracle_id,
        c.name,
        c.set,
        c.collector_number,
        c.lang,
        c.layout,
        c.released_at,
        c.mana_cost,
        c.cmc,
        c.type_line,
        c.oracle_text,
        c.flavor_text,
        c.power,
        c.toughness,
        c.loyalty,
        c.defense,
        c.rarity,
        c.colors,
        c.color_identity,
        c.keywords,
        c.produced_mana,
        c.edhrec_rank,
        c.penny_rank,
        c.reserved,
        c.is_story_spotlight,
        c.hand_modifier,
        c.life_modifier,
        c.artist,
        c.border_color,
        c.frame,
        c.frame_effects,
        c.full_art,
        c.promo,
        c.promo_types,
        c.variation,
        c.finishes,
        c.oversized,
        c.textless,
        c.reprint,
        c.set_name,
        c.set_type,
    ])?;

    tx.prepare_cached(DELETE_FACES_SQL)?.execute([&c.id])?;

    let mut face_stmt = tx.prepare_cached(UPSERT_FACE_SQL)?;
    for f in &write.faces {
        face_stmt.execute(params![
            f.card_id,
            f.face_index as i64,
            f.name,
            f.mana_cost,
            f.type_line,
            f.oracle_text,
            f.flavor_text,
            f.power,
            f.toughness,
            f.defense,
            f.loyalty,
            f.colors,
            f.color_indicator,
            f.artist,
            f.illustration_id,
            f.watermark,
        ])?;
    }
    Ok(write.faces.len())
}

/// Persist a batch inside one transaction. Either every card in `batch`
/// commits or none does; on failure the error names the whole batch.
#[instrument(skip_all, fields(cards = batch.len()))]
pub fn write_batch(db: &mut Db, batch: &[CardWrite]) -> Result<BatchOutcome, ImportError> {
    if batch.is_empty() {
        return Ok(BatchOutcome::default());
    }
    let batch_ids = || batch.iter().map(|w| w.card.id.clone()).collect::<Vec<_>>();
    let fail = |source: rusqlite::Error| ImportError::WriteFailure {
        card_ids: batch_ids(),
        source,
    };

    let tx = db.transaction().map_err(fail)?;
    let mut outcome = BatchOutcome::default();
    for write in batch {
        outcome.faces += upsert_card(&tx, write).map_err(|source| {
            debug!(card_id = %write.card.id, error = %source, "card write rejected");
            fail(source)
        })?;
        outcome.cards += 1;
    }
    tx.commit().map_err(fail)?;
    Ok(outcome)
}
