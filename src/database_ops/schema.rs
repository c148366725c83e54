//! Fixed DDL for the collection store.
//!
//! `cards` and `card_faces` are written by the importer. The collection,
//! deck and tag tables belong to the user-facing side and only reference
//! `cards.id`; the importer never touches them.

pub const CARDS: &str = r#"
CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,          -- print id, unique per print
    oracle_id TEXT,               -- shared by every reprint of the same rules text
    name TEXT NOT NULL,           -- composite for multi-faced cards, e.g. 'Fire // Ice'
    "set" TEXT NOT NULL,
    collector_number TEXT,
    lang TEXT,
    layout TEXT,
    released_at TEXT,
    mana_cost TEXT,
    cmc REAL,                     -- half points allowed
    type_line TEXT,
    oracle_text TEXT,
    flavor_text TEXT,
    power TEXT,
    toughness TEXT,
    loyalty TEXT,
    defense TEXT,
    rarity TEXT,
    colors TEXT,                  -- comma-joined, e.g. 'R,G,B'
    color_identity TEXT,
    keywords TEXT,
    produced_mana TEXT,
    edhrec_rank INTEGER,
    penny_rank INTEGER,
    reserved INTEGER NOT NULL DEFAULT 0,
    is_story_spotlight INTEGER NOT NULL DEFAULT 0,
    hand_modifier TEXT,
    life_modifier TEXT,
    artist TEXT,
    border_color TEXT,
    frame TEXT,
    frame_effects TEXT,
    full_art INTEGER NOT NULL DEFAULT 0,
    promo INTEGER NOT NULL DEFAULT 0,
    promo_types TEXT,
    variation INTEGER NOT NULL DEFAULT 0,
    finishes TEXT,                -- foil/nonfoil/etched
    oversized INTEGER NOT NULL DEFAULT 0,
    textless INTEGER NOT NULL DEFAULT 0,
    reprint INTEGER NOT NULL DEFAULT 0,
    set_name TEXT,
    set_type TEXT
);
CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name);
CREATE INDEX IF NOT EXISTS idx_cards_oracle_id ON cards(oracle_id);
"#;

pub const CARD_FACES: &str = r#"
CREATE TABLE IF NOT EXISTS card_faces (
    card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    face_index INTEGER NOT NULL,  -- 0 = front
    name TEXT NOT NULL,
    mana_cost TEXT,
    type_line TEXT,
    oracle_text TEXT,
    flavor_text TEXT,
    power TEXT,
    toughness TEXT,
    defense TEXT,
    loyalty TEXT,
    colors TEXT,
    color_indicator TEXT,
    artist TEXT,
    illustration_id TEXT,
    watermark TEXT,
    PRIMARY KEY (card_id, face_index)
);
"#;

pub const COLLECTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS collections (
    collection_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    name TEXT NOT NULL,
    description TEXT,
    date_created TEXT
);
CREATE TABLE IF NOT EXISTS collection_cards (
    collection_id INTEGER NOT NULL REFERENCES collections(collection_id),
    card_id TEXT NOT NULL REFERENCES cards(id),
    quantity INTEGER NOT NULL DEFAULT 1,
    notes TEXT,
    PRIMARY KEY (collection_id, card_id)
);
CREATE TABLE IF NOT EXISTS tags (
    tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS card_tags (
    collection_id INTEGER,
    card_id TEXT,
    tag_id INTEGER REFERENCES tags(tag_id),
    PRIMARY KEY (collection_id, card_id, tag_id),
    FOREIGN KEY (collection_id, card_id) REFERENCES collection_cards(collection_id, card_id)
);
CREATE TABLE IF NOT EXISTS decks (
    deck_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    name TEXT NOT NULL,
    description TEXT,
    date_created TEXT
);
CREATE TABLE IF NOT EXISTS deck_cards (
    deck_id INTEGER NOT NULL REFERENCES decks(deck_id),
    card_id TEXT NOT NULL REFERENCES cards(id),
    quantity INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (deck_id, card_id)
);
"#;

/// All DDL in dependency order.
pub const ALL: [&str; 3] = [CARDS, CARD_FACES, COLLECTIONS];
