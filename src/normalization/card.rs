use serde_json::Value;

use super::fields::{flag_to_int, flatten_list, FieldIssue, RawFields};
use crate::error::{NormalizeError, RecordRef};

const DEFAULT_LANG: &str = "en";

/// Parsed but not yet normalized card record.
///
/// Every optional source key is an `Option`; list keys keep `Some(vec![])`
/// apart from `None` so callers can still tell "empty" from "absent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCard {
    pub id: String,
    pub name: String,
    pub set: String,
    pub oracle_id: Option<String>,
    pub collector_number: Option<String>,
    pub lang: Option<String>,
    pub layout: Option<String>,
    pub released_at: Option<String>,
    pub mana_cost: Option<String>,
    pub cmc: Option<f64>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub flavor_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub rarity: Option<String>,
    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub produced_mana: Option<Vec<String>>,
    pub edhrec_rank: Option<i64>,
    pub penny_rank: Option<i64>,
    pub reserved: Option<bool>,
    pub is_story_spotlight: Option<bool>,
    pub hand_modifier: Option<String>,
    pub life_modifier: Option<String>,
    pub artist: Option<String>,
    pub border_color: Option<String>,
    pub frame: Option<String>,
    pub frame_effects: Option<Vec<String>>,
    pub full_art: Option<bool>,
    pub promo: Option<bool>,
    pub promo_types: Option<Vec<String>>,
    pub variation: Option<bool>,
    pub finishes: Option<Vec<String>>,
    pub oversized: Option<bool>,
    pub textless: Option<bool>,
    pub reprint: Option<bool>,
    pub set_name: Option<String>,
    pub set_type: Option<String>,
    pub card_faces: Option<Vec<Value>>,
}

/// One `cards` row, column for column.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub id: String,
    pub oracle_id: Option<String>,
    pub name: String,
    pub set: String,
    pub collector_number: Option<String>,
    pub lang: String,
    pub layout: Option<String>,
    pub released_at: Option<String>,
    pub mana_cost: String,
    pub cmc: f64,
    pub type_line: Option<String>,
    pub oracle_text: String,
    pub flavor_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub rarity: Option<String>,
    pub colors: String,
    pub color_identity: String,
    pub keywords: String,
    pub produced_mana: String,
    pub edhrec_rank: Option<i64>,
    pub penny_rank: Option<i64>,
    pub reserved: i64,
    pub is_story_spotlight: i64,
    pub hand_modifier: Option<String>,
    pub life_modifier: Option<String>,
    pub artist: Option<String>,
    pub border_color: Option<String>,
    pub frame: Option<String>,
    pub frame_effects: String,
    pub full_art: i64,
    pub promo: i64,
    pub promo_types: String,
    pub variation: i64,
    pub finishes: String,
    pub oversized: i64,
    pub textless: i64,
    pub reprint: i64,
    pub set_name: Option<String>,
    pub set_type: Option<String>,
}

/// Best-effort identifier lookup used to label errors before parsing succeeds.
pub fn peek_card_id(value: &Value) -> Option<String> {
    value
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

impl RawCard {
    /// Parse a source record at `position` in the catalog array.
    pub fn parse(position: usize, value: &Value) -> Result<Self, NormalizeError> {
        let record = RecordRef {
            position,
            card_id: peek_card_id(value),
        };
        let Some(obj) = value.as_object() else {
            return Err(NormalizeError::InvalidField {
                record,
                field: "<record>".to_string(),
                reason: "expected JSON object".to_string(),
            });
        };
        let f = RawFields::new(obj);
        let invalid = |issue: FieldIssue| NormalizeError::InvalidField {
            record: record.clone(),
            field: issue.field,
            reason: issue.reason,
        };
        let required = |key: &'static str| -> Result<String, NormalizeError> {
            f.required_text(key)
                .map_err(invalid)?
                .ok_or_else(|| NormalizeError::MissingField {
                    record: record.clone(),
                    field: key,
                })
        };

        let id = required("id")?;
        let name = required("name")?;
        let set = required("set")?;

        let text = |key: &str| f.text(key).map_err(invalid);
        let list = |key: &str| f.list(key).map_err(invalid);
        let flag = |key: &str| f.flag(key).map_err(invalid);
        let int = |key: &str| f.integer(key).map_err(invalid);

        Ok(Self {
            id,
            name,
            set,
            oracle_id: text("oracle_id")?,
            collector_number: text("collector_number")?,
            lang: text("lang")?,
            layout: text("layout")?,
            released_at: text("released_at")?,
            mana_cost: text("mana_cost")?,
            cmc: f.number("cmc").map_err(invalid)?,
            type_line: text("type_line")?,
            oracle_text: text("oracle_text")?,
            flavor_text: text("flavor_text")?,
            power: text("power")?,
            toughness: text("toughness")?,
            loyalty: text("loyalty")?,
            defense: text("defense")?,
            rarity: text("rarity")?,
            colors: list("colors")?,
            color_identity: list("color_identity")?,
            keywords: list("keywords")?,
            produced_mana: list("produced_mana")?,
            edhrec_rank: int("edhrec_rank")?,
            penny_rank: int("penny_rank")?,
            reserved: flag("reserved")?,
            is_story_spotlight: flag("is_story_spotlight")?,
            hand_modifier: text("hand_modifier")?,
            life_modifier: text("life_modifier")?,
            artist: text("artist")?,
            border_color: text("border_color")?,
            frame: text("frame")?,
            frame_effects: list("frame_effects")?,
            full_art: flag("full_art")?,
            promo: flag("promo")?,
            promo_types: list("promo_types")?,
            variation: flag("variation")?,
            finishes: list("finishes")?,
            oversized: flag("oversized")?,
            textless: flag("textless")?,
            reprint: flag("reprint")?,
            set_name: text("set_name")?,
            set_type: text("set_type")?,
            card_faces: f.objects("card_faces").map_err(invalid)?,
        })
    }

    /// Apply defaults and flattening. Pure; consumes the parsed record except
    /// for the raw face list, which the face expander needs afterwards.
    pub fn normalize(self) -> (CardRow, Option<Vec<Value>>) {
        let row = CardRow {
            lang: self.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            mana_cost: self.mana_cost.unwrap_or_default(),
            cmc: self.cmc.unwrap_or(0.0),
            oracle_text: self.oracle_text.unwrap_or_default(),
            colors: flatten_list(self.colors.as_deref()),
            color_identity: flatten_list(self.color_identity.as_deref()),
            keywords: flatten_list(self.keywords.as_deref()),
            produced_mana: flatten_list(self.produced_mana.as_deref()),
            reserved: flag_to_int(self.reserved),
            is_story_spotlight: flag_to_int(self.is_story_spotlight),
            frame_effects: flatten_list(self.frame_effects.as_deref()),
            full_art: flag_to_int(self.full_art),
            promo: flag_to_int(self.promo),
            promo_types: flatten_list(self.promo_types.as_deref()),
            variation: flag_to_int(self.variation),
            finishes: flatten_list(self.finishes.as_deref()),
            oversized: flag_to_int(self.oversized),
            textless: flag_to_int(self.textless),
            reprint: flag_to_int(self.reprint),
            id: self.id,
            oracle_id: self.oracle_id,
            name: self.name,
            set: self.set,
            collector_number: self.collector_number,
            layout: self.layout,
            released_at: self.released_at,
            type_line: self.type_line,
            flavor_text: self.flavor_text,
            power: self.power,
            toughness: self.toughness,
            loyalty: self.loyalty,
            defense: self.defense,
            rarity: self.rarity,
            edhrec_rank: self.edhrec_rank,
            penny_rank: self.penny_rank,
            hand_modifier: self.hand_modifier,
            life_modifier: self.life_modifier,
            artist: self.artist,
            border_color: self.border_color,
            frame: self.frame,
            set_name: self.set_name,
            set_type: self.set_type,
        };
        (row, self.card_faces)
    }
}

/// Parse and normalize one source record.
pub fn normalize_card(
    position: usize,
    value: &Value,
) -> Result<(CardRow, Option<Vec<Value>>), NormalizeError> {
    RawCard::parse(position, value).map(RawCard::normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bolt() -> Value {
        json!({
            "id": "bolt-1",
            "oracle_id": "oracle-bolt",
            "name": "Lightning Bolt",
            "set": "lea",
            "cmc": 1.0,
            "mana_cost": "{R}",
            "type_line": "Instant",
            "oracle_text": "Lightning Bolt deals 3 damage to any target.",
            "colors": ["R"],
            "color_identity": ["R"],
            "finishes": ["nonfoil", "foil"],
            "reserved": false,
            "reprint": true,
            "edhrec_rank": 12
        })
    }

    #[test]
    fn normalizes_scalar_and_list_fields() {
        let (row, faces) = normalize_card(0, &bolt()).unwrap();
        assert_eq!(row.id, "bolt-1");
        assert_eq!(row.colors, "R");
        assert_eq!(row.finishes, "nonfoil,foil");
        assert_eq!(row.keywords, "");
        assert_eq!(row.reprint, 1);
        assert_eq!(row.reserved, 0);
        assert_eq!(row.edhrec_rank, Some(12));
        assert!(faces.is_none());
    }

    #[test]
    fn substitutes_defaults_for_absent_fields() {
        let (row, _) =
            normalize_card(3, &json!({ "id": "x", "name": "Plain", "set": "m10" })).unwrap();
        assert_eq!(row.cmc, 0.0);
        assert_eq!(row.mana_cost, "");
        assert_eq!(row.oracle_text, "");
        assert_eq!(row.lang, "en");
        assert_eq!(row.flavor_text, None);
        assert_eq!(row.type_line, None);
        assert_eq!(row.colors, "");
        assert_eq!(row.reserved, 0);
        assert_eq!(row.is_story_spotlight, 0);
    }

    #[test]
    fn keeps_half_point_mana_values() {
        let mut v = bolt();
        v["cmc"] = json!(0.5);
        let (row, _) = normalize_card(0, &v).unwrap();
        assert_eq!(row.cmc, 0.5);
    }

    #[test]
    fn missing_identifier_reports_position() {
        let err = normalize_card(7, &json!({ "name": "Nameless", "set": "lea" })).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingField {
                record: RecordRef {
                    position: 7,
                    card_id: None
                },
                field: "id",
            }
        );
    }

    #[test]
    fn missing_set_reports_identifier() {
        let err = normalize_card(1, &json!({ "id": "abc", "name": "Orphan" })).unwrap_err();
        assert_eq!(err.record().card_id.as_deref(), Some("abc"));
        assert!(matches!(err, NormalizeError::MissingField { field: "set", .. }));
    }

    #[test]
    fn wrong_type_is_invalid_field() {
        let mut v = bolt();
        v["colors"] = json!("R");
        let err = normalize_card(0, &v).unwrap_err();
        match err {
            NormalizeError::InvalidField { field, .. } => assert_eq!(field, "colors"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert!(normalize_card(0, &json!(["not", "a", "card"])).is_err());
    }

    #[test]
    fn face_list_is_passed_through_untouched() {
        let v = json!({
            "id": "fi", "name": "Fire // Ice", "set": "apc",
            "card_faces": [{ "name": "Fire" }, { "name": "Ice" }]
        });
        let (_, faces) = normalize_card(0, &v).unwrap();
        assert_eq!(faces.map(|f| f.len()), Some(2));
    }
}
