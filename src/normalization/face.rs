use serde_json::Value;

use super::fields::{flatten_list, FieldIssue, RawFields};
use crate::error::FaceError;

/// One `card_faces` row. `face_index` is the position in the source list.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFaceRow {
    pub card_id: String,
    pub face_index: usize,
    pub name: String,
    pub mana_cost: String,
    pub type_line: Option<String>,
    pub oracle_text: String,
    pub flavor_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub defense: Option<String>,
    pub loyalty: Option<String>,
    pub colors: String,
    pub color_indicator: String,
    pub artist: Option<String>,
    pub illustration_id: Option<String>,
    pub watermark: Option<String>,
}

/// Result of expanding one card's face list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FaceExpansion {
    pub faces: Vec<CardFaceRow>,
    pub skipped: Vec<FaceError>,
}

fn normalize_face(card_id: &str, face_index: usize, value: &Value) -> Result<CardFaceRow, FaceError> {
    let Some(obj) = value.as_object() else {
        return Err(FaceError::Invalid {
            card_id: card_id.to_string(),
            face_index,
            reason: "expected JSON object".to_string(),
        });
    };
    let f = RawFields::new(obj);
    let invalid = |issue: FieldIssue| FaceError::Invalid {
        card_id: card_id.to_string(),
        face_index,
        reason: format!("`{}`: {}", issue.field, issue.reason),
    };
    let text = |key: &str| f.text(key).map_err(invalid);
    let list = |key: &str| f.list(key).map_err(invalid);

    let name = f
        .required_text("name")
        .map_err(invalid)?
        .ok_or_else(|| FaceError::MissingField {
            card_id: card_id.to_string(),
            face_index,
            field: "name",
        })?;

    Ok(CardFaceRow {
        card_id: card_id.to_string(),
        face_index,
        name,
        mana_cost: text("mana_cost")?.unwrap_or_default(),
        type_line: text("type_line")?,
        oracle_text: text("oracle_text")?.unwrap_or_default(),
        flavor_text: text("flavor_text")?,
        power: text("power")?,
        toughness: text("toughness")?,
        defense: text("defense")?,
        loyalty: text("loyalty")?,
        colors: flatten_list(list("colors")?.as_deref()),
        color_indicator: flatten_list(list("color_indicator")?.as_deref()),
        artist: text("artist")?,
        illustration_id: text("illustration_id")?,
        watermark: text("watermark")?,
    })
}

/// Expand a card's `card_faces` list into ordered face rows.
///
/// A face that fails to normalize is reported in `skipped` and does not
/// affect its siblings. Indices always follow source positions, so a skipped
/// middle face leaves a gap instead of shifting the faces after it.
pub fn expand_faces(card_id: &str, faces: Option<&[Value]>) -> FaceExpansion {
    let mut out = FaceExpansion::default();
    for (face_index, value) in faces.unwrap_or_default().iter().enumerate() {
        match normalize_face(card_id, face_index, value) {
            Ok(row) => out.faces.push(row),
            Err(err) => out.skipped.push(err),
        }
    }
    out
}
