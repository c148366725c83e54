pub mod card;
pub mod face;
pub mod fields;

pub use card::{normalize_card, peek_card_id, CardRow, RawCard};
pub use face::{expand_faces, CardFaceRow, FaceExpansion};
pub use fields::{flag_to_int, flatten_list, LIST_SEPARATOR};
