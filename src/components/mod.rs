pub mod date_strip;
pub mod match_card;
