//! Loyalty and membership cards with generated barcodes.

mod core;

pub use core::{
    BarcodeValidation, LoyaltyCard, NewLoyaltyCard, create_loyalty_card,
    create_loyalty_card_table, delete_loyalty_card, get_loyalty_card, get_loyalty_cards,
    validate_barcode,
};
