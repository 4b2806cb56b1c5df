pub mod filter_bar;
pub mod lead_detail;
pub mod lead_form;
pub mod nav_bar;
pub mod new_lead_modal;
pub mod spinner;
pub mod stat_card;
