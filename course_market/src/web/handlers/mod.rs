// course_market/src/web/handlers/mod.rs

pub mod order_handlers;
pub mod purchase_handlers;
