// course_market/src/services/mod.rs

pub mod entitlements;
pub mod gateway;
pub mod order_ledger;
pub mod purchase_recorder;
pub mod signature;

pub use entitlements::EntitlementService;
pub use gateway::{build_gateway, FakeGateway, PaymentConfirmation, PaymentGateway, RazorpayGateway, RemoteOrder};
pub use order_ledger::OrderLedger;
pub use purchase_recorder::PurchaseRecorder;
