// tests/order_ledger_tests.rs
mod common;

use common::*;
use course_market::models::OrderStatus;
use course_market::store::OrderStore;
use course_market::AppError;
use uuid::Uuid;

#[tokio::test]
async fn create_order_opens_created_order_with_gateway_id() {
  let h = Harness::new();
  let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

  let order = h.state.ledger.create_order(user, course, COURSE_PRICE, "INR").await.unwrap();

  assert_eq!(order.status, OrderStatus::Created);
  assert_eq!(order.gateway_order_id, "go_1");
  assert_eq!(order.amount, COURSE_PRICE);
  assert_eq!(order.currency, "INR");
  assert_eq!(order.user_id, user);
  assert_eq!(order.course_id, course);
  assert!(order.gateway_payment_id.is_none());
  assert!(order.gateway_signature.is_none());

  let (remote, receipt) = h.gateway.remote_order("go_1").unwrap();
  assert_eq!(remote.amount, 49_900, "gateway is called with minor units");
  assert!(receipt.starts_with("rcpt_"));
  assert!(receipt.len() <= 40);

  let stored = h.state.ledger.find_by_gateway_order_id("go_1").await.unwrap().unwrap();
  assert_eq!(stored.id, order.id);
}

#[tokio::test]
async fn create_order_for_owned_course_never_contacts_gateway() {
  let h = Harness::new();
  let (user, course) = (Uuid::new_v4(), Uuid::new_v4());
  h.buy(user, course).await;
  let calls_before = h.gateway.calls();

  let result = h.state.ledger.create_order(user, course, COURSE_PRICE, "INR").await;

  match result {
    Err(AppError::AlreadyPurchased { user_id, course_id }) => {
      assert_eq!(user_id, user);
      assert_eq!(course_id, course);
    }
    other => panic!("Expected AlreadyPurchased, got {:?}", other),
  }
  assert_eq!(h.gateway.calls(), calls_before);
  assert_eq!(h.store.order_count(), 1);
}

#[tokio::test]
async fn create_order_rejects_invalid_amounts_before_gateway() {
  let h = Harness::new();
  let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

  for amount in [0, -5, i64::MAX] {
    let result = h.state.ledger.create_order(user, course, amount, "INR").await;
    assert!(matches!(result, Err(AppError::Validation(_))), "amount {} accepted", amount);
  }
  assert_eq!(h.gateway.calls(), 0);
  assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn gateway_failure_persists_no_order_and_retry_succeeds() {
  let h = Harness::new();
  let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

  h.gateway.set_unavailable(true);
  let result = h.state.ledger.create_order(user, course, COURSE_PRICE, "INR").await;
  assert!(matches!(result, Err(ref e @ AppError::Gateway(_)) if e.is_retryable()));
  assert_eq!(h.store.order_count(), 0);

  h.gateway.set_unavailable(false);
  let order = h.state.ledger.create_order(user, course, COURSE_PRICE, "INR").await.unwrap();
  assert_eq!(order.status, OrderStatus::Created);
  assert_eq!(h.store.order_count(), 1);
}

#[tokio::test]
async fn mark_paid_records_payment_and_is_stable_on_repeat() {
  let h = Harness::new();
  let order = h
    .state
    .ledger
    .create_order(Uuid::new_v4(), Uuid::new_v4(), COURSE_PRICE, "INR")
    .await
    .unwrap();

  let paid = h.state.ledger.mark_paid(&order.gateway_order_id, "pay_1", "sig_1").await.unwrap();
  assert_eq!(paid.status, OrderStatus::Paid);
  assert_eq!(paid.gateway_payment_id.as_deref(), Some("pay_1"));
  assert_eq!(paid.gateway_signature.as_deref(), Some("sig_1"));

  // A later payment id does not overwrite the first.
  let again = h.state.ledger.mark_paid(&order.gateway_order_id, "pay_2", "sig_2").await.unwrap();
  assert_eq!(again.status, OrderStatus::Paid);
  assert_eq!(again.gateway_payment_id.as_deref(), Some("pay_1"));
}

#[tokio::test]
async fn transitions_on_unknown_order_report_not_found() {
  let h = Harness::new();

  let paid = h.state.ledger.mark_paid("go_missing", "pay_1", "sig").await;
  assert!(matches!(paid, Err(AppError::OrderNotFound(ref id)) if id == "go_missing"));

  let failed = h.state.ledger.mark_failed("go_missing").await;
  assert!(matches!(failed, Err(AppError::OrderNotFound(_))));
}

#[tokio::test]
async fn terminal_states_do_not_change() {
  let h = Harness::new();
  let ledger = &h.state.ledger;
  let first = ledger.create_order(Uuid::new_v4(), Uuid::new_v4(), COURSE_PRICE, "INR").await.unwrap();
  let second = ledger.create_order(Uuid::new_v4(), Uuid::new_v4(), COURSE_PRICE, "INR").await.unwrap();

  let failed = ledger.mark_failed(&first.gateway_order_id).await.unwrap();
  assert_eq!(failed.status, OrderStatus::Failed);
  assert_eq!(ledger.mark_failed(&first.gateway_order_id).await.unwrap().status, OrderStatus::Failed);
  assert!(matches!(
    ledger.mark_paid(&first.gateway_order_id, "pay_1", "sig").await,
    Err(AppError::OrderClosed { status: OrderStatus::Failed, .. })
  ));

  ledger.mark_paid(&second.gateway_order_id, "pay_2", "sig").await.unwrap();
  assert!(matches!(
    ledger.mark_failed(&second.gateway_order_id).await,
    Err(AppError::OrderClosed { status: OrderStatus::Paid, .. })
  ));
  let stored = h.store.find_by_gateway_order_id(&second.gateway_order_id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Paid);
}

#[tokio::test]
async fn orders_for_user_lists_only_that_user_newest_first() {
  let h = Harness::new();
  let user = Uuid::new_v4();
  let older = h.state.ledger.create_order(user, Uuid::new_v4(), 100, "INR").await.unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let newer = h.state.ledger.create_order(user, Uuid::new_v4(), 200, "INR").await.unwrap();
  h.state.ledger.create_order(Uuid::new_v4(), Uuid::new_v4(), 300, "INR").await.unwrap();

  let orders = h.state.ledger.orders_for_user(user).await.unwrap();
  let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![newer.id, older.id]);
}
