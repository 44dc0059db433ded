// course_market/src/services/signature.rs

//! HMAC-SHA256 authentication of gateway payment confirmations.
//!
//! The gateway signs `"{gateway_order_id}|{gateway_payment_id}"` with the
//! account's key secret and sends the lowercase hex digest. Amount and currency
//! are not covered by the signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> Option<HmacSha256> {
  if secret.is_empty() {
    return None;
  }
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
  mac.update(gateway_order_id.as_bytes());
  mac.update(b"|");
  mac.update(gateway_payment_id.as_bytes());
  Some(mac)
}

/// Length of a hex-encoded SHA-256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

/// Returns true only if `provided_signature` is exactly the lowercase hex HMAC
/// of the two ids under `secret`.
///
/// Anything else (uppercase digits, surrounding whitespace, wrong length,
/// empty secret) is a mismatch. The digest comparison is constant-time.
pub fn verify(gateway_order_id: &str, gateway_payment_id: &str, provided_signature: &str, secret: &str) -> bool {
  if !is_lower_hex_digest(provided_signature) {
    return false;
  }
  let Ok(provided) = hex::decode(provided_signature) else {
    return false;
  };
  match mac_for(gateway_order_id, gateway_payment_id, secret) {
    Some(mac) => mac.verify_slice(&provided).is_ok(),
    None => false,
  }
}

fn is_lower_hex_digest(candidate: &str) -> bool {
  candidate.len() == SIGNATURE_HEX_LEN && candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Produces the signature the gateway sends for a settled payment.
/// Empty when `secret` is empty, which `verify` always rejects.
pub fn sign(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> String {
  mac_for(gateway_order_id, gateway_payment_id, secret)
    .map(|mac| hex::encode(mac.finalize().into_bytes()))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "test_key_secret";

  #[test]
  fn accepts_signature_over_matching_ids() {
    let sig = sign("go_1", "pay_1", SECRET);
    assert_eq!(sig.len(), 64);
    assert!(verify("go_1", "pay_1", &sig, SECRET));
  }

  #[test]
  fn rejects_case_or_whitespace_variants_of_valid_signature() {
    let sig = sign("go_1", "pay_1", SECRET);
    assert!(!verify("go_1", "pay_1", &sig.to_uppercase(), SECRET));

    let letter = sig.find(|c: char| c.is_ascii_alphabetic()).expect("digest has a hex letter");
    let mut one_upper = sig.clone();
    one_upper.replace_range(letter..letter + 1, &sig[letter..letter + 1].to_uppercase());
    assert!(!verify("go_1", "pay_1", &one_upper, SECRET));

    assert!(!verify("go_1", "pay_1", &format!(" {}\n", sig), SECRET));
    assert!(!verify("go_1", "pay_1", &format!("{} ", sig), SECRET));
  }

  #[test]
  fn matches_independently_computed_digest() {
    // HMAC-SHA256("test_key_secret", "go_1|pay_1")
    let expected = "295e269b93c77a29032c975301a402504982eca8be2a3e640f38159fd7f670a6";
    assert_eq!(sign("go_1", "pay_1", SECRET), expected);
    assert!(verify("go_1", "pay_1", expected, SECRET));
  }

  #[test]
  fn rejects_tampered_signature() {
    let sig = sign("go_1", "pay_1", SECRET);
    let mut tampered: Vec<char> = sig.chars().collect();
    tampered[10] = if tampered[10] == 'a' { 'b' } else { 'a' };
    let tampered: String = tampered.into_iter().collect();
    assert!(!verify("go_1", "pay_1", &tampered, SECRET));
  }

  #[test]
  fn rejects_signature_for_other_ids_or_secret() {
    let sig = sign("go_1", "pay_1", SECRET);
    assert!(!verify("go_2", "pay_1", &sig, SECRET));
    assert!(!verify("go_1", "pay_2", &sig, SECRET));
    assert!(!verify("go_1", "pay_1", &sig, "another_secret"));
    // The separator is part of the signed message.
    assert!(!verify("go_1|pay", "_1", &sig, SECRET));
  }

  #[test]
  fn malformed_input_is_a_mismatch() {
    let sig = sign("go_1", "pay_1", SECRET);
    assert!(!verify("go_1", "pay_1", "", SECRET));
    assert!(!verify("go_1", "pay_1", "not-hex-at-all", SECRET));
    assert!(!verify("go_1", "pay_1", &sig[..62], SECRET));
    assert!(!verify("go_1", "pay_1", &format!("{}00", sig), SECRET));
    assert!(!verify("go_1", "pay_1", &sig, ""));
    assert_eq!(sign("go_1", "pay_1", ""), "");
  }
}
