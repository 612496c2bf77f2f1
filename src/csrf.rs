use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const EDIT_FORM: &str = "edit";
pub const ADD_FORM: &str = "add";

/// Tokens older than this are rejected.
const TOKEN_TTL_SECS: i64 = 3600;
const NONCE_LEN: usize = 16;

/// Signs and checks the hidden token carried by every POST form.
///
/// A token is `<issued_at>.<nonce>.<sig>`, where `sig` is an HMAC-SHA256 over
/// the form name, issue time and nonce.
pub struct CsrfSigner {
    keyed: HmacSha256,
}

impl CsrfSigner {
    /// An empty secret gets a random per-process key, so tokens do not survive restarts.
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        let key = if secret.is_empty() {
            tracing::warn!("no SECRET_KEY provided, using a random key for form tokens");
            rand::random::<[u8; 32]>().to_vec()
        } else {
            secret.as_bytes().to_vec()
        };
        let keyed = HmacSha256::new_from_slice(&key)
            .map_err(|e| anyhow::anyhow!("form token key: {e}"))?;
        Ok(Self { keyed })
    }

    pub fn issue(&self, form: &str) -> String {
        self.issue_at(form, now_sec())
    }

    fn issue_at(&self, form: &str, issued_at: i64) -> String {
        let nonce = URL_SAFE_NO_PAD.encode(rand::random::<[u8; NONCE_LEN]>());
        let sig = self.mac(form, issued_at, &nonce).finalize().into_bytes();
        let sig = URL_SAFE_NO_PAD.encode(sig);
        format!("{issued_at}.{nonce}.{sig}")
    }

    pub fn verify(&self, form: &str, token: &str) -> bool {
        self.verify_at(form, token, now_sec())
    }

    fn verify_at(&self, form: &str, token: &str, now: i64) -> bool {
        let mut parts = token.trim().splitn(3, '.');
        let (Some(issued_at), Some(nonce), Some(sig)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let Ok(issued_at) = issued_at.parse::<i64>() else {
            return false;
        };
        if now.saturating_sub(issued_at) > TOKEN_TTL_SECS || issued_at > now {
            return false;
        }
        let Ok(expected) = URL_SAFE_NO_PAD.decode(sig) else {
            return false;
        };
        self.mac(form, issued_at, nonce).verify_slice(&expected).is_ok()
    }

    fn mac(&self, form: &str, issued_at: i64, nonce: &str) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(form.as_bytes());
        mac.update(b":");
        mac.update(issued_at.to_string().as_bytes());
        mac.update(b":");
        mac.update(nonce.as_bytes());
        mac
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_for_its_form_only() {
        let signer = CsrfSigner::new("s3cret").unwrap();
        let token = signer.issue(EDIT_FORM);

        assert!(signer.verify(EDIT_FORM, &token));
        assert!(!signer.verify(ADD_FORM, &token));
    }

    #[test]
    fn tokens_from_another_key_fail() {
        let token = CsrfSigner::new("one").unwrap().issue(ADD_FORM);
        assert!(!CsrfSigner::new("two").unwrap().verify(ADD_FORM, &token));
    }

    #[test]
    fn tampered_or_malformed_tokens_fail() {
        let signer = CsrfSigner::new("s3cret").unwrap();
        let token = signer.issue(ADD_FORM);
        let (head, _) = token.rsplit_once('.').unwrap();

        assert!(!signer.verify(ADD_FORM, &format!("{head}.AAAA")));
        assert!(!signer.verify(ADD_FORM, ""));
        assert!(!signer.verify(ADD_FORM, "not-a-token"));
    }

    #[test]
    fn expired_tokens_fail() {
        let signer = CsrfSigner::new("s3cret").unwrap();
        let token = signer.issue_at(ADD_FORM, 1_000);

        assert!(signer.verify_at(ADD_FORM, &token, 1_000 + TOKEN_TTL_SECS));
        assert!(!signer.verify_at(ADD_FORM, &token, 1_001 + TOKEN_TTL_SECS));
    }

    #[test]
    fn random_key_still_round_trips() {
        let signer = CsrfSigner::new("").unwrap();
        assert!(signer.verify(EDIT_FORM, &signer.issue(EDIT_FORM)));
    }
}
