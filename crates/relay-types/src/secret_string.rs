//! Redacting string type for the relayer signing key.
//!
//! `SecretString` keeps the relayer's private key out of logs, debug output,
//! and serialized configuration, and zeroes the buffer on drop.

use crate::utils::without_0x_prefix;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string that zeroes its memory on drop and never prints its contents.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Wraps an owned string.
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret to a closure, limiting the scope where it is visible.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	/// Returns true if the secret is empty or only whitespace.
	///
	/// Environment templates commonly resolve unset keys to an empty string,
	/// which must count as "not configured".
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Returns the key as a 0x-prefixed hex string, whether or not the
	/// configured value carried the prefix.
	pub fn to_prefixed_hex(&self) -> SecretString {
		self.with_exposed(|key| SecretString::new(format!("0x{}", without_0x_prefix(key.trim()))))
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}

// Serialized configuration never carries the key.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Ok(SecretString::new(s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_string_never_prints() {
		let secret = SecretString::from("my-secret-key");
		assert_eq!(format!("{:?}", secret), "SecretString(***REDACTED***)");
		assert_eq!(format!("{}", secret), "***REDACTED***");
		assert_eq!(
			serde_json::to_string(&secret).unwrap(),
			"\"***REDACTED***\""
		);
	}

	#[test]
	fn test_with_exposed() {
		let secret = SecretString::from("my-secret-value");
		let len = secret.with_exposed(|s| {
			assert_eq!(s, "my-secret-value");
			s.len()
		});
		assert_eq!(len, 15);
	}

	#[test]
	fn test_is_blank() {
		assert!(SecretString::from("").is_blank());
		assert!(SecretString::from("   ").is_blank());
		assert!(!SecretString::from("ab").is_blank());
	}

	#[test]
	fn test_to_prefixed_hex() {
		let bare = SecretString::from("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
		let prefixed = SecretString::from("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
		assert_eq!(bare.to_prefixed_hex(), prefixed);
		assert_eq!(prefixed.to_prefixed_hex(), prefixed);
	}
}
