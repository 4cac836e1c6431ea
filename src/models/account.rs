//! Account of the authorized user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Dropbox user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier (`dbid:...`).
    #[serde(default)]
    pub account_id: String,
    /// Name details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Profile photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    /// Whether the account is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Two-letter country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Referral link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_link: Option<String>,
    /// Whether a paired personal/work account exists.
    #[serde(default)]
    pub is_paired: bool,
    /// Account type such as `basic`, `pro` or `business`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<Tagged>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    /// Display name, empty when unknown.
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(|n| n.display_name.as_deref())
            .unwrap_or("")
    }

    /// Account type tag.
    pub fn account_type(&self) -> Option<&str> {
        self.account_type.as_ref().map(|t| t.tag.as_str())
    }
}

/// Name details of an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name {
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Surname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// Locale-dependent familiar name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub familiar_name: Option<String>,
    /// Full display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Abbreviated name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviated_name: Option<String>,
}

/// A `{".tag": ...}` union value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged {
    /// Tag value.
    #[serde(rename = ".tag")]
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account() {
        let account: Account = serde_json::from_value(json!({
            "account_id": "dbid:AAH4f99T0taONIb-OurWxbNQ6ywGRopQngc",
            "name": {
                "given_name": "Franz",
                "surname": "Ferdinand",
                "familiar_name": "Franz",
                "display_name": "Franz Ferdinand (Personal)",
                "abbreviated_name": "FF"
            },
            "email": "franz@dropbox.com",
            "email_verified": true,
            "disabled": false,
            "country": "US",
            "locale": "en",
            "referral_link": "https://db.tt/ZITNuhtI",
            "is_paired": true,
            "account_type": {".tag": "business"},
            "root_info": {".tag": "user", "root_namespace_id": "3235641"}
        }))
        .unwrap();

        assert_eq!(account.display_name(), "Franz Ferdinand (Personal)");
        assert_eq!(account.account_type(), Some("business"));
        assert!(account.email_verified);
        assert!(account.is_paired);
        assert!(account.extra.contains_key("root_info"));
    }

    #[test]
    fn test_account_defaults() {
        let account: Account = serde_json::from_value(json!({"account_id": "dbid:1"})).unwrap();
        assert_eq!(account.display_name(), "");
        assert_eq!(account.account_type(), None);
        assert!(!account.disabled);
    }
}
