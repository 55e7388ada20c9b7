// Typed payloads for `POST /goform/set`
//
// Every request body is a single-key object `{<command-key>: {...}}` whose
// inner object carries a Unix-millisecond `timestamp`. Serde's external
// enum tagging produces exactly that shape.

use std::fmt;

use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Current Unix time in milliseconds, as the firmware expects.
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lowercase hex MD5 digest of the password's UTF-8 bytes.
pub fn password_digest(password: &SecretString) -> String {
    hex::encode(Md5::digest(password.expose_secret().as_bytes()))
}

fn flag(enabled: bool) -> String {
    if enabled { "1" } else { "0" }.to_owned()
}

/// A command accepted by the router's set endpoint.
#[derive(Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetCommand {
    Login {
        pwd: String,
        timestamp: i64,
    },
    Led {
        led_en: String,
        sn: String,
        timestamp: i64,
    },
    SysReboot {
        action: String,
        timestamp: i64,
    },
    Wifi {
        ssid: String,
        #[serde(rename = "pass")]
        password: String,
        #[serde(rename = "type")]
        security_type: String,
        #[serde(rename = "security")]
        security_mode: String,
        timestamp: i64,
    },
    GuestInfo {
        guest_en: String,
        guest_time: String,
        limit: String,
        guest_ssid: String,
        guest_pass: String,
        timestamp: i64,
    },
    UpnpInfo {
        upnp_en: String,
        timestamp: i64,
    },
}

impl SetCommand {
    pub fn login(password: &SecretString, timestamp: i64) -> Self {
        Self::Login {
            pwd: password_digest(password),
            timestamp,
        }
    }

    pub fn led(serial: &str, enabled: bool, timestamp: i64) -> Self {
        Self::Led {
            led_en: flag(enabled),
            sn: serial.to_owned(),
            timestamp,
        }
    }

    pub fn reboot(timestamp: i64) -> Self {
        Self::SysReboot {
            action: "reboot".into(),
            timestamp,
        }
    }

    pub fn wifi(
        ssid: &str,
        password: &SecretString,
        security_type: &str,
        security_mode: &str,
        timestamp: i64,
    ) -> Self {
        Self::Wifi {
            ssid: ssid.to_owned(),
            password: password.expose_secret().to_owned(),
            security_type: security_type.to_owned(),
            security_mode: security_mode.to_owned(),
            timestamp,
        }
    }

    /// Guest network settings. SSID and password are always sent, empty when
    /// not supplied: the firmware clears stored values for omitted fields.
    pub fn guest_network(
        enabled: bool,
        ssid: Option<&str>,
        password: Option<&SecretString>,
        time_restriction: &str,
        bandwidth_limit: &str,
        timestamp: i64,
    ) -> Self {
        Self::GuestInfo {
            guest_en: flag(enabled),
            guest_time: time_restriction.to_owned(),
            limit: bandwidth_limit.to_owned(),
            guest_ssid: ssid.unwrap_or_default().to_owned(),
            guest_pass: password
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default(),
            timestamp,
        }
    }

    pub fn upnp(enabled: bool, timestamp: i64) -> Self {
        Self::UpnpInfo {
            upnp_en: flag(enabled),
            timestamp,
        }
    }

    /// The top-level command key on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Led { .. } => "led",
            Self::SysReboot { .. } => "sys_reboot",
            Self::Wifi { .. } => "wifi",
            Self::GuestInfo { .. } => "guest_info",
            Self::UpnpInfo { .. } => "upnp_info",
        }
    }

    /// JSON body with secret-bearing fields masked, for logging.
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(inner) = value
            .get_mut(self.key())
            .and_then(serde_json::Value::as_object_mut)
        {
            for field in ["pwd", "pass", "guest_pass"] {
                if let Some(v) = inner.get_mut(field) {
                    *v = serde_json::Value::String("***".into());
                }
            }
        }
        value
    }
}

impl fmt::Debug for SetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetCommand({})", self.redacted())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn login_payload_carries_md5_digest_and_timestamp() {
        let cmd = SetCommand::login(&secret("secret"), 1_700_000_000_000);
        let body = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            body,
            json!({
                "login": {
                    "pwd": "5ebe2294ecd0e0f08eab7690d2a6ee69",
                    "timestamp": 1_700_000_000_000_i64
                }
            })
        );
    }

    #[test]
    fn led_payload_shape() {
        let body = serde_json::to_value(SetCommand::led("SWSI29157827Q", false, 42)).unwrap();
        assert_eq!(
            body,
            json!({ "led": { "led_en": "0", "sn": "SWSI29157827Q", "timestamp": 42 } })
        );
    }

    #[test]
    fn reboot_payload_shape() {
        let body = serde_json::to_value(SetCommand::reboot(7)).unwrap();
        assert_eq!(
            body,
            json!({ "sys_reboot": { "action": "reboot", "timestamp": 7 } })
        );
    }

    #[test]
    fn wifi_payload_uses_firmware_field_names() {
        let cmd = SetCommand::wifi("Home", &secret("hunter22"), "aes", "psk psk2", 1);
        let body = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            body,
            json!({ "wifi": {
                "ssid": "Home",
                "pass": "hunter22",
                "type": "aes",
                "security": "psk psk2",
                "timestamp": 1
            }})
        );
    }

    #[test]
    fn guest_payload_always_sends_ssid_and_password() {
        let cmd = SetCommand::guest_network(true, None, None, "always", "0", 9);
        let body = serde_json::to_value(&cmd).unwrap();
        let inner = body.get("guest_info").unwrap();
        assert_eq!(inner["guest_en"], "1");
        assert_eq!(inner["guest_ssid"], "");
        assert_eq!(inner["guest_pass"], "");
        assert_eq!(inner["guest_time"], "always");
        assert_eq!(inner["limit"], "0");
        assert_eq!(inner.as_object().unwrap().len(), 6);
    }

    #[test]
    fn redaction_masks_secrets_only() {
        let cmd = SetCommand::guest_network(
            false,
            Some("Visitante"),
            Some(&secret("12345678")),
            "8",
            "0",
            3,
        );
        let redacted = cmd.redacted();
        assert_eq!(redacted["guest_info"]["guest_pass"], "***");
        assert_eq!(redacted["guest_info"]["guest_ssid"], "Visitante");
        assert!(!format!("{cmd:?}").contains("12345678"));
    }

    #[test]
    fn upnp_payload_shape() {
        let body = serde_json::to_value(SetCommand::upnp(true, 5)).unwrap();
        assert_eq!(body, json!({ "upnp_info": { "upnp_en": "1", "timestamp": 5 } }));
    }
}
