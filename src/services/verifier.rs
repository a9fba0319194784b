// src/services/verifier.rs

use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{db_utils::with_timeout, error::CredentialError},
    db::UserProfileRepository,
    models::attendance::AuthMethod,
};

/// Credencial apresentada junto com o evento, já associada ao método declarado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Pin(&'a str),
    Biometric(&'a str),
}

impl<'a> Credential<'a> {
    /// Seleciona o campo que corresponde ao método. Campo ausente ou null vira
    /// string vazia; qualquer outro tipo JSON é credencial malformada.
    pub fn for_method(
        method: AuthMethod,
        pin: Option<&'a Value>,
        biometric_token: Option<&'a Value>,
    ) -> Result<Self, CredentialError> {
        fn text(field: Option<&Value>) -> Result<&str, CredentialError> {
            match field {
                None | Some(Value::Null) => Ok(""),
                Some(Value::String(text)) => Ok(text.as_str()),
                Some(_) => Err(CredentialError::MalformedCredential),
            }
        }

        match method {
            AuthMethod::Pin => text(pin).map(Credential::Pin),
            AuthMethod::Biometric => text(biometric_token).map(Credential::Biometric),
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Credential::Pin(_) => AuthMethod::Pin,
            Credential::Biometric(_) => AuthMethod::Biometric,
        }
    }
}

#[derive(Clone)]
pub struct PinVerifier {
    profiles: Arc<dyn UserProfileRepository>,
    timeout: Duration,
}

impl PinVerifier {
    pub fn new(profiles: Arc<dyn UserProfileRepository>, timeout: Duration) -> Self {
        Self { profiles, timeout }
    }

    pub async fn verify(&self, user_id: Uuid, supplied_pin: &str) -> Result<(), CredentialError> {
        if supplied_pin.is_empty() {
            return Err(CredentialError::MissingCredential);
        }

        let stored = with_timeout(self.timeout, self.profiles.get_pin(user_id))
            .await
            .map_err(CredentialError::Lookup)?;

        match stored.as_deref() {
            None | Some("") => Err(CredentialError::NotConfigured),
            Some(pin) if pin.as_bytes() == supplied_pin.as_bytes() => Ok(()),
            Some(_) => Err(CredentialError::InvalidCredential),
        }
    }
}

// Só verifica se o token decodifica; não há comparação com um template cadastrado.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiometricVerifier;

impl BiometricVerifier {
    pub fn verify(&self, token: &str) -> Result<(), CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::MissingCredential);
        }

        BASE64
            .decode(token)
            .map(|_| ())
            .map_err(|_| CredentialError::MalformedCredential)
    }
}

/// Despacho para o verificador do método declarado. Apenas ele é consultado.
#[derive(Clone)]
pub struct CredentialVerifier {
    pin: PinVerifier,
    biometric: BiometricVerifier,
}

impl CredentialVerifier {
    pub fn new(pin: PinVerifier, biometric: BiometricVerifier) -> Self {
        Self { pin, biometric }
    }

    /// Devolve o método que efetivamente aprovou a credencial.
    pub async fn verify(
        &self,
        user_id: Uuid,
        credential: Credential<'_>,
    ) -> Result<AuthMethod, CredentialError> {
        match credential {
            Credential::Pin(pin) => self.pin.verify(user_id, pin).await?,
            Credential::Biometric(token) => self.biometric.verify(token)?,
        }

        Ok(credential.method())
    }
}
