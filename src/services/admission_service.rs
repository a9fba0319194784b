// src/services/admission_service.rs

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{db_utils::with_timeout, error::AppError},
    db::AttendanceRepository,
    models::attendance::{
        wire_text, AttendanceRecord, AuthMethod, EventType, NewAttendanceRecord, RegisterPointPayload,
    },
    services::verifier::{Credential, CredentialVerifier},
};

#[derive(Clone)]
pub struct AdmissionService {
    repo: Arc<dyn AttendanceRepository>,
    verifier: CredentialVerifier,
    timeout: Duration,
}

impl AdmissionService {
    pub fn new(repo: Arc<dyn AttendanceRepository>, verifier: CredentialVerifier, timeout: Duration) -> Self {
        Self {
            repo,
            verifier,
            timeout,
        }
    }

    /// Valida e grava um evento de ponto do usuário autenticado.
    ///
    /// A ordem das verificações é fixa: tipo do evento, método, credencial.
    /// Nada é gravado se qualquer uma falhar, e a gravação é tentada uma única vez.
    pub async fn admit(
        &self,
        actor_user_id: Uuid,
        payload: &RegisterPointPayload,
    ) -> Result<AttendanceRecord, AppError> {
        let raw_event_type = wire_text(payload.event_type.as_ref());
        let event_type: EventType = raw_event_type
            .parse()
            .map_err(|_| AppError::InvalidEventType(raw_event_type.to_string()))?;

        let raw_auth_method = wire_text(payload.auth_method.as_ref());
        let auth_method: AuthMethod = raw_auth_method
            .parse()
            .map_err(|_| AppError::UnsupportedAuthMethod(raw_auth_method.to_string()))?;

        let credential = Credential::for_method(
            auth_method,
            payload.pin.as_ref(),
            payload.biometric_token.as_ref(),
        )?;

        tracing::debug!(user_id = %actor_user_id, method = %auth_method, "verificando credencial de ponto");

        let verified_method = self
            .verifier
            .verify(actor_user_id, credential)
            .await
            .map_err(|reason| {
                tracing::warn!(user_id = %actor_user_id, method = %auth_method, %reason, "credencial recusada");
                AppError::from(reason)
            })?;

        let new_record = NewAttendanceRecord {
            user_id: actor_user_id,
            event_type,
            // O horário é sempre do servidor, nunca do cliente
            timestamp: Utc::now(),
            location: payload.location.clone(),
            device: payload.device.clone(),
            auth_method: verified_method,
        };

        let record = with_timeout(self.timeout, self.repo.insert(new_record))
            .await
            .map_err(AppError::PersistenceFailure)?;

        tracing::info!(
            record_id = %record.id,
            user_id = %record.user_id,
            event_type = %record.event_type,
            "ponto registrado"
        );

        Ok(record)
    }
}
