//! Conversion logic between DTOs and domain entities.

use juku_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{Participant, ParticipantProfile, Room};
use crate::infrastructure::dto::http as http_dto;
use crate::infrastructure::dto::websocket as ws_dto;

// ========================================
// DTO → Domain
// ========================================

impl From<ws_dto::ParticipantProfileDto> for ParticipantProfile {
    fn from(dto: ws_dto::ParticipantProfileDto) -> Self {
        Self {
            display_name: dto.display_name,
            avatar_ref: dto.avatar_ref,
            role: dto.role,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Participant> for ws_dto::ParticipantInfo {
    fn from(model: &Participant) -> Self {
        Self {
            connection_handle: model.connection_id.to_string(),
            display_name: model.display_name.clone(),
            avatar_ref: model.avatar_ref.clone(),
            role: model.role.clone(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<&Room> for http_dto::RoomSummaryDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            occupancy: model.occupancy(),
            capacity: model.capacity,
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&Room> for http_dto::RoomDetailDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            capacity: model.capacity,
            participants: model
                .participants
                .iter()
                .map(|p| http_dto::ParticipantDetailDto {
                    connection_handle: p.connection_id.to_string(),
                    display_name: p.display_name.clone(),
                    role: p.role.clone(),
                    joined_at: timestamp_to_jst_rfc3339(p.joined_at.value()),
                })
                .collect(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}

/// Build the participant list DTO for a `participants-update` broadcast.
pub fn to_participant_infos(participants: &[Participant]) -> Vec<ws_dto::ParticipantInfo> {
    participants.iter().map(Into::into).collect()
}
