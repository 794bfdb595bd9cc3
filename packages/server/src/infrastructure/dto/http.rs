//! HTTP API response DTOs.

use serde::Serialize;

/// Summary of one room for the room listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub occupancy: usize,
    pub capacity: usize,
    pub created_at: String,
}

/// Full detail of one room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub capacity: usize,
    pub participants: Vec<ParticipantDetailDto>,
    pub created_at: String,
}

/// One participant within a room detail response.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetailDto {
    pub connection_handle: String,
    pub display_name: String,
    pub role: String,
    pub joined_at: String,
}
