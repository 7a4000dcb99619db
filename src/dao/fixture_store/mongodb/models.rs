use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{DrawEntity, MatchEntity, MatchStatusEntity, PairingEntity, PredictionEntity};

/// Fixed primary key of the single document holding the current draw.
pub const CURRENT_DRAW_ID: &str = "current";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: u32,
    home: String,
    away: String,
    date: String,
    time: String,
    stadium: String,
    status: MatchStatusEntity,
    #[serde(default)]
    result_home: Option<u32>,
    #[serde(default)]
    result_away: Option<u32>,
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            home: value.home,
            away: value.away,
            date: value.date,
            time: value.time,
            stadium: value.stadium,
            status: value.status,
            result_home: value.result_home,
            result_away: value.result_away,
        }
    }
}

impl From<MongoMatchDocument> for MatchEntity {
    fn from(value: MongoMatchDocument) -> Self {
        Self {
            id: value.id,
            home: value.home,
            away: value.away,
            date: value.date,
            time: value.time,
            stadium: value.stadium,
            status: value.status,
            result_home: value.result_home,
            result_away: value.result_away,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPredictionDocument {
    #[serde(rename = "_id")]
    id: String,
    participant_id: String,
    match_id: u32,
    home_score: u32,
    away_score: u32,
}

impl From<PredictionEntity> for MongoPredictionDocument {
    fn from(value: PredictionEntity) -> Self {
        Self {
            id: prediction_key(&value.participant_id, value.match_id),
            participant_id: value.participant_id,
            match_id: value.match_id,
            home_score: value.home_score,
            away_score: value.away_score,
        }
    }
}

impl From<MongoPredictionDocument> for PredictionEntity {
    fn from(value: MongoPredictionDocument) -> Self {
        Self {
            participant_id: value.participant_id,
            match_id: value.match_id,
            home_score: value.home_score,
            away_score: value.away_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDrawDocument {
    #[serde(rename = "_id")]
    id: String,
    draw_id: Uuid,
    drawn_at: DateTime,
    pairings: Vec<PairingEntity>,
}

impl From<DrawEntity> for MongoDrawDocument {
    fn from(value: DrawEntity) -> Self {
        Self {
            id: CURRENT_DRAW_ID.to_owned(),
            draw_id: value.id,
            drawn_at: DateTime::from_system_time(value.drawn_at),
            pairings: value.pairings,
        }
    }
}

impl From<MongoDrawDocument> for DrawEntity {
    fn from(value: MongoDrawDocument) -> Self {
        Self {
            id: value.draw_id,
            drawn_at: value.drawn_at.to_system_time(),
            pairings: value.pairings,
        }
    }
}

/// Composite primary key of a prediction document.
pub fn prediction_key(participant_id: &str, match_id: u32) -> String {
    format!("{participant_id}::{match_id}")
}

pub fn match_doc_id(id: u32) -> Document {
    doc! {"_id": i64::from(id)}
}

pub fn prediction_doc_id(participant_id: &str, match_id: u32) -> Document {
    doc! {"_id": prediction_key(participant_id, match_id)}
}

pub fn current_draw_doc_id() -> Document {
    doc! {"_id": CURRENT_DRAW_ID}
}
