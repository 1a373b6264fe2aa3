use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::predictions;
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Prediction, PredictionId, StoredPrediction};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = predictions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PredictionRow {
    pub id: i64,
    pub date: String,
    pub draw: String,
    pub predicted_numbers: Vec<i32>,
    pub accuracy: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = predictions)]
pub struct NewPredictionRow {
    pub date: String,
    pub draw: String,
    pub predicted_numbers: Vec<i32>,
    pub accuracy: f64,
}

impl TryFrom<&Prediction> for NewPredictionRow {
    type Error = RepositoryError;

    fn try_from(prediction: &Prediction) -> RepositoryResult<Self> {
        let predicted_numbers = prediction
            .predicted_numbers
            .iter()
            .map(|n| {
                i32::try_from(*n).map_err(|_| {
                    RepositoryError::validation(format!(
                        "predicted number {n} for {} does not fit INT4",
                        prediction.draw
                    ))
                })
            })
            .collect::<RepositoryResult<Vec<i32>>>()?;

        Ok(Self {
            date: prediction.date.clone(),
            draw: prediction.draw.clone(),
            predicted_numbers,
            accuracy: prediction.accuracy,
        })
    }
}

impl TryFrom<PredictionRow> for StoredPrediction {
    type Error = RepositoryError;

    fn try_from(row: PredictionRow) -> RepositoryResult<Self> {
        let predicted_numbers = row
            .predicted_numbers
            .iter()
            .map(|n| {
                u32::try_from(*n).map_err(|_| {
                    RepositoryError::internal(format!("stored number {n} is negative"))
                        .with_details(format!("id={}", row.id))
                })
            })
            .collect::<RepositoryResult<Vec<u32>>>()?;

        Ok(StoredPrediction {
            id: PredictionId::new(row.id),
            prediction: Prediction {
                date: row.date,
                draw: row.draw,
                predicted_numbers,
                accuracy: row.accuracy,
            },
            created_at: row.created_at,
        })
    }
}
