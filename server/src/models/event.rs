use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Local wall-clock start time as entered by the organizer, e.g. `19:00`.
    pub time: String,
    pub location: String,
    pub price: Decimal,
    pub image_url: String,
    pub available_seats: i32,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Case-insensitive substring match over title, description and location.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
    }
}

/// Admin event-creation form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub price: Decimal,
    pub available_seats: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("time", &self.time),
            ("location", &self.location),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::invalid(field, format!("{} is required", field)));
            }
        }

        if self.price < Decimal::ZERO {
            return Err(AppError::invalid("price", "price must not be negative"));
        }

        if self.available_seats < 1 {
            return Err(AppError::invalid(
                "available_seats",
                "available_seats must be at least 1",
            ));
        }

        Ok(())
    }

    /// Image to store, falling back to `default` when none was supplied.
    pub fn image_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.image_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => default,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn event(title: &str, date: NaiveDate, seats: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{} description", title),
            date,
            time: "19:00".to_string(),
            location: "University Auditorium".to_string(),
            price: Decimal::new(1500, 2),
            image_url: "https://example.com/event.jpg".to_string(),
            available_seats: seats,
            organizer_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    pub fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: "A day of talks and workshops".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 5, 20).unwrap(),
            time: "09:00".to_string(),
            location: "Science Building".to_string(),
            price: Decimal::new(2500, 2),
            available_seats: 150,
            image_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{event, new_event};
    use super::*;

    #[test]
    fn test_matches_any_searchable_field() {
        let date = NaiveDate::from_ymd_opt(2030, 4, 15).unwrap();
        let concert = event("Spring Concert", date, 10);

        assert!(concert.matches("spring"));
        assert!(concert.matches("auditorium"));
        assert!(concert.matches("description"));
        assert!(!concert.matches("conf"));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let form = new_event("  ");
        let err = form.validate().unwrap_err();
        assert!(matches!(err, AppError::ValidationError { field: "title", .. }));
    }

    #[test]
    fn test_validate_rejects_zero_seats_and_negative_price() {
        let mut form = new_event("Art Exhibition");
        form.available_seats = 0;
        assert!(form.validate().is_err());

        let mut form = new_event("Art Exhibition");
        form.price = Decimal::new(-1, 0);
        assert!(form.validate().is_err());

        let mut form = new_event("Art Exhibition");
        form.price = Decimal::ZERO;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_image_falls_back_to_default() {
        let mut form = new_event("Charity Fun Run");
        assert_eq!(form.image_or("default.jpg"), "default.jpg");

        form.image_url = Some("   ".to_string());
        assert_eq!(form.image_or("default.jpg"), "default.jpg");

        form.image_url = Some("https://example.com/run.jpg".to_string());
        assert_eq!(form.image_or("default.jpg"), "https://example.com/run.jpg");
    }
}
